//! 构造 [`Lpe`](crate::Lpe) 时可调整的策略。

/// 默认识别的轮次结束词。
pub const EOT_MARKERS: &[&str] = &["<|eot_id|>", "<|end|>", "<|im_end|>"];

/// 编码时遇到无法匹配任何词、且词表没有字节词时的处理方式。
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum UnknownByte {
    /// 跳过这个字节，不产生 token。
    #[default]
    Drop,
    /// 编码失败，报告字节值和位置。
    Error,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub unknown_byte: UnknownByte,
    pub eot_markers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unknown_byte: UnknownByte::default(),
            eot_markers: EOT_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    #[inline]
    pub fn unknown_byte(mut self, policy: UnknownByte) -> Self {
        self.unknown_byte = policy;
        self
    }

    /// 替换轮次结束词列表。靠前的词不享有优先权，词表中最先出现的匹配项生效。
    pub fn eot_markers<T: Into<String>>(mut self, markers: impl IntoIterator<Item = T>) -> Self {
        self.eot_markers = markers.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_drops_and_knows_markers() {
        let config = Config::default();
        assert_eq!(config.unknown_byte, UnknownByte::Drop);
        assert_eq!(config.eot_markers, EOT_MARKERS);
    }

    #[test]
    fn setters_replace() {
        let config = Config::default()
            .unknown_byte(UnknownByte::Error)
            .eot_markers(["<end_of_turn>"]);
        assert_eq!(config.unknown_byte, UnknownByte::Error);
        assert_eq!(config.eot_markers, ["<end_of_turn>"]);
    }
}
