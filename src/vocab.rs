//! 这个模块提供对词表的预处理功能：识别字节词区间和轮次结束词，并压缩存储词的内容。

use crate::{as_byte_token, utok};
use log::warn;

/// 收集的词表。
///
/// 词表中可能包含一段连续的 256 个单字节词（*Byte token*），以 `<0x00>` 开头，
/// 按字节值顺序排列到 `<0xFF>`。编码时，无法匹配任何一般词的字节回退到这一区间；
/// 解码时，这一区间中的词还原为对应的原始字节而不是 `<0xNN>` 字样。
pub(crate) struct CollectedVocab<'s> {
    /// 词序列表，按词序保存每个词的字节序列
    pub vocabs: Vec<&'s [u8]>,
    /// 词序表中片段的总字节数
    pub total_len: usize,
    /// 字节词区间的起始词序号
    pub byte_fallback: Option<utok>,
    /// 轮次结束词
    pub eot: Option<utok>,
}

impl<'s> CollectedVocab<'s> {
    /// 收集词表，同时在一次扫描中识别字节词区间和轮次结束词。两者都是最先出现的匹配项生效。
    pub fn collect(vocabs: impl IntoIterator<Item = &'s [u8]>, eot_markers: &[String]) -> Self {
        let mut byte_fallback = None;
        let mut eot = None;
        let mut total_len = 0;
        let vocabs = vocabs
            .into_iter()
            .enumerate()
            .map(|(i, piece)| {
                if as_byte_token(piece) == Some(0) {
                    if byte_fallback.is_none() {
                        byte_fallback = Some(i as utok);
                    }
                } else if eot.is_none() && eot_markers.iter().any(|m| m.as_bytes() == piece) {
                    eot = Some(i as utok);
                }
                total_len += piece.len();
                piece
            })
            .collect::<Vec<_>>();
        let byte_fallback = byte_fallback.and_then(|start| check_byte_fallback(&vocabs, start));
        Self {
            vocabs,
            total_len,
            byte_fallback,
            eot,
        }
    }
}

/// 确认字节词区间完整地落在词表内，否则视为没有字节词。
///
/// 区间内拼写不符合 `<0xNN>` 的词只记录警告，不影响区间的使用。
fn check_byte_fallback(vocabs: &[&[u8]], start: utok) -> Option<utok> {
    let start_ = start as usize;
    let Some(range) = vocabs.get(start_..start_ + 256) else {
        warn!(
            "byte fallback starts at {start} but vocab size {} cannot hold 256 byte tokens, ignored",
            vocabs.len(),
        );
        return None;
    };
    let misspelled = range
        .iter()
        .enumerate()
        .filter(|&(b, piece)| as_byte_token(piece) != Some(b as u8))
        .count();
    if misspelled > 0 {
        warn!(
            "{misspelled} tokens in byte fallback range [{start}, {}) are not spelled <0xNN>",
            start_ + 256,
        );
    }
    Some(start)
}

/// 利用词表中的重复部分压缩词表。
///
/// 每个词保留独立的 `(偏移, 长度)`，因此内容相同的词仍然有各自的词序号。
pub(crate) struct CompressedVocab {
    pub vocabs: Box<[u8]>,
    pub slices: Box<[(u32, u32)]>,
}

impl CompressedVocab {
    pub fn new(vocabs: &[&[u8]], total_len: usize) -> Self {
        // 创建字符内容缓存
        let mut slices = vec![(0u32, 0u32); vocabs.len()];
        let mut text_buf = Vec::<u8>::with_capacity(total_len);
        let mut indices = (0..vocabs.len()).collect::<Vec<_>>();
        // 对词按内容长度从长到短排序，因为短的内容有可能是长内容的子串，可以避免重复存储相同内容
        indices.sort_unstable_by_key(|&i| std::cmp::Reverse(vocabs[i].len()));
        for i in indices {
            let v = vocabs[i];
            // 查找子串，若存在则复用，否则将新的内容追加到缓存
            let off = memchr::memmem::find(&text_buf, v).unwrap_or_else(|| {
                let off = text_buf.len();
                text_buf.extend_from_slice(v);
                off
            });
            slices[i] = (off as _, v.len() as _);
        }
        Self {
            vocabs: text_buf.into_boxed_slice(),
            slices: slices.into_boxed_slice(),
        }
    }

    #[cfg(test)]
    pub fn get(&self, i: usize) -> Option<&[u8]> {
        self.slices
            .get(i)
            .map(|&(off, len)| &self.vocabs[off as usize..][..len as usize])
    }
}

/// 原始字节表，第 `i` 项是值为 `i` 的单字节。
pub(crate) static BYTES: [u8; 256] = {
    let mut bytes = [0u8; 256];
    let mut i = 0usize;
    while i < 256 {
        bytes[i] = i as _;
        i += 1;
    }
    bytes
};
