use crate::{utok, Error, Lpe, Result};
use log::warn;
use regex::bytes::Regex;
use std::{collections::HashMap, ops::Deref, slice::from_ref, str::from_utf8_unchecked};

/// 在 [`Lpe`] 之前识别特殊词的分词器前端。
///
/// 注册的特殊词在编码时整体替换为对应的 token 序列，不参与最长前缀匹配。
/// 是否以及在哪里插入 bos、eos 仍由调用者决定。
pub struct Tokeneer {
    lpe: Lpe,
    special: HashMap<String, TokenSeq>,
    special_regex: Option<Regex>,
}

enum TokenSeq {
    Single(utok),
    Multi(Box<[utok]>),
}

impl From<Vec<utok>> for TokenSeq {
    #[inline]
    fn from(value: Vec<utok>) -> Self {
        match value.len() {
            1 => Self::Single(value[0]),
            _ => Self::Multi(value.into_boxed_slice()),
        }
    }
}

impl Deref for TokenSeq {
    type Target = [utok];
    #[inline]
    fn deref(&self) -> &Self::Target {
        match self {
            Self::Single(t) => from_ref(t),
            Self::Multi(t) => t,
        }
    }
}

impl Tokeneer {
    #[inline]
    pub fn new(lpe: Lpe) -> Self {
        Self {
            lpe,
            special: HashMap::new(),
            special_regex: None,
        }
    }

    /// 注册特殊词。
    ///
    /// 重复注册相同的映射没有影响；同一个词映射到不同的序列会失败，此时不注册任何一项。
    /// 空字符串不能作为特殊词，会被忽略。
    pub fn extend_special(
        &mut self,
        patterns: impl IntoIterator<Item = (String, Vec<utok>)>,
    ) -> Result<()> {
        let vocab_size = self.lpe.vocab_size();
        let mut staged = HashMap::<String, Vec<utok>>::new();
        for (k, v) in patterns {
            if k.is_empty() {
                warn!("empty special piece ignored");
                continue;
            }
            if let Some(&token) = v.iter().find(|&&t| t as usize >= vocab_size) {
                return Err(Error::TokenOutOfRange { token, vocab_size });
            }
            let existing = match self.special.get(&k) {
                Some(seq) => Some(&**seq),
                None => staged.get(&k).map(Vec::as_slice),
            };
            match existing {
                Some(seq) if seq == v => {}
                Some(_) => return Err(Error::SpecialConflict { piece: k }),
                None => {
                    staged.insert(k, v);
                }
            }
        }
        if !staged.is_empty() {
            let regex = build_pattern(self.special.keys().chain(staged.keys()))?;
            self.special
                .extend(staged.into_iter().map(|(k, v)| (k, v.into())));
            self.special_regex = Some(regex);
        }
        Ok(())
    }

    pub fn encode(&self, text: &[u8]) -> Result<Vec<utok>> {
        let Some(regex) = &self.special_regex else {
            return self.lpe.encode(text);
        };
        let mut ans = Vec::new();
        let mut start = 0;
        for m in regex.find_iter(text) {
            // 模式只由已注册的特殊词构成，匹配到的内容必然是其中一个键
            let piece = unsafe { from_utf8_unchecked(m.as_bytes()) };
            ans.extend(self.lpe.encode(&text[start..m.start()])?);
            ans.extend_from_slice(&self.special[piece]);
            start = m.end();
        }
        ans.extend(self.lpe.encode(&text[start..])?);
        Ok(ans)
    }

    /// 解码一个 token 序列。第一个 token 视为紧跟 bos，词表没有 bos 时视为没有前一个 token。
    pub fn decode(&self, tokens: &[utok]) -> Result<Vec<u8>> {
        let mut ans = Vec::new();
        let mut prev = self.lpe.bos();
        for &t in tokens {
            ans.extend_from_slice(self.lpe.decode_after(prev, t)?);
            prev = Some(t);
        }
        Ok(ans)
    }

    #[inline]
    pub fn internal(&self) -> &Lpe {
        &self.lpe
    }
}

impl From<Lpe> for Tokeneer {
    #[inline]
    fn from(lpe: Lpe) -> Self {
        Self::new(lpe)
    }
}

/// 构造匹配所有特殊词的模式，较长的词优先，避免被它的前缀抢先匹配。
fn build_pattern<'a>(text: impl IntoIterator<Item = &'a String>) -> Result<Regex> {
    let mut pieces = text.into_iter().collect::<Vec<_>>();
    pieces.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let pattern = pieces
        .into_iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Regex::new(&pattern)?)
}
