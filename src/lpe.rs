//! l-p-e for Longest Prefix Encoding

use crate::{
    config::{Config, UnknownByte},
    trie::Trie,
    utok,
    vocab::{CollectedVocab, CompressedVocab, BYTES},
    Error, Result,
};
use log::{debug, trace};
use std::slice::from_ref;

pub struct Lpe {
    /// 保存所有词的字符串内容，以 u8 为单位所以不需要对齐，占用空间少
    vocabs: Box<[u8]>,
    /// 按 token 顺序保存每个词在 `vocabs` 中的偏移和长度
    tokens: Box<[(u32, u32)]>,
    /// 词汇的前缀树
    trie: Trie,
    /// 字节词区间的起始词序号
    byte_fallback: Option<utok>,
    /// token: <s>
    bos: Option<utok>,
    /// token: </s>
    eos: Option<utok>,
    /// 轮次结束词，例如 `<|eot_id|>`
    eot: Option<utok>,
    unknown_byte: UnknownByte,
}

impl Lpe {
    /// 从 vocab.txt 构造分词器，每行是一个用双引号包围的词。
    pub fn from_vocabs_txt(txt: &[u8], bos: Option<utok>, eos: Option<utok>) -> Result<Self> {
        let txt = txt.strip_suffix(b"\n").unwrap_or(txt);
        if txt.is_empty() {
            return Err(Error::EmptyVocab);
        }
        let vocabs = txt
            .split(|&b| b == b'\n')
            .enumerate()
            .map(|(i, line)| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                line.strip_prefix(b"\"")
                    .and_then(|line| line.strip_suffix(b"\""))
                    .ok_or(Error::VocabTxt {
                        line: i + 1,
                        reason: "piece is not quoted",
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(vocabs, bos, eos)
    }

    /// 词表没有 bos 或 eos 时传入 `None`。
    #[inline]
    pub fn new<'a>(
        vocabs: impl IntoIterator<Item = &'a [u8]>,
        bos: Option<utok>,
        eos: Option<utok>,
    ) -> Result<Self> {
        Self::with_config(vocabs, bos, eos, Config::default())
    }

    pub fn with_config<'a>(
        vocabs: impl IntoIterator<Item = &'a [u8]>,
        bos: Option<utok>,
        eos: Option<utok>,
        config: Config,
    ) -> Result<Self> {
        let CollectedVocab {
            vocabs,
            total_len,
            byte_fallback,
            eot,
        } = CollectedVocab::collect(vocabs, &config.eot_markers);
        if vocabs.is_empty() {
            return Err(Error::EmptyVocab);
        }
        for token in [bos, eos].into_iter().flatten() {
            if token as usize >= vocabs.len() {
                return Err(Error::TokenOutOfRange {
                    token,
                    vocab_size: vocabs.len(),
                });
            }
        }

        let trie = vocabs
            .iter()
            .enumerate()
            .map(|(i, &piece)| (piece, i as utok))
            .collect::<Trie>();
        let CompressedVocab {
            vocabs: buf,
            slices,
        } = CompressedVocab::new(&vocabs, total_len);

        debug!(
            "Building LPE vocab, detected {} tokens, compressed to {} bytes from {total_len} bytes, {} trie nodes",
            slices.len(),
            buf.len(),
            trie.node_count(),
        );
        debug!("byte fallback: {byte_fallback:?}, bos: {bos:?}, eos: {eos:?}, eot: {eot:?}");

        Ok(Self {
            vocabs: buf,
            tokens: slices,
            trie,
            byte_fallback,
            bos,
            eos,
            eot,
            unknown_byte: config.unknown_byte,
        })
    }

    #[inline]
    pub fn bos(&self) -> Option<utok> {
        self.bos
    }
    #[inline]
    pub fn eos(&self) -> Option<utok> {
        self.eos
    }
    #[inline]
    pub fn eot(&self) -> Option<utok> {
        self.eot
    }
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.tokens.len()
    }
    #[inline]
    pub fn byte_fallback_start(&self) -> Option<utok> {
        self.byte_fallback
    }
    #[inline]
    pub fn unknown_byte(&self) -> UnknownByte {
        self.unknown_byte
    }

    /// token id -> 词表中的原始拼写
    #[inline]
    pub fn piece(&self, token: utok) -> Result<&[u8]> {
        match self.tokens.get(token as usize) {
            Some(&(off, len)) => Ok(&self.vocabs[off as usize..][..len as usize]),
            None => Err(self.out_of_range(token)),
        }
    }

    /// 从左到右贪心地匹配最长的词。
    ///
    /// 某个位置没有任何词可以匹配时，若词表有字节词则产生对应的字节词，
    /// 否则按 [`UnknownByte`] 策略丢弃该字节或报错。不会添加 bos 和 eos。
    pub fn encode(&self, text: &[u8]) -> Result<Vec<utok>> {
        let mut tokens = Vec::<utok>::new();
        let mut rest = text;

        while let [b, ..] = *rest {
            let len = match self.trie.longest_prefix(rest) {
                Some((tok, len)) => {
                    tokens.push(tok);
                    len
                }
                None => {
                    let offset = text.len() - rest.len();
                    match (self.byte_fallback, self.unknown_byte) {
                        (Some(start), _) => tokens.push(start + b as utok),
                        (None, UnknownByte::Drop) => {
                            trace!("dropped byte {b:#04x} at offset {offset}")
                        }
                        (None, UnknownByte::Error) => {
                            return Err(Error::UnknownByte { byte: b, offset })
                        }
                    }
                    1
                }
            };
            rest = &rest[len..];
        }

        Ok(tokens)
    }

    /// 解码一个 token。`prev` 是它的前一个 token，对于序列中的第一个 token 应传入 bos。
    ///
    /// - 紧跟 bos 的词去掉开头的一个空格；
    /// - 字节词还原为原始字节；
    /// - 其他词原样返回。
    ///
    /// 词表没有 bos 时第一条规则不会生效。
    #[inline]
    pub fn decode_one(&self, prev: utok, token: utok) -> Result<&[u8]> {
        self.decode_after(Some(prev), token)
    }

    /// 同 [`Lpe::decode_one`]，`prev` 为 `None` 表示 `token` 没有前一个 token。
    pub(crate) fn decode_after(&self, prev: Option<utok>, token: utok) -> Result<&[u8]> {
        if let Some(prev) = prev.filter(|&p| p as usize >= self.vocab_size()) {
            return Err(self.out_of_range(prev));
        }
        let piece = self.piece(token)?;
        if prev.is_some() && prev == self.bos {
            if let Some(stripped) = piece.strip_prefix(b" ") {
                return Ok(stripped);
            }
        }
        match self.byte_fallback.and_then(|start| token.checked_sub(start)) {
            Some(b) if b < 256 => Ok(from_ref(&BYTES[b as usize])),
            _ => Ok(piece),
        }
    }

    #[inline]
    fn out_of_range(&self, token: utok) -> Error {
        Error::TokenOutOfRange {
            token,
            vocab_size: self.vocab_size(),
        }
    }
}
