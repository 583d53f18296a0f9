use crate::utok;

/// 分词器可能产生的错误。
///
/// 词表内容本身不会导致构造失败：缺失字节词或轮次结束词只表现为对应字段为 `None`。
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("vocabulary is empty")]
    EmptyVocab,

    #[error("token {token} out of range, vocab size is {vocab_size}")]
    TokenOutOfRange { token: utok, vocab_size: usize },

    #[error("byte {byte:#04x} at offset {offset} matches no vocabulary entry")]
    UnknownByte { byte: u8, offset: usize },

    #[error("special piece {piece:?} is already registered with another token sequence")]
    SpecialConflict { piece: String },

    #[error("failed to build special piece pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("vocab.txt line {line}: {reason}")]
    VocabTxt { line: usize, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
