#![deny(warnings)]
//! 基于字节前缀树的最长前缀分词器，支持字节词回退。

mod config;
mod error;
mod lpe;
mod tokeneer;
mod trie;
mod vocab;

pub use config::{Config, UnknownByte, EOT_MARKERS};
pub use error::{Error, Result};
pub use lpe::Lpe;
pub use tokeneer::Tokeneer;

/// `utok` for token id.
#[allow(non_camel_case_types)]
pub type utok = u32;

const fn as_byte_token(piece: &[u8]) -> Option<u8> {
    // 按结构分解并转换
    match piece {
        &[b'<', b'0', b'x', a, b, b'>'] if a.is_ascii_hexdigit() && b.is_ascii_hexdigit() => {
            // ascii 转数字
            #[inline(always)]
            const fn to_num(c: u8) -> u8 {
                match c {
                    b'0'..=b'9' => c - b'0',
                    b'a'..=b'f' => c - b'a' + 10,
                    b'A'..=b'F' => c - b'A' + 10,
                    _ => unreachable!(),
                }
            }

            Some(to_num(a) * 16 + to_num(b))
        }
        _ => None,
    }
}
