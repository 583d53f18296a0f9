//! 字节前缀树。所有节点保存在一个数组中，以序号相互引用。

use crate::utok;

const ROOT: usize = 0;

pub(crate) struct Trie {
    nodes: Vec<Node>,
}

#[derive(Default)]
struct Node {
    /// 按字节值排序的子节点序号
    children: Vec<(u8, u32)>,
    /// 恰好在此结束的词
    token: Option<utok>,
}

impl Trie {
    #[inline]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// 插入一个词。内容相同的词后插入者覆盖先插入者。
    pub fn insert(&mut self, piece: &[u8], token: utok) {
        let mut node = ROOT;
        for &b in piece {
            node = match self.nodes[node].children.binary_search_by_key(&b, |&(c, _)| c) {
                Ok(i) => self.nodes[node].children[i].1 as usize,
                Err(i) => {
                    let child = self.nodes.len();
                    self.nodes[node].children.insert(i, (b, child as u32));
                    self.nodes.push(Node::default());
                    child
                }
            };
        }
        self.nodes[node].token = Some(token);
    }

    /// 查找 `text` 最长的、恰好是一个词的前缀，返回词序号和前缀长度。
    ///
    /// 空前缀不算匹配，因此返回的长度至少为 1。
    pub fn longest_prefix(&self, text: &[u8]) -> Option<(utok, usize)> {
        let mut node = ROOT;
        let mut found = None;
        for (i, &b) in text.iter().enumerate() {
            match self.child(node, b) {
                Some(next) => node = next,
                None => break,
            }
            if let Some(token) = self.nodes[node].token {
                found = Some((token, i + 1));
            }
        }
        found
    }

    /// 节点总数，包括根节点。
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    fn child(&self, node: usize, b: u8) -> Option<usize> {
        let children = &self.nodes[node].children;
        children
            .binary_search_by_key(&b, |&(c, _)| c)
            .ok()
            .map(|i| children[i].1 as usize)
    }

    #[cfg(test)]
    fn get(&self, piece: &[u8]) -> Option<utok> {
        piece
            .iter()
            .try_fold(ROOT, |node, &b| self.child(node, b))
            .and_then(|node| self.nodes[node].token)
    }
}

impl<'a> FromIterator<(&'a [u8], utok)> for Trie {
    fn from_iter<I: IntoIterator<Item = (&'a [u8], utok)>>(iter: I) -> Self {
        let mut trie = Self::new();
        for (piece, token) in iter {
            trie.insert(piece, token);
        }
        trie
    }
}
