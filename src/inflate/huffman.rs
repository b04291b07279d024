//! Canonical Huffman trees
//!
//! Trees are built from a code-length table (RFC 1951 section 3.2.2) and
//! stored as a binary trie that the bit reader walks one bit at a time.

use std::sync::OnceLock;

/// Longest code length DEFLATE allows
pub const MAX_CODE_LENGTH: usize = 15;

/// Trie node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Code prefix with no symbol assigned
    Empty,
    /// Decoded symbol
    Leaf(u16),
    /// Children for bit 0 and bit 1
    Branch(Box<Node>, Box<Node>),
}

/// Canonical Huffman decoding trie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build a tree from per-symbol code lengths (0 = symbol unused)
    ///
    /// Lengths above 15 are ignored. Over-subscribed tables keep the codes
    /// that fit and drop the rest.
    pub fn from_lengths(lengths: &[u8]) -> Self {
        let mut counts = [0u32; MAX_CODE_LENGTH + 1];
        for &len in lengths {
            if len as usize <= MAX_CODE_LENGTH {
                counts[len as usize] += 1;
            }
        }
        counts[0] = 0;

        let mut next_code = [0u32; MAX_CODE_LENGTH + 1];
        let mut code = 0u32;
        for bits in 1..=MAX_CODE_LENGTH {
            code = (code + counts[bits - 1]) << 1;
            next_code[bits] = code;
        }

        let mut tree = Self { root: Node::Empty };
        for (symbol, &len) in lengths.iter().enumerate() {
            let len = len as usize;
            if len == 0 || len > MAX_CODE_LENGTH {
                continue;
            }
            tree.insert(next_code[len], len, symbol as u16);
            next_code[len] += 1;
        }
        tree
    }

    /// Fixed literal/length tree (block type 1)
    pub fn fixed_literal() -> &'static HuffmanTree {
        static TREE: OnceLock<HuffmanTree> = OnceLock::new();
        TREE.get_or_init(|| {
            let mut lengths = [0u8; 288];
            lengths[..144].fill(8);
            lengths[144..256].fill(9);
            lengths[256..280].fill(7);
            lengths[280..].fill(8);
            HuffmanTree::from_lengths(&lengths)
        })
    }

    /// Fixed distance tree (block type 1)
    pub fn fixed_distance() -> &'static HuffmanTree {
        static TREE: OnceLock<HuffmanTree> = OnceLock::new();
        TREE.get_or_init(|| HuffmanTree::from_lengths(&[5; 30]))
    }

    /// Root node
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Whether no symbol has a code
    pub fn is_empty(&self) -> bool {
        self.root == Node::Empty
    }

    fn insert(&mut self, code: u32, len: usize, symbol: u16) {
        let mut node = &mut self.root;
        for shift in (0..len).rev() {
            if *node == Node::Empty {
                *node = Node::Branch(Box::new(Node::Empty), Box::new(Node::Empty));
            }
            node = match node {
                Node::Branch(zero, one) => {
                    if (code >> shift) & 1 == 0 {
                        &mut **zero
                    } else {
                        &mut **one
                    }
                }
                // A shorter code already owns this prefix
                _ => return,
            };
        }
        if *node == Node::Empty {
            *node = Node::Leaf(symbol);
        }
    }

    /// Look up the symbol for an MSB-first `code` of `len` bits
    pub fn lookup(&self, code: u32, len: usize) -> Option<u16> {
        let mut node = &self.root;
        for shift in (0..len).rev() {
            node = match node {
                Node::Branch(zero, one) => {
                    if (code >> shift) & 1 == 0 {
                        &**zero
                    } else {
                        &**one
                    }
                }
                _ => return None,
            };
        }
        match node {
            Node::Leaf(symbol) => Some(*symbol),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc1951_example() {
        // RFC 1951 3.2.2: ABCDEFGH with lengths (3, 3, 3, 3, 3, 2, 4, 4)
        let tree = HuffmanTree::from_lengths(&[3, 3, 3, 3, 3, 2, 4, 4]);
        assert_eq!(tree.lookup(0b010, 3), Some(0));
        assert_eq!(tree.lookup(0b011, 3), Some(1));
        assert_eq!(tree.lookup(0b100, 3), Some(2));
        assert_eq!(tree.lookup(0b101, 3), Some(3));
        assert_eq!(tree.lookup(0b110, 3), Some(4));
        assert_eq!(tree.lookup(0b00, 2), Some(5));
        assert_eq!(tree.lookup(0b1110, 4), Some(6));
        assert_eq!(tree.lookup(0b1111, 4), Some(7));
    }

    #[test]
    fn test_fixed_literal_codes() {
        let tree = HuffmanTree::fixed_literal();
        // 0..=143 -> 00110000.., 144..=255 -> 110010000.., 256..=279 -> 0000000.., 280.. -> 11000000
        assert_eq!(tree.lookup(0b0011_0000, 8), Some(0));
        assert_eq!(tree.lookup(0b1011_1111, 8), Some(143));
        assert_eq!(tree.lookup(0b1_1001_0000, 9), Some(144));
        assert_eq!(tree.lookup(0b1_1111_1111, 9), Some(255));
        assert_eq!(tree.lookup(0b000_0000, 7), Some(256));
        assert_eq!(tree.lookup(0b001_0111, 7), Some(279));
        assert_eq!(tree.lookup(0b1100_0000, 8), Some(280));
        assert_eq!(tree.lookup(0b1100_0111, 8), Some(287));
    }

    #[test]
    fn test_fixed_distance_codes() {
        let tree = HuffmanTree::fixed_distance();
        for symbol in 0..30u16 {
            assert_eq!(tree.lookup(u32::from(symbol), 5), Some(symbol));
        }
        assert_eq!(tree.lookup(30, 5), None);
        assert_eq!(tree.lookup(31, 5), None);
    }

    #[test]
    fn test_fixed_trees_are_shared() {
        assert!(std::ptr::eq(
            HuffmanTree::fixed_literal(),
            HuffmanTree::fixed_literal()
        ));
    }

    #[test]
    fn test_empty_and_single_code() {
        assert!(HuffmanTree::from_lengths(&[0, 0, 0]).is_empty());

        let tree = HuffmanTree::from_lengths(&[0, 1]);
        assert_eq!(tree.lookup(0, 1), Some(1));
        assert_eq!(tree.lookup(1, 1), None);
    }

    #[test]
    fn test_over_subscribed_lengths_do_not_panic() {
        let tree = HuffmanTree::from_lengths(&[1, 1, 1, 1]);
        assert_eq!(tree.lookup(0, 1), Some(0));
        assert_eq!(tree.lookup(1, 1), Some(1));
    }
}
