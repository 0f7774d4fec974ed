use std::{cmp::{Ordering, Reverse}, collections::BinaryHeap};

use crate::{HuffmanError, Result};

use super::{frequency::Frequencies, ALPHABET_SIZE, MAX_CODE_LEN};

const NUM_NODES: usize = 2 * ALPHABET_SIZE - 1;

/// A node of the merge tree. Leaves occupy the first [`ALPHABET_SIZE`] slots of
/// the arena, internal nodes are appended in merge order, so a parent always
/// has a larger index than its children.
#[derive(Clone, Copy, Debug)]
struct TreeNode {
    weight: u64,
    height: u32,
    parent: Option<usize>,
}

/// Queue entry: lighter first, then flatter, then older.
#[derive(Clone, Copy, Debug)]
struct HeapNode {
    weight: u64,
    height: u32,
    index: usize,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then(self.height.cmp(&other.height))
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for HeapNode {}

impl PartialEq for HeapNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

/// Code length of every symbol of the alphabet.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CodeLengths([u8; ALPHABET_SIZE]);

impl CodeLengths {
    /// Builds optimal prefix-code lengths by repeatedly merging the two lightest
    /// subtrees. Absent symbols (weight 0) still receive a length, so the tree
    /// always has 256 leaves.
    ///
    /// The weights must sum to at most `u64::MAX`, which counts taken from a
    /// single [`Frequencies`] always do.
    pub fn from_weights(weights: &[u64; ALPHABET_SIZE]) -> Self {
        let mut nodes = Vec::with_capacity(NUM_NODES);
        let mut queue = BinaryHeap::with_capacity(ALPHABET_SIZE);

        for (index, &weight) in weights.iter().enumerate() {
            nodes.push(TreeNode { weight, height: 0, parent: None });
            queue.push(Reverse(HeapNode { weight, height: 0, index }));
        }

        let root = loop {
            let Some(Reverse(first)) = queue.pop() else {
                unreachable!("the queue always holds the root");
            };
            let Some(Reverse(second)) = queue.pop() else {
                break first.index;
            };

            let index = nodes.len();
            let weight = first
                .weight
                .checked_add(second.weight)
                .expect("the sum of all weights must fit in a u64");
            let height = first.height.max(second.height) + 1;

            nodes[first.index].parent = Some(index);
            nodes[second.index].parent = Some(index);
            nodes.push(TreeNode { weight, height, parent: None });

            queue.push(Reverse(HeapNode { weight, height, index }));
        };

        assert_eq!(nodes.len(), NUM_NODES, "a full binary tree over the alphabet has {} nodes", NUM_NODES);
        assert_eq!(root, NUM_NODES - 1);
        assert!(nodes[root].height <= MAX_CODE_LEN as u32, "Huffman tree of height {} exceeds the {}-bit code limit", nodes[root].height, MAX_CODE_LEN);

        // Parents come after their children, so one backward pass sets every depth.
        let mut depth = [0u8; NUM_NODES];
        for i in (0..NUM_NODES).rev() {
            if let Some(parent) = nodes[i].parent {
                depth[i] = depth[parent] + 1;
            }
        }

        let mut lengths = [0u8; ALPHABET_SIZE];
        lengths.copy_from_slice(&depth[..ALPHABET_SIZE]);

        let lengths = Self(lengths);
        debug_assert!(lengths.is_complete());
        lengths
    }

    /// Validates an untrusted length table, e.g. one read from a header.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        if lengths.len() != ALPHABET_SIZE {
            return Err(HuffmanError::malformed_header(format!(
                "{} code lengths for an alphabet of {} symbols", lengths.len(), ALPHABET_SIZE
            )));
        }

        for (symbol, &length) in lengths.iter().enumerate() {
            if length == 0 || length > MAX_CODE_LEN {
                return Err(HuffmanError::InvalidCodeLength { symbol, length: length as u64 });
            }
        }

        let mut table = [0u8; ALPHABET_SIZE];
        table.copy_from_slice(lengths);
        let table = Self(table);

        if table.kraft_sum() > 1 << MAX_CODE_LEN {
            return Err(HuffmanError::OversubscribedCode);
        }

        Ok(table)
    }

    #[inline(always)]
    pub fn get(&self, symbol: u8) -> u8 {
        self.0[symbol as usize]
    }

    pub fn as_array(&self) -> &[u8; ALPHABET_SIZE] {
        &self.0
    }

    pub fn max_length(&self) -> u8 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// `Σ 2^-length` in fixed point with 64 fractional bits, so that a
    /// complete code sums to exactly `1 << 64`.
    pub fn kraft_sum(&self) -> u128 {
        self.0.iter().map(|&len| 1u128 << (MAX_CODE_LEN - len)).sum()
    }

    /// True when the lengths describe a full binary tree.
    pub fn is_complete(&self) -> bool {
        self.kraft_sum() == 1 << MAX_CODE_LEN
    }

    /// Payload size in bits for an input with the given counts.
    pub fn encoded_bits(&self, frequencies: &Frequencies) -> u64 {
        self.0
            .iter()
            .zip(frequencies.weights().iter())
            .map(|(&len, &weight)| len as u64 * weight)
            .sum()
    }
}

impl From<&Frequencies> for CodeLengths {
    fn from(frequencies: &Frequencies) -> Self {
        Self::from_weights(frequencies.weights())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_weights_are_balanced() {
        let lengths = CodeLengths::from_weights(&[0; ALPHABET_SIZE]);
        assert!(lengths.as_array().iter().all(|&len| len == 8));

        let lengths = CodeLengths::from_weights(&[7; ALPHABET_SIZE]);
        assert!(lengths.as_array().iter().all(|&len| len == 8));
    }

    #[test]
    fn test_heavier_symbols_get_shorter_codes() {
        let freq = Frequencies::from(&b"hello world!"[..]);
        let lengths = CodeLengths::from(&freq);

        assert!(lengths.is_complete());
        assert!(lengths.get(b'l') <= lengths.get(b'o'));
        assert!(lengths.get(b'o') <= lengths.get(b'h'));
        for symbol in 0..=255u8 {
            if freq.weight(symbol) == 0 {
                assert!(lengths.get(symbol) >= lengths.get(b'h'));
            }
        }
    }

    #[test]
    fn test_single_symbol() {
        let freq = Frequencies::from(&[b'x'; 1000][..]);
        let lengths = CodeLengths::from(&freq);

        assert_eq!(lengths.get(b'x'), 1);
        assert!(lengths.is_complete());
        assert_eq!(lengths.encoded_bits(&freq), 1000);
    }

    #[test]
    fn test_fibonacci_weights_stay_bounded() {
        // Fibonacci weights produce the deepest possible tree for their symbols.
        let mut weights = [0u64; ALPHABET_SIZE];
        let (mut a, mut b) = (1u64, 1u64);
        for weight in weights.iter_mut().take(40) {
            *weight = a;
            (a, b) = (b, a + b);
        }

        let lengths = CodeLengths::from_weights(&weights);
        assert!(lengths.is_complete());
        assert!(lengths.max_length() >= 40);
        assert!(lengths.max_length() <= MAX_CODE_LEN);
        assert_eq!(lengths.get(39), 1);
        assert_eq!(lengths.get(38), 2);
    }

    #[test]
    fn test_from_lengths_validation() {
        assert!(matches!(CodeLengths::from_lengths(&[8; 255]), Err(HuffmanError::MalformedHeader(_))));

        let mut lengths = [8u8; ALPHABET_SIZE];
        lengths[3] = 0;
        assert!(matches!(
            CodeLengths::from_lengths(&lengths),
            Err(HuffmanError::InvalidCodeLength { symbol: 3, length: 0 })
        ));

        lengths[3] = 65;
        assert!(matches!(
            CodeLengths::from_lengths(&lengths),
            Err(HuffmanError::InvalidCodeLength { symbol: 3, length: 65 })
        ));

        lengths[3] = 7;
        assert!(matches!(CodeLengths::from_lengths(&lengths), Err(HuffmanError::OversubscribedCode)));

        lengths[3] = 9;
        let incomplete = CodeLengths::from_lengths(&lengths).unwrap();
        assert!(!incomplete.is_complete());
    }

    #[test]
    fn test_deterministic() {
        let freq = Frequencies::from(&b"mississippi river banks"[..]);
        assert_eq!(CodeLengths::from(&freq), CodeLengths::from(&freq.clone()));
    }

    #[test]
    #[should_panic(expected = "the sum of all weights must fit in a u64")]
    fn test_overflowing_weights() {
        let mut weights = [0u64; ALPHABET_SIZE];
        weights[0] = u64::MAX;
        weights[1] = u64::MAX;
        weights[2] = u64::MAX;
        CodeLengths::from_weights(&weights);
    }
}
