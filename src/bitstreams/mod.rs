use serde::{Serialize, Deserialize};

use crate::HuffmanError;

/// Storage unit of a [`BitBuffer`].
pub type Block = u32;

/// Number of bits held by one [`Block`].
pub const BLOCK_BITS: u64 = Block::BITS as u64;

/// Widest value that can be moved in a single `write`/`peek`/`read`.
pub const MAX_WIDTH: u64 = u64::BITS as u64;

const BLOCK_SHIFT: u64 = BLOCK_BITS.trailing_zeros() as u64;
const OFFSET_MASK: u64 = BLOCK_BITS - 1;

/// Number of blocks needed to store `bits` bits.
#[inline(always)]
const fn to_block_count(bits: u64) -> usize {
    ((bits + BLOCK_BITS - 1) >> BLOCK_SHIFT) as usize
}

#[inline(always)]
const fn low_mask(len: u64) -> u64 {
    if len >= MAX_WIDTH { u64::MAX } else { (1 << len) - 1 }
}

/// Growable, bit-addressable stream with independent write and read cursors.
///
/// Bits are stored little-endian: bit 0 of the stream is the least significant
/// bit of the first block, and multi-bit values are laid out starting from
/// their least significant bit.
#[derive(Clone, Default, Eq, PartialEq, Serialize, Deserialize, Debug)]
#[serde(try_from = "RawBitBuffer")]
pub struct BitBuffer {
    blocks: Vec<Block>,
    len: u64,
    write_pos: u64,
    read_pos: u64,
}

/// Unchecked serialized form of a [`BitBuffer`].
#[derive(Deserialize)]
struct RawBitBuffer {
    blocks: Vec<Block>,
    len: u64,
    write_pos: u64,
    read_pos: u64,
}

impl TryFrom<RawBitBuffer> for BitBuffer {
    type Error = HuffmanError;

    fn try_from(raw: RawBitBuffer) -> Result<Self, Self::Error> {
        let capacity = raw.blocks.len() as u64 * BLOCK_BITS;
        if raw.len > capacity {
            return Err(HuffmanError::InconsistentBuffer(format!(
                "length {} exceeds the {} bits of storage", raw.len, capacity
            )));
        }
        if raw.read_pos > raw.len || raw.write_pos > raw.len {
            return Err(HuffmanError::InconsistentBuffer(format!(
                "cursors (read {}, write {}) past the length {}", raw.read_pos, raw.write_pos, raw.len
            )));
        }

        Ok(Self { blocks: raw.blocks, len: raw.len, write_pos: raw.write_pos, read_pos: raw.read_pos })
    }
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stream of `bits` bits, all set to `value`. Both cursors start at 0,
    /// so writes overwrite the existing bits before growing the stream.
    pub fn with_len(bits: u64, value: bool) -> Self {
        let fill = if value { Block::MAX } else { 0 };
        Self {
            blocks: vec![fill; to_block_count(bits)],
            len: bits,
            write_pos: 0,
            read_pos: 0,
        }
    }

    /// Wraps whole blocks. New writes are appended after them.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let len = blocks.len() as u64 * BLOCK_BITS;
        Self { blocks, len, write_pos: len, read_pos: 0 }
    }

    /// Wraps a byte payload, such as the output of [`BitBuffer::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let per_block = (BLOCK_BITS / 8) as usize;
        let blocks = bytes
            .chunks(per_block)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0, |block, (i, &byte)| block | (byte as Block) << (i * 8))
            })
            .collect();
        let len = bytes.len() as u64 * 8;

        let mut buffer = Self::from_blocks(blocks);
        buffer.len = len;
        buffer.write_pos = len;
        buffer
    }

    /// Preallocates storage for at least `bits` bits without changing the logical length.
    pub fn reserve(&mut self, bits: u64) {
        let needed = to_block_count(bits);
        if needed > self.blocks.len() {
            self.blocks.reserve(needed - self.blocks.len());
        }
    }

    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size in bits.
    #[inline(always)]
    pub fn capacity(&self) -> u64 {
        self.blocks.len() as u64 * BLOCK_BITS
    }

    #[inline(always)]
    pub fn read_position(&self) -> u64 {
        self.read_pos
    }

    #[inline(always)]
    pub fn write_position(&self) -> u64 {
        self.write_pos
    }

    /// Bits between the read cursor and the logical end.
    #[inline(always)]
    pub fn remaining(&self) -> u64 {
        self.len - self.read_pos
    }

    /// Clears the storage and both cursors.
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.len = 0;
        self.write_pos = 0;
        self.read_pos = 0;
    }

    /// Moves the read cursor to `pos`, clamped to the logical length.
    pub fn seek(&mut self, pos: u64) -> u64 {
        self.read_pos = pos.min(self.len);
        self.read_pos
    }

    #[inline(always)]
    fn grow_to(&mut self, end: u64) {
        if end > self.len {
            self.len = end;
            let needed = to_block_count(end);
            if self.blocks.len() < needed {
                self.blocks.resize(needed, 0);
            }
        }
    }

    #[inline(always)]
    pub fn write_bit(&mut self, bit: bool) {
        self.grow_to(self.write_pos + 1);

        let mask = 1 << (self.write_pos & OFFSET_MASK);
        let block = &mut self.blocks[(self.write_pos >> BLOCK_SHIFT) as usize];
        if bit {
            *block |= mask;
        } else {
            *block &= !mask;
        }

        self.write_pos += 1;
    }

    /// Appends the lowest `count` bits of `value` at the write cursor and
    /// returns `count`.
    ///
    /// The bits are split between the partially filled block under the cursor,
    /// any number of whole blocks, and a final partial block.
    #[inline(always)]
    pub fn write(&mut self, count: u64, value: u64) -> u64 {
        assert!(count <= MAX_WIDTH, "Cannot write {} bits from a {}-bit integer", count, MAX_WIDTH);

        if count == 0 {
            return 0;
        }

        self.grow_to(self.write_pos + count);

        let mut value = value;
        let mut left = count;

        let partial = self.write_pos & OFFSET_MASK;
        if partial > 0 {
            let available = (BLOCK_BITS - partial).min(left);
            let mask = (low_mask(available) << partial) as Block;
            let block = &mut self.blocks[(self.write_pos >> BLOCK_SHIFT) as usize];
            *block &= !mask;
            *block |= ((value & low_mask(available)) << partial) as Block;

            self.write_pos += available;
            value >>= available;
            left -= available;
        }

        debug_assert!(left == 0 || self.write_pos & OFFSET_MASK == 0);

        while left >= BLOCK_BITS {
            self.blocks[(self.write_pos >> BLOCK_SHIFT) as usize] = value as Block;

            self.write_pos += BLOCK_BITS;
            value >>= BLOCK_BITS;
            left -= BLOCK_BITS;
        }

        if left > 0 {
            let mask = low_mask(left) as Block;
            let block = &mut self.blocks[(self.write_pos >> BLOCK_SHIFT) as usize];
            *block &= !mask;
            *block |= value as Block & mask;

            self.write_pos += left;
        }

        count
    }

    /// Copies up to `count` bits from the read cursor into `value` without
    /// moving the cursor. Returns the number of bits copied, which is smaller
    /// than `count` when the stream ends first.
    #[inline(always)]
    pub fn peek(&self, count: u64, value: &mut u64) -> u64 {
        assert!(count <= MAX_WIDTH, "Cannot read {} bits into a {}-bit integer", count, MAX_WIDTH);

        let count = count.min(self.remaining());
        let mut pos = self.read_pos;
        let mut left = count;
        let mut read = 0;
        let mut out = 0;

        let partial = pos & OFFSET_MASK;
        if partial > 0 && left > 0 {
            let available = (BLOCK_BITS - partial).min(left);
            out = (self.blocks[(pos >> BLOCK_SHIFT) as usize] as u64 >> partial) & low_mask(available);

            pos += available;
            left -= available;
            read += available;
        }

        debug_assert!(left == 0 || pos & OFFSET_MASK == 0);

        while left >= BLOCK_BITS {
            out |= (self.blocks[(pos >> BLOCK_SHIFT) as usize] as u64) << read;

            pos += BLOCK_BITS;
            left -= BLOCK_BITS;
            read += BLOCK_BITS;
        }

        if left > 0 {
            out |= (self.blocks[(pos >> BLOCK_SHIFT) as usize] as u64 & low_mask(left)) << read;
            read += left;
        }

        debug_assert_eq!(read, count);

        *value = out;
        count
    }

    /// Same as [`BitBuffer::peek`], then advances the read cursor past the bits read.
    #[inline(always)]
    pub fn read(&mut self, count: u64, value: &mut u64) -> u64 {
        let read = self.peek(count, value);
        self.read_pos += read;
        read
    }

    #[inline(always)]
    pub fn read_bit(&mut self) -> Option<bool> {
        if self.read_pos >= self.len {
            return None;
        }

        let block = self.blocks[(self.read_pos >> BLOCK_SHIFT) as usize];
        let bit = block >> (self.read_pos & OFFSET_MASK) & 1 == 1;
        self.read_pos += 1;
        Some(bit)
    }

    /// Advances the read cursor by up to `count` bits and returns how many were skipped.
    #[inline(always)]
    pub fn skip(&mut self, count: u64) -> u64 {
        let count = count.min(self.remaining());
        self.read_pos += count;
        count
    }

    /// The underlying blocks, including any allocated block past the logical end.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Packs the stream into `ceil(len / 8)` bytes. Padding bits of the last
    /// byte are always zero.
    pub fn to_bytes(&self) -> Box<[u8]> {
        let size = ((self.len + 7) >> 3) as usize;
        let per_block = (BLOCK_BITS / 8) as usize;

        let mut bytes: Vec<u8> = (0..size)
            .map(|i| (self.blocks[i / per_block] >> ((i % per_block) * 8)) as u8)
            .collect();

        let tail = self.len & 7;
        if let Some(last) = bytes.last_mut() {
            if tail != 0 {
                *last &= low_mask(tail) as u8;
            }
        }

        bytes.into_boxed_slice()
    }
}
