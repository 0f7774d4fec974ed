use crate::utils::invert::invert_bits;

use super::{lengths::CodeLengths, CodeWord, ALPHABET_BITS, ALPHABET_SIZE, MAX_CODE_LEN};

const NUM_LENGTHS: usize = MAX_CODE_LEN as usize + 1;

/// Canonical Huffman code built from a [`CodeLengths`] table.
///
/// Symbols sorted by `(length, symbol)` receive consecutive code values, the
/// value being shifted left whenever the length grows. Both sides of the
/// stream derive the same table from the lengths alone.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CanonicalCode {
    lengths: CodeLengths,
    /// MSB-first canonical values, indexed by symbol.
    codes: [CodeWord; ALPHABET_SIZE],
    /// `codes` reversed within their length, ready for LSB-first emission.
    emitted: [u64; ALPHABET_SIZE],
    /// Symbols in canonical order.
    sorted: [u8; ALPHABET_SIZE],
    /// Per length: the first code value, the position of its symbol in `sorted`,
    /// and how many codes have that length.
    first_code: [u64; NUM_LENGTHS],
    first_index: [usize; NUM_LENGTHS],
    count: [usize; NUM_LENGTHS],
}

impl Default for CanonicalCode {
    /// Codes every symbol with its own 8-bit value.
    fn default() -> Self {
        let lengths = [ALPHABET_BITS as u8; ALPHABET_SIZE];
        match CodeLengths::from_lengths(&lengths) {
            Ok(lengths) => Self::from_lengths(lengths),
            Err(e) => unreachable!("a flat 8-bit code is complete: {e}"),
        }
    }
}

impl CanonicalCode {
    pub fn from_lengths(lengths: CodeLengths) -> Self {
        let mut syms = [(0u8, 0u8); ALPHABET_SIZE];
        for (i, sym) in syms.iter_mut().enumerate() {
            *sym = (lengths.get(i as u8), i as u8);
        }

        syms.sort_unstable();

        let mut code = Self {
            lengths,
            codes: [CodeWord::default(); ALPHABET_SIZE],
            emitted: [0; ALPHABET_SIZE],
            sorted: [0; ALPHABET_SIZE],
            first_code: [0; NUM_LENGTHS],
            first_index: [0; NUM_LENGTHS],
            count: [0; NUM_LENGTHS],
        };

        let mut value = 0u64;
        let mut prev_len = syms[0].0;

        for (i, &(len, symbol)) in syms.iter().enumerate() {
            if i != 0 {
                value += 1;
                if len > prev_len {
                    value <<= len - prev_len;
                    prev_len = len;
                }
            }

            code.codes[symbol as usize] = CodeWord { value, len };
            code.emitted[symbol as usize] = invert_bits(value, len as u32);
            code.sorted[i] = symbol;

            let len = len as usize;
            if code.count[len] == 0 {
                code.first_code[len] = value;
                code.first_index[len] = i;
            }
            code.count[len] += 1;

            log::trace!("{:#04x}: {}", symbol, code.code_string(symbol));
        }

        code
    }

    #[inline(always)]
    pub fn code(&self, symbol: u8) -> CodeWord {
        self.codes[symbol as usize]
    }

    /// The code of `symbol` in stream order: its first bit is the least significant.
    #[inline(always)]
    pub fn emitted(&self, symbol: u8) -> u64 {
        self.emitted[symbol as usize]
    }

    pub fn lengths(&self) -> &CodeLengths {
        &self.lengths
    }

    pub fn max_length(&self) -> u8 {
        self.lengths.max_length()
    }

    /// Symbols in canonical `(length, symbol)` order.
    #[cfg(test)]
    fn sorted_symbols(&self) -> &[u8; ALPHABET_SIZE] {
        &self.sorted
    }

    /// Looks up the symbol whose code is the `len`-bit, MSB-first `value`.
    #[inline(always)]
    pub fn resolve(&self, value: u64, len: u8) -> Option<u8> {
        let len = len as usize;
        if len >= NUM_LENGTHS || self.count[len] == 0 || value < self.first_code[len] {
            return None;
        }

        let offset = value - self.first_code[len];
        if offset >= self.count[len] as u64 {
            return None;
        }

        Some(self.sorted[self.first_index[len] + offset as usize])
    }

    /// Renders the code of `symbol` as `0b…`, first emitted bit first.
    pub fn code_string(&self, symbol: u8) -> String {
        let CodeWord { value, len } = self.code(symbol);
        let mut out = String::with_capacity(len as usize + 2);
        out.push_str("0b");
        for i in (0..len).rev() {
            out.push(if value >> i & 1 == 1 { '1' } else { '0' });
        }
        out
    }
}
