use crate::{bitstreams::BitBuffer, HuffmanError, Result};

use super::{canonical::CanonicalCode, lengths::CodeLengths, ALPHABET_SIZE};

pub const TOTAL_SIZE_BITS: u64 = 64;
pub const SYMBOL_COUNT_BITS: u64 = 64;
pub const ALPHABET_SIZE_BITS: u64 = 16;
/// Each symbol's code length is stored minus one, covering lengths 1..=64.
pub const LENGTH_FIELD_BITS: u64 = 6;

/// Size of a serialized [`EncodingHeader`].
pub const HEADER_BITS: u64 =
    TOTAL_SIZE_BITS + SYMBOL_COUNT_BITS + ALPHABET_SIZE_BITS + LENGTH_FIELD_BITS * ALPHABET_SIZE as u64;

/// Everything the decoder needs besides the payload itself. Code values are
/// never stored: they are rebuilt from the lengths.
///
/// | field | bits |
/// |---|---|
/// | header + payload size, in bits | 64 |
/// | number of encoded symbols | 64 |
/// | alphabet size (always 256) | 16 |
/// | code length - 1, for each symbol | 6 × 256 |
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncodingHeader {
    pub total_bits: u64,
    pub symbol_count: u64,
    pub lengths: CodeLengths,
}

impl EncodingHeader {
    pub fn new(lengths: CodeLengths, symbol_count: u64, payload_bits: u64) -> Self {
        Self { total_bits: HEADER_BITS + payload_bits, symbol_count, lengths }
    }

    pub fn payload_bits(&self) -> u64 {
        self.total_bits.saturating_sub(HEADER_BITS)
    }

    /// Rebuilds the canonical code described by the lengths.
    pub fn code(&self) -> CanonicalCode {
        CanonicalCode::from_lengths(self.lengths)
    }

    /// Appends the header to `writer` and returns the number of bits written.
    pub fn write(&self, writer: &mut BitBuffer) -> u64 {
        let mut written = writer.write(TOTAL_SIZE_BITS, self.total_bits);
        written += writer.write(SYMBOL_COUNT_BITS, self.symbol_count);
        written += writer.write(ALPHABET_SIZE_BITS, ALPHABET_SIZE as u64);

        for &len in self.lengths.as_array() {
            written += writer.write(LENGTH_FIELD_BITS, len as u64 - 1);
        }

        debug_assert_eq!(written, HEADER_BITS);
        written
    }

    /// Reads a header starting at the read cursor of `reader`.
    ///
    /// The declared total size is checked against the bits available from the
    /// start of the header, so the payload that follows is known to be present.
    pub fn read(reader: &mut BitBuffer) -> Result<Self> {
        let start = reader.read_position();
        let available = reader.remaining();

        if available < HEADER_BITS {
            return Err(HuffmanError::TruncatedStream { needed: HEADER_BITS, available });
        }

        let total_bits = read_field(reader, TOTAL_SIZE_BITS);
        let symbol_count = read_field(reader, SYMBOL_COUNT_BITS);

        let alphabet_size = read_field(reader, ALPHABET_SIZE_BITS);
        if alphabet_size != ALPHABET_SIZE as u64 {
            return Err(HuffmanError::malformed_header(format!(
                "alphabet size {} (expected {})", alphabet_size, ALPHABET_SIZE
            )));
        }

        let mut lengths = [0u8; ALPHABET_SIZE];
        for len in lengths.iter_mut() {
            *len = read_field(reader, LENGTH_FIELD_BITS) as u8 + 1;
        }
        let lengths = CodeLengths::from_lengths(&lengths)?;

        if total_bits < HEADER_BITS {
            return Err(HuffmanError::malformed_header(format!(
                "declared size of {} bits is smaller than the header itself", total_bits
            )));
        }
        if total_bits > available {
            return Err(HuffmanError::malformed_header(format!(
                "declared size of {} bits exceeds the {} bits available", total_bits, available
            )));
        }

        log::debug!(
            "header at bit {}: {} symbols, {} payload bits, longest code {} bits",
            start, symbol_count, total_bits - HEADER_BITS, lengths.max_length()
        );

        Ok(Self { total_bits, symbol_count, lengths })
    }
}

#[inline(always)]
fn read_field(reader: &mut BitBuffer, bits: u64) -> u64 {
    let mut value = 0;
    let read = reader.read(bits, &mut value);
    debug_assert_eq!(read, bits);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::frequency::Frequencies;

    fn sample_header() -> EncodingHeader {
        let freq = Frequencies::from(&b"hello world!"[..]);
        let lengths = CodeLengths::from(&freq);
        EncodingHeader::new(lengths, freq.total(), lengths.encoded_bits(&freq))
    }

    #[test]
    fn test_header_size() {
        assert_eq!(HEADER_BITS, 1680);
    }

    #[test]
    fn test_header_round_trip() {
        let header = sample_header();

        let mut stream = BitBuffer::new();
        assert_eq!(header.write(&mut stream), HEADER_BITS);
        stream.write(header.payload_bits(), 0);

        let decoded = EncodingHeader::read(&mut stream).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.code(), header.code());
        assert_eq!(stream.read_position(), HEADER_BITS);
    }

    #[test]
    fn test_header_layout() {
        let header = EncodingHeader::new(CanonicalCode::default().lengths().to_owned(), 3, 24);

        let mut stream = BitBuffer::new();
        header.write(&mut stream);

        let mut value = 0;
        stream.read(64, &mut value);
        assert_eq!(value, HEADER_BITS + 24);
        stream.read(64, &mut value);
        assert_eq!(value, 3);
        stream.read(16, &mut value);
        assert_eq!(value, 256);
        stream.read(6, &mut value);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_truncated_header() {
        let mut stream = BitBuffer::new();
        sample_header().write(&mut stream);

        let mut short = BitBuffer::from_bytes(&stream.to_bytes()[..100]);
        assert!(matches!(
            EncodingHeader::read(&mut short),
            Err(HuffmanError::TruncatedStream { needed: HEADER_BITS, available: 800 })
        ));
    }

    #[test]
    fn test_wrong_alphabet_size() {
        let header = sample_header();
        let mut stream = BitBuffer::new();
        stream.write(64, header.total_bits);
        stream.write(64, header.symbol_count);
        stream.write(16, 255);
        for _ in 0..ALPHABET_SIZE {
            stream.write(6, 7);
        }
        stream.write(header.payload_bits(), 0);

        assert!(matches!(EncodingHeader::read(&mut stream), Err(HuffmanError::MalformedHeader(_))));
    }

    #[test]
    fn test_declared_size_exceeds_stream() {
        let header = sample_header();
        let mut stream = BitBuffer::new();
        header.write(&mut stream);
        stream.write(header.payload_bits() - 1, 0);

        assert!(matches!(EncodingHeader::read(&mut stream), Err(HuffmanError::MalformedHeader(_))));
    }

    #[test]
    fn test_oversubscribed_lengths() {
        let mut stream = BitBuffer::new();
        stream.write(64, HEADER_BITS);
        stream.write(64, 0);
        stream.write(16, 256);
        for _ in 0..ALPHABET_SIZE {
            // every symbol claims a 1-bit code
            stream.write(6, 0);
        }

        assert!(matches!(EncodingHeader::read(&mut stream), Err(HuffmanError::OversubscribedCode)));
    }
}
