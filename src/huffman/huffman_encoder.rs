use crate::bitstreams::BitBuffer;

use super::{canonical::CanonicalCode, frequency::Frequencies, header::{EncodingHeader, HEADER_BITS}, lengths::CodeLengths};

/// Canonical Huffman encoder for one input message.
#[derive(Clone, Debug)]
pub struct HuffmanEncoder {
    frequencies: Frequencies,
    code: CanonicalCode,
    payload_bits: u64,
}

impl Default for HuffmanEncoder {
    fn default() -> Self {
        Self::from_frequencies(Frequencies::default())
    }
}

impl HuffmanEncoder {
    /// Scans `data` and builds the code for it.
    pub fn new(data: &[u8]) -> Self {
        Self::from_frequencies(Frequencies::from(data))
    }

    /// Builds the code from already collected counts, e.g. merged chunk scans.
    pub fn from_frequencies(frequencies: Frequencies) -> Self {
        let lengths = CodeLengths::from(&frequencies);
        let payload_bits = lengths.encoded_bits(&frequencies);
        let code = CanonicalCode::from_lengths(lengths);

        log::debug!(
            "{} symbols ({} distinct): longest code {} bits, payload {} bits",
            frequencies.total(), frequencies.distinct(), code.max_length(), payload_bits
        );

        Self { frequencies, code, payload_bits }
    }

    pub fn frequencies(&self) -> &Frequencies {
        &self.frequencies
    }

    pub fn code(&self) -> &CanonicalCode {
        &self.code
    }

    /// Size in bits of the encoded scanned input.
    pub fn payload_bits(&self) -> u64 {
        self.payload_bits
    }

    pub fn header_bits(&self) -> u64 {
        HEADER_BITS
    }

    pub fn header(&self) -> EncodingHeader {
        EncodingHeader::new(*self.code.lengths(), self.frequencies.total(), self.payload_bits)
    }

    pub fn write_header(&self, writer: &mut BitBuffer) -> u64 {
        self.header().write(writer)
    }

    /// Appends the code of `symbol` and returns its length.
    #[inline(always)]
    pub fn encode(&self, writer: &mut BitBuffer, symbol: u8) -> u64 {
        let len = self.code.code(symbol).len as u64;
        writer.write(len, self.code.emitted(symbol))
    }

    /// Encodes every symbol of `data` and returns the number of bits written.
    ///
    /// The header only matches the output when `data` is the scanned input.
    pub fn encode_all(&self, writer: &mut BitBuffer, data: &[u8]) -> u64 {
        data.iter().map(|&symbol| self.encode(writer, symbol)).sum()
    }

    /// Writes the header and the encoded `data` into a fresh stream and packs it into bytes.
    pub fn compress(&self, data: &[u8]) -> Box<[u8]> {
        let mut stream = BitBuffer::new();
        stream.reserve(HEADER_BITS + self.payload_bits);
        self.write_header(&mut stream);
        self.encode_all(&mut stream, data);
        stream.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_writes_reversed_codes() {
        let encoder = HuffmanEncoder::new(b"aaaab");
        let mut stream = BitBuffer::new();

        let code = encoder.code().code(b'b');
        assert_eq!(encoder.encode(&mut stream, b'b'), code.len as u64);

        // The first bit in the stream is the most significant bit of the code.
        let mut first = 0;
        stream.read(1, &mut first);
        assert_eq!(first, code.value >> (code.len - 1));
    }

    #[test]
    fn test_encode_all_matches_payload_size() {
        let data = b"it was the best of times, it was the worst of times";
        let encoder = HuffmanEncoder::new(data);
        let mut stream = BitBuffer::new();

        assert_eq!(encoder.write_header(&mut stream), HEADER_BITS);
        assert_eq!(encoder.encode_all(&mut stream, data), encoder.payload_bits());
        assert_eq!(stream.len(), encoder.header().total_bits);
    }

    #[test]
    fn test_default_encoder_is_flat() {
        let encoder = HuffmanEncoder::default();
        assert_eq!(encoder.code(), &CanonicalCode::default());
        assert_eq!(encoder.payload_bits(), 0);
        assert_eq!(encoder.header().symbol_count, 0);
    }
}
