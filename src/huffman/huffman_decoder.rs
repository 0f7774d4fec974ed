use crate::{bitstreams::BitBuffer, HuffmanError, Result};

use super::{canonical::CanonicalCode, header::EncodingHeader};

/// Canonical Huffman decoder bound to the region described by one header.
#[derive(Clone, Debug)]
pub struct HuffmanDecoder {
    header: EncodingHeader,
    code: CanonicalCode,
    start: u64,
    end: u64,
}

impl HuffmanDecoder {
    /// Reads the header at the read cursor and rebuilds the code table from it.
    pub fn read_header(reader: &mut BitBuffer) -> Result<Self> {
        let start = reader.read_position();
        let header = EncodingHeader::read(reader)?;
        let code = header.code();

        Ok(Self { header, code, start, end: start + header.total_bits })
    }

    pub fn header(&self) -> &EncodingHeader {
        &self.header
    }

    pub fn code(&self) -> &CanonicalCode {
        &self.code
    }

    /// Decodes one symbol.
    ///
    /// Bits are consumed one at a time and matched against the canonical codes
    /// of the current length. Returns `Ok(None)` once the region declared by
    /// the header (or the stream itself) runs out before a code is complete.
    #[inline(always)]
    pub fn decode(&self, reader: &mut BitBuffer) -> Result<Option<u8>> {
        let max_len = self.code.max_length();
        let mut value = 0u64;
        let mut len = 0u8;

        loop {
            if reader.read_position() >= self.end {
                return Ok(None);
            }
            let Some(bit) = reader.read_bit() else {
                return Ok(None);
            };

            value = (value << 1) | bit as u64;
            len += 1;

            if let Some(symbol) = self.code.resolve(value, len) {
                return Ok(Some(symbol));
            }

            if len >= max_len {
                return Err(HuffmanError::UnresolvableCode { position: reader.read_position() });
            }
        }
    }

    /// Iterates over the symbols of the message, stopping after the number
    /// declared by the header.
    pub fn symbols<'a>(&'a self, reader: &'a mut BitBuffer) -> Symbols<'a> {
        Symbols { decoder: self, reader, decoded: 0, failed: false }
    }

    /// Decodes the whole message. A payload that ends before the declared
    /// number of symbols is a [`HuffmanError::TruncatedStream`].
    pub fn decode_all(&self, reader: &mut BitBuffer) -> Result<Vec<u8>> {
        self.symbols(reader).collect()
    }
}

pub struct Symbols<'a> {
    decoder: &'a HuffmanDecoder,
    reader: &'a mut BitBuffer,
    decoded: u64,
    failed: bool,
}

impl<'a> Iterator for Symbols<'a> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.decoded >= self.decoder.header.symbol_count {
            return None;
        }

        match self.decoder.decode(self.reader) {
            Ok(Some(symbol)) => {
                self.decoded += 1;
                Some(Ok(symbol))
            }
            Ok(None) => {
                self.failed = true;
                Some(Err(HuffmanError::TruncatedStream {
                    needed: self.reader.read_position() - self.decoder.start + 1,
                    available: self.decoder.header.total_bits,
                }))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.decoder.header.symbol_count - self.decoded;
        (0, usize::try_from(left).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::huffman_encoder::HuffmanEncoder;

    fn encoded(data: &[u8]) -> BitBuffer {
        let encoder = HuffmanEncoder::new(data);
        let mut stream = BitBuffer::new();
        encoder.write_header(&mut stream);
        encoder.encode_all(&mut stream, data);
        stream
    }

    #[test]
    fn test_decode_one_at_a_time() {
        let data = b"abracadabra";
        let mut stream = encoded(data);

        let decoder = HuffmanDecoder::read_header(&mut stream).unwrap();
        for &expected in data.iter() {
            assert_eq!(decoder.decode(&mut stream).unwrap(), Some(expected));
        }
        assert_eq!(decoder.decode(&mut stream).unwrap(), None);
    }

    #[test]
    fn test_padding_is_not_decoded() {
        let data = b"zzzzzzzzz";
        let stream = encoded(data);
        // 1680 + 9 bits: the packed form carries 7 bits of padding
        let mut packed = BitBuffer::from_bytes(&stream.to_bytes());
        assert_eq!(packed.len() % 8, 0);

        let decoder = HuffmanDecoder::read_header(&mut packed).unwrap();
        let symbols: Vec<_> = std::iter::from_fn(|| decoder.decode(&mut packed).unwrap()).collect();
        assert_eq!(symbols, data);
    }

    #[test]
    fn test_truncated_payload() {
        let data = b"the payload below is cut short";
        let encoder = HuffmanEncoder::new(data);
        let mut stream = BitBuffer::new();
        let mut header = encoder.header();
        header.total_bits -= 5;
        header.write(&mut stream);
        encoder.encode_all(&mut stream, data);

        let decoder = HuffmanDecoder::read_header(&mut stream).unwrap();
        let err = decoder.decode_all(&mut stream).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_unresolvable_code() {
        // An incomplete code: 'x' is "0", every other code is 9 bits long and
        // starts with "1", leaving "111111111" unassigned.
        let mut lengths = [9u8; 256];
        lengths[b'x' as usize] = 1;
        let lengths = crate::huffman::lengths::CodeLengths::from_lengths(&lengths).unwrap();

        let mut stream = BitBuffer::new();
        EncodingHeader::new(lengths, 1, 9).write(&mut stream);
        stream.write(9, 0x1FF);

        let decoder = HuffmanDecoder::read_header(&mut stream).unwrap();
        assert!(matches!(
            decoder.decode(&mut stream),
            Err(HuffmanError::UnresolvableCode { position: 1689 })
        ));
    }

    #[test]
    fn test_symbols_iterator_stops_at_count() {
        let data = b"count me";
        let mut stream = encoded(data);
        // trailing garbage after the message region
        stream.write(32, 0xDEAD_BEEF);

        let decoder = HuffmanDecoder::read_header(&mut stream).unwrap();
        let decoded: Result<Vec<u8>> = decoder.symbols(&mut stream).collect();
        assert_eq!(decoded.unwrap(), data);
    }
}
