//! Byte-oriented canonical Huffman coding.
//!
//! Encoding scans the whole input, builds code lengths from the byte counts,
//! turns them into a canonical code, and writes a header with the lengths
//! followed by the codes of the input bytes. Decoding reads the header back,
//! rebuilds the same canonical code from the lengths and resolves the payload
//! one bit at a time.

pub mod frequency;
pub mod lengths;
pub mod canonical;
pub mod header;
pub mod huffman_encoder;
pub mod huffman_decoder;
pub mod report;

use crate::{bitstreams::BitBuffer, utils::timer::PhaseTimer, Result};

use self::{frequency::Frequencies, huffman_decoder::HuffmanDecoder, huffman_encoder::HuffmanEncoder};

/// Number of distinct one-byte symbols.
pub const ALPHABET_SIZE: usize = 256;
/// Bits needed to represent one symbol verbatim.
pub const ALPHABET_BITS: u32 = 8;
/// Longest code the header can describe.
pub const MAX_CODE_LEN: u8 = 64;

/// A canonical code value, most significant bit first, and its length.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct CodeWord {
    pub value: u64,
    pub len: u8,
}

/// Encodes `data` into a header followed by its bit-packed payload.
pub fn compress(data: &[u8]) -> Box<[u8]> {
    let mut timer = PhaseTimer::new();

    timer.start("scan");
    let frequencies = Frequencies::from(data);

    timer.start("code");
    let encoder = HuffmanEncoder::from_frequencies(frequencies);

    timer.start("encode");
    let bytes = encoder.compress(data);
    timer.stop();

    debug_assert_eq!(bytes.len() as u64, (encoder.header().total_bits + 7) / 8);

    for (phase, nanos) in timer.phases() {
        log::debug!("compress {}: {}ns", phase, nanos);
    }

    bytes
}

/// Decodes a stream produced by [`compress`].
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut stream = BitBuffer::from_bytes(bytes);
    let decoder = HuffmanDecoder::read_header(&mut stream)?;
    decoder.decode_all(&mut stream)
}
