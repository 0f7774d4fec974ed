pub mod bitstreams;
pub mod error;
pub mod huffman;
pub mod properties;
pub mod utils;

pub use error::{HuffmanError, Result};
pub use bitstreams::BitBuffer;
pub use huffman::{compress, decompress, huffman_encoder::HuffmanEncoder, huffman_decoder::HuffmanDecoder};
pub use properties::Properties;
