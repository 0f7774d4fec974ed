use std::{collections::HashMap, io::Read};

use crate::{bitstreams::BLOCK_BITS, huffman::{header::EncodingHeader, huffman_encoder::HuffmanEncoder}, HuffmanError, Result};

pub const PROPERTIES_VERSION: u32 = 0;

/// Metadata stored next to a compressed file as `<name>.properties`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Properties {
    pub version: u32,
    pub symbols: u64,
    pub distinct_symbols: usize,
    pub header_bits: u64,
    pub payload_bits: u64,
    pub max_code_length: u8,
    pub block_bits: u64,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            version: PROPERTIES_VERSION,
            symbols: 0,
            distinct_symbols: 0,
            header_bits: 0,
            payload_bits: 0,
            max_code_length: 0,
            block_bits: BLOCK_BITS,
        }
    }
}

impl From<&HuffmanEncoder> for Properties {
    fn from(encoder: &HuffmanEncoder) -> Self {
        Self {
            symbols: encoder.frequencies().total(),
            distinct_symbols: encoder.frequencies().distinct(),
            header_bits: encoder.header_bits(),
            payload_bits: encoder.payload_bits(),
            max_code_length: encoder.code().max_length(),
            ..Default::default()
        }
    }
}

fn parse_key<T: std::str::FromStr>(value: &HashMap<String, String>, key: &str) -> Result<T> {
    let raw = value
        .get(key)
        .ok_or_else(|| HuffmanError::malformed_properties(format!("missing key {}", key)))?;
    raw.trim()
        .parse()
        .map_err(|_| HuffmanError::malformed_properties(format!("cannot parse {}={}", key, raw)))
}

impl TryFrom<HashMap<String, String>> for Properties {
    type Error = HuffmanError;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let props = Properties {
            version: parse_key(&value, "version")?,
            symbols: parse_key(&value, "symbols")?,
            distinct_symbols: parse_key(&value, "distinctsymbols")?,
            header_bits: parse_key(&value, "headerbits")?,
            payload_bits: parse_key(&value, "payloadbits")?,
            max_code_length: parse_key(&value, "maxcodelength")?,
            block_bits: match value.get("blockbits") {
                Some(_) => parse_key(&value, "blockbits")?,
                None => BLOCK_BITS,
            },
        };

        if props.version != PROPERTIES_VERSION {
            return Err(HuffmanError::malformed_properties(format!("unsupported version {}", props.version)));
        }

        Ok(props)
    }
}

impl From<Properties> for String {
    fn from(val: Properties) -> Self {
        let mut s = String::new();

        s.push_str("#Huffman properties\n");
        s.push_str(&format!("version={}\n", val.version));
        s.push_str(&format!("symbols={}\n", val.symbols));
        s.push_str(&format!("distinctsymbols={}\n", val.distinct_symbols));
        s.push_str(&format!("headerbits={}\n", val.header_bits));
        s.push_str(&format!("payloadbits={}\n", val.payload_bits));
        s.push_str(&format!("maxcodelength={}\n", val.max_code_length));
        s.push_str(&format!("blockbits={}\n", val.block_bits));

        s
    }
}

impl Properties {
    /// Parses a `.properties` document.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let map = java_properties::read(reader)
            .map_err(|e| HuffmanError::malformed_properties(e.to_string()))?;
        Self::try_from(map)
    }

    pub fn total_bits(&self) -> u64 {
        self.header_bits + self.payload_bits
    }

    /// Checks that a decoded header describes the stream these properties were written for.
    pub fn check(&self, header: &EncodingHeader) -> Result<()> {
        if header.symbol_count != self.symbols {
            return Err(HuffmanError::malformed_properties(format!(
                "header declares {} symbols, properties {}", header.symbol_count, self.symbols
            )));
        }
        if header.total_bits != self.total_bits() {
            return Err(HuffmanError::malformed_properties(format!(
                "header declares {} bits, properties {}", header.total_bits, self.total_bits()
            )));
        }
        if header.lengths.max_length() != self.max_code_length {
            return Err(HuffmanError::malformed_properties(format!(
                "header has codes up to {} bits, properties {}", header.lengths.max_length(), self.max_code_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_round_trip() {
        let encoder = HuffmanEncoder::new(b"hello world!");
        let props = Properties::from(&encoder);
        assert_eq!(props.symbols, 12);
        assert_eq!(props.distinct_symbols, 9);
        assert_eq!(props.total_bits(), 1680 + 38);

        let text: String = props.clone().into();
        assert!(text.starts_with("#Huffman properties\n"));

        let parsed = Properties::read(text.as_bytes()).unwrap();
        assert_eq!(parsed, props);
        parsed.check(&encoder.header()).unwrap();
    }

    #[test]
    fn test_missing_key() {
        let text = "version=0\nsymbols=12\n";
        assert!(matches!(Properties::read(text.as_bytes()), Err(HuffmanError::MalformedProperties(_))));
    }

    #[test]
    fn test_unparsable_value() {
        let mut map = HashMap::new();
        for key in ["version", "symbols", "distinctsymbols", "headerbits", "payloadbits", "maxcodelength"] {
            map.insert(key.to_owned(), "1".to_owned());
        }
        map.insert("version".to_owned(), "0".to_owned());
        assert!(Properties::try_from(map.clone()).is_ok());

        map.insert("symbols".to_owned(), "twelve".to_owned());
        assert!(matches!(Properties::try_from(map), Err(HuffmanError::MalformedProperties(_))));
    }

    #[test]
    fn test_check_detects_mismatch() {
        let props = Properties::from(&HuffmanEncoder::new(b"one message"));
        let other = HuffmanEncoder::new(b"another message");
        assert!(matches!(props.check(&other.header()), Err(HuffmanError::MalformedProperties(_))));
    }
}
