use std::fmt;

use serde::Serialize;

use super::huffman_encoder::HuffmanEncoder;

#[derive(Clone, PartialEq, Serialize, Debug)]
pub struct SymbolStats {
    pub symbol: u8,
    pub weight: u64,
    pub frequency: f64,
    pub length: u8,
    pub code: String,
}

/// Human- and machine-readable summary of the code chosen by an encoder.
/// Only symbols that occur in the input are listed.
#[derive(Clone, PartialEq, Serialize, Debug)]
pub struct CodeReport {
    pub symbols: u64,
    pub distinct_symbols: usize,
    pub header_bits: u64,
    pub payload_bits: u64,
    pub entries: Vec<SymbolStats>,
}

impl CodeReport {
    pub fn new(encoder: &HuffmanEncoder) -> Self {
        let frequencies = encoder.frequencies();
        let code = encoder.code();

        let entries = (0..=u8::MAX)
            .filter(|&symbol| frequencies.weight(symbol) > 0)
            .map(|symbol| SymbolStats {
                symbol,
                weight: frequencies.weight(symbol),
                frequency: frequencies.relative(symbol),
                length: code.code(symbol).len,
                code: code.code_string(symbol),
            })
            .collect();

        Self {
            symbols: frequencies.total(),
            distinct_symbols: frequencies.distinct(),
            header_bits: encoder.header_bits(),
            payload_bits: encoder.payload_bits(),
            entries,
        }
    }

    /// Average payload bits per input symbol.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.symbols == 0 {
            return 0.;
        }
        self.payload_bits as f64 / self.symbols as f64
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for CodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "canonical Huffman coding")?;
        for entry in self.entries.iter() {
            writeln!(
                f,
                "{:#04x}: {:>10} ({:>8.4}) \"{}\"",
                entry.symbol, entry.weight, entry.frequency, entry.code
            )?;
        }
        writeln!(
            f,
            "{} symbols ({} distinct), header {} bits, payload {} bits ({:.4} bits/symbol)",
            self.symbols, self.distinct_symbols, self.header_bits, self.payload_bits, self.bits_per_symbol()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lists_present_symbols() {
        let encoder = HuffmanEncoder::new(b"hello world!");
        let report = CodeReport::new(&encoder);

        assert_eq!(report.symbols, 12);
        assert_eq!(report.distinct_symbols, 9);
        assert_eq!(report.entries.len(), 9);
        assert_eq!(report.header_bits, 1680);

        let l = report.entries.iter().find(|e| e.symbol == b'l').unwrap();
        assert_eq!(l.weight, 3);
        assert_eq!(l.frequency, 0.25);
        assert_eq!(l.code.len(), l.length as usize + 2);

        let payload: u64 = report.entries.iter().map(|e| e.weight * e.length as u64).sum();
        assert_eq!(payload, report.payload_bits);
    }

    #[test]
    fn test_report_display() {
        let encoder = HuffmanEncoder::new(b"aab");
        let text = CodeReport::new(&encoder).to_string();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("canonical Huffman coding"));
        assert_eq!(lines.next(), Some(&format!("0x61: {:>10} ({:>8.4}) \"0b0\"", 2, 2. / 3.)[..]));
        assert!(lines.next().unwrap().starts_with("0x62:          1 (  0.3333) \"0b1"));
        assert!(lines.next().unwrap().starts_with("3 symbols (2 distinct)"));
    }

    #[test]
    fn test_report_json() {
        let encoder = HuffmanEncoder::new(b"aab");
        let json = CodeReport::new(&encoder).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["symbols"], 3);
        assert_eq!(value["entries"][0]["symbol"], 97);
        assert_eq!(value["entries"][0]["code"], "0b0");
    }

    #[test]
    fn test_empty_report() {
        let report = CodeReport::new(&HuffmanEncoder::default());
        assert!(report.entries.is_empty());
        assert_eq!(report.bits_per_symbol(), 0.);
    }
}
