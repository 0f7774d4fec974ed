//! Error types for header parsing and payload decoding.

/// Failures reported while reading an encoded stream.
///
/// Tree construction never produces these: a broken tree is a bug in the
/// builder and panics instead.
#[derive(Debug, thiserror::Error)]
pub enum HuffmanError {
    /// The header declares an alphabet or a size that cannot belong to this format.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The stream ended before a field or the payload was complete.
    #[error("truncated stream: needed {needed} bits, {available} available")]
    TruncatedStream { needed: u64, available: u64 },

    /// A code length outside 1..=64.
    #[error("invalid code length {length} for symbol {symbol:#04x}")]
    InvalidCodeLength { symbol: usize, length: u64 },

    /// The declared lengths violate Kraft's inequality.
    #[error("code lengths are oversubscribed")]
    OversubscribedCode,

    /// No canonical code matched after consuming the longest code length.
    #[error("unresolvable code at bit {position}")]
    UnresolvableCode { position: u64 },

    /// A `.properties` sidecar is missing a key or disagrees with the stream.
    #[error("malformed properties: {0}")]
    MalformedProperties(String),

    /// A restored bit buffer whose length or cursors lie outside its storage.
    #[error("inconsistent bit buffer: {0}")]
    InconsistentBuffer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HuffmanError {
    pub fn malformed_header<S: Into<String>>(message: S) -> Self {
        Self::MalformedHeader(message.into())
    }

    pub fn malformed_properties<S: Into<String>>(message: S) -> Self {
        Self::MalformedProperties(message.into())
    }

    /// Returns true if the error was caused by running out of input.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        matches!(self, HuffmanError::TruncatedStream { .. })
    }
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
