use super::ALPHABET_SIZE;

/// Occurrences of every byte value in the scanned input.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Frequencies {
    weights: [u64; ALPHABET_SIZE],
    total: u64,
}

impl Default for Frequencies {
    fn default() -> Self {
        Self { weights: [0; ALPHABET_SIZE], total: 0 }
    }
}

impl Frequencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the bytes of `data`. Repeated calls accumulate.
    pub fn scan(&mut self, data: &[u8]) {
        for &symbol in data {
            self.weights[symbol as usize] += 1;
        }
        self.total += data.len() as u64;
    }

    /// Adds the counts of an independent scan, e.g. of another chunk of the same input.
    pub fn merge(&mut self, other: &Frequencies) {
        for (weight, &more) in self.weights.iter_mut().zip(other.weights.iter()) {
            *weight += more;
        }
        self.total += other.total;
    }

    #[inline(always)]
    pub fn weight(&self, symbol: u8) -> u64 {
        self.weights[symbol as usize]
    }

    pub fn weights(&self) -> &[u64; ALPHABET_SIZE] {
        &self.weights
    }

    /// Number of scanned symbols.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of byte values seen at least once.
    pub fn distinct(&self) -> usize {
        self.weights.iter().filter(|&&w| w > 0).count()
    }

    /// Share of the input taken by `symbol`, 0 for an empty input.
    pub fn relative(&self, symbol: u8) -> f64 {
        if self.total == 0 {
            return 0.;
        }
        self.weight(symbol) as f64 / self.total as f64
    }
}

impl From<&[u8]> for Frequencies {
    fn from(data: &[u8]) -> Self {
        let mut frequencies = Self::new();
        frequencies.scan(data);
        frequencies
    }
}

#[test]
fn test_scan_counts_every_byte() {
    let freq = Frequencies::from(&b"hello world!"[..]);

    assert_eq!(freq.total(), 12);
    assert_eq!(freq.distinct(), 9);
    assert_eq!(freq.weight(b'l'), 3);
    assert_eq!(freq.weight(b'o'), 2);
    assert_eq!(freq.weight(b'!'), 1);
    assert_eq!(freq.weight(b'z'), 0);
    assert_eq!(freq.relative(b'l'), 0.25);
}

#[test]
fn test_merge_equals_single_scan() {
    let data = b"abracadabra, the quick brown fox";
    let (left, right) = data.split_at(13);

    let mut merged = Frequencies::from(left);
    merged.merge(&Frequencies::from(right));

    assert_eq!(merged, Frequencies::from(&data[..]));

    let mut rescanned = Frequencies::from(left);
    rescanned.scan(right);
    assert_eq!(rescanned, merged);
}

#[test]
fn test_empty_scan() {
    let freq = Frequencies::from(&b""[..]);
    assert_eq!(freq.total(), 0);
    assert_eq!(freq.distinct(), 0);
    assert_eq!(freq.relative(0), 0.);
}
