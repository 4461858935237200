// Library-size binning: count -> highest threshold <= count.

use crate::models::CountMap;

pub const DEFAULT_TRACK_BINS: &[i64] = &[
    0, 1, 100, 500, 1_000, 5_000, 10_000, 20_000, 50_000, 100_000, 500_000, 1_000_000,
];
pub const DEFAULT_ALBUM_BINS: &[i64] = &[
    0, 1, 10, 50, 100, 500, 1_000, 2_000, 5_000, 10_000, 50_000, 100_000,
];
pub const DEFAULT_ARTIST_BINS: &[i64] = &[
    0, 1, 10, 50, 100, 500, 1_000, 2_000, 5_000, 10_000, 50_000, 100_000,
];

/// Increments the counter keyed by the largest threshold <= `count`.
/// Counts below every threshold are left unbinned.
pub fn bin_count(count: i64, thresholds: &[i64], counters: &mut CountMap) {
    if let Some(bin) = thresholds.iter().rev().find(|&&b| count >= b) {
        *counters.entry(bin.to_string()).or_default() += 1;
    }
}

/// Ascending thresholds for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct BinSet {
    thresholds: Vec<i64>,
}

impl BinSet {
    pub fn new(thresholds: Vec<i64>) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &[i64] {
        &self.thresholds
    }

    pub fn is_ascending(&self) -> bool {
        self.thresholds.windows(2).all(|w| w[0] < w[1])
    }

    pub fn bin(&self, count: i64, counters: &mut CountMap) {
        bin_count(count, &self.thresholds, counters);
    }

    /// (counter key, display label) per threshold, in ascending order.
    /// `0` -> `"0"`, `1..499` -> `"1-499"`, last -> `"1,000,000+"`.
    pub fn labels(&self) -> Vec<(String, String)> {
        self.thresholds
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                let label = match self.thresholds.get(i + 1) {
                    Some(&next) if next - 1 == b => group_thousands(b),
                    Some(&next) => format!("{}-{}", group_thousands(b), group_thousands(next - 1)),
                    None => format!("{}+", group_thousands(b)),
                };
                (b.to_string(), label)
            })
            .collect()
    }
}

/// Thresholds for the three library-size metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryBins {
    pub tracks: BinSet,
    pub albums: BinSet,
    pub artists: BinSet,
}

impl Default for LibraryBins {
    fn default() -> Self {
        Self {
            tracks: BinSet::new(DEFAULT_TRACK_BINS.to_vec()),
            albums: BinSet::new(DEFAULT_ALBUM_BINS.to_vec()),
            artists: BinSet::new(DEFAULT_ARTIST_BINS.to_vec()),
        }
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
