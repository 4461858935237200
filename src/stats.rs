// Descriptive statistics over a day's per-instance values.

use crate::models::Stats;

/// Min, max, mean, median and population standard deviation.
/// Returns `None` for an empty sample: "no data", not zeroes.
pub fn calc_stats(values: &[i64]) -> Option<Stats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];

    let sum: i128 = sorted.iter().map(|&v| v as i128).sum();
    let mean = sum as f64 / n as f64;

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    } else {
        sorted[n / 2] as f64
    };

    let sum_sq: f64 = sorted
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum();
    let std_dev = (sum_sq / n as f64).sqrt();

    Some(Stats {
        min,
        max,
        mean,
        median,
        std_dev,
    })
}
