// Reporting: shape the ordered list of daily summaries into chart-ready views.

pub mod charts;
pub mod timeseries;
pub mod top_n;

use crate::models::SummaryRecord;

pub use timeseries::{GapRange, TimeSeries};
pub use top_n::{CategorySelection, select_top_categories};

/// Drops trailing days whose instance count fell below `threshold` times the previous
/// day's. Today's summary keeps growing until the day is over, so a sharp drop at the
/// tail means "not finished yet", not "fewer instances".
pub fn exclude_incomplete_days(records: &[SummaryRecord], threshold: f64) -> &[SummaryRecord] {
    let mut end = records.len();
    while end > 1 {
        let last = records[end - 1].data.num_instances;
        let prev = records[end - 2].data.num_instances;
        if prev == 0 || (last as f64 / prev as f64) >= threshold {
            break;
        }
        end -= 1;
    }
    &records[..end]
}
