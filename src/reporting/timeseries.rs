// Continuous daily axis over the summaries, with missing days as gaps.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::models::{Summary, SummaryRecord};

pub const CHART_DATE_FORMAT: &str = "%b %d, %Y";

/// Inclusive range of days without a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GapRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct TimeSeries<'a> {
    /// Every calendar day from the first to the last summary.
    pub dates: Vec<NaiveDate>,
    /// Summary for each entry of `dates`, `None` for days without one.
    pub days: Vec<Option<&'a Summary>>,
}

impl<'a> TimeSeries<'a> {
    /// `records` must be sorted by date.
    pub fn build(records: &'a [SummaryRecord]) -> Self {
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Self::default();
        };
        let dates: Vec<NaiveDate> = first
            .date
            .iter_days()
            .take_while(|d| *d <= last.date)
            .collect();
        let mut days = vec![None; dates.len()];
        for r in records {
            if let Some(offset) = day_offset(first.date, r.date)
                && let Some(slot) = days.get_mut(offset)
            {
                *slot = Some(&r.data);
            }
        }
        Self { dates, days }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Summary for `date`; `None` outside the range or on a gap day.
    pub fn get(&self, date: NaiveDate) -> Option<&'a Summary> {
        let start = self.start()?;
        let offset = day_offset(start, date)?;
        self.days.get(offset).copied().flatten()
    }

    /// Axis labels, e.g. "Jan 02, 2025".
    pub fn labels(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| d.format(CHART_DATE_FORMAT).to_string())
            .collect()
    }

    /// Per-day value, `None` on gap days.
    pub fn map<T>(&self, f: impl Fn(&Summary) -> T) -> Vec<Option<T>> {
        self.days.iter().map(|d| d.map(&f)).collect()
    }

    /// Contiguous runs of missing days.
    pub fn gaps(&self) -> Vec<GapRange> {
        let mut gaps = Vec::new();
        let mut gap_start: Option<NaiveDate> = None;
        for (date, day) in self.dates.iter().zip(&self.days) {
            match (day, gap_start) {
                (None, None) => gap_start = Some(*date),
                (Some(_), Some(start)) => {
                    gaps.push(GapRange {
                        start,
                        end: *date - Days::new(1),
                    });
                    gap_start = None;
                }
                _ => {}
            }
        }
        if let (Some(start), Some(end)) = (gap_start, self.end()) {
            gaps.push(GapRange { start, end });
        }
        gaps
    }
}

fn day_offset(start: NaiveDate, date: NaiveDate) -> Option<usize> {
    usize::try_from((date - start).num_days()).ok()
}
