// Top-N category selection over a trailing window, with an "Others" remainder per day.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

use chrono::Days;

use crate::models::{CountMap, Summary};

use super::TimeSeries;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySelection {
    /// Selected categories, ordered by their count on the most recent day (descending).
    pub categories: Vec<String>,
    /// One series per entry of `categories`, aligned with the time series dates.
    pub series: Vec<Vec<Option<u64>>>,
    /// Sum of all categories per day.
    pub totals: Vec<Option<u64>>,
    /// Per day: total minus the selected categories.
    pub others: Vec<Option<u64>>,
}

/// Picks the `top_n` categories by their summed counts over the last `window_days`
/// days of `ts` (ending at its last day), so the selection follows current adoption
/// rather than all-time totals. "Others" still carries each day's full remainder.
pub fn select_top_categories<F>(
    ts: &TimeSeries<'_>,
    extract: F,
    top_n: usize,
    window_days: u32,
) -> CategorySelection
where
    F: Fn(&Summary) -> &CountMap,
{
    let Some(last_date) = ts.end() else {
        return CategorySelection::default();
    };
    let window_start = last_date
        .checked_sub_days(Days::new(u64::from(window_days.saturating_sub(1))))
        .unwrap_or(last_date);

    let mut window_totals: BTreeMap<&str, u64> = BTreeMap::new();
    for (date, day) in ts.dates.iter().zip(&ts.days) {
        let Some(summary) = day else { continue };
        if *date < window_start {
            continue;
        }
        for (category, count) in extract(summary) {
            *window_totals.entry(category.as_str()).or_default() += count;
        }
    }

    let mut ranked: Vec<(&str, u64)> = window_totals.into_iter().collect();
    ranked.sort_by_key(|&(category, total)| (Reverse(total), category));
    ranked.truncate(top_n);

    let latest = ts.days.last().copied().flatten();
    let latest_count = |category: &str| latest.and_then(|s| extract(s).get(category)).copied();
    ranked.sort_by_key(|&(category, total)| {
        (Reverse(latest_count(category).unwrap_or(0)), Reverse(total), category)
    });

    let categories: Vec<String> = ranked.iter().map(|(c, _)| (*c).to_string()).collect();
    let selected: HashSet<&str> = categories.iter().map(String::as_str).collect();

    let series = categories
        .iter()
        .map(|c| ts.map(|s| extract(s).get(c).copied().unwrap_or(0)))
        .collect();
    let totals: Vec<Option<u64>> = ts.map(|s| extract(s).values().sum());
    let others: Vec<Option<u64>> = ts.map(|s| {
        extract(s)
            .iter()
            .filter(|(c, _)| !selected.contains(c.as_str()))
            .map(|(_, n)| n)
            .sum()
    });

    CategorySelection {
        categories,
        series,
        totals,
        others,
    }
}
