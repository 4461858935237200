// Daily summary: one per calendar day, written by the summarizer, read by chart export.
// Maps are BTreeMaps so serialized output is stable across runs.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category label -> number of instance-days.
pub type CountMap = BTreeMap<String, u64>;

/// Descriptive statistics for one library metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    #[serde(skip_serializing_if = "is_zero")]
    pub num_instances: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub num_active_users: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub versions: CountMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub os: CountMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub distros: CountMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub player_types: CountMap,
    /// Keyed by the per-instance active player total.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub players: CountMap,
    /// Keyed by the per-instance active user count.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub users: CountMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tracks: CountMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub albums: CountMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub artists: CountMap,
    #[serde(rename = "musicFS", skip_serializing_if = "BTreeMap::is_empty")]
    pub music_fs: CountMap,
    #[serde(rename = "dataFS", skip_serializing_if = "BTreeMap::is_empty")]
    pub data_fs: CountMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio_stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_stats: Option<Stats>,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

/// A persisted summary tagged with its calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub date: NaiveDate,
    pub data: Summary,
}

impl SummaryRecord {
    pub fn new(date: NaiveDate, data: Summary) -> Self {
        Self { date, data }
    }
}
