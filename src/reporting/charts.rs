// Chart data export: charts.json consumed by the web frontend.
// Only data selection and shaping happens here; styling belongs to the frontend.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::ChartsConfig;
use crate::models::{CountMap, Summary, SummaryRecord};
use crate::normalize::{BinSet, LibraryBins};
use crate::summary::SummaryStore;
use crate::summary::store::write_atomic;

use super::timeseries::CHART_DATE_FORMAT;
use super::{TimeSeries, exclude_incomplete_days, select_top_categories};

pub const CHARTS_JSON_FILE: &str = "charts.json";

/// Buckets for active clients per installation: (label, min, max inclusive).
const PLAYERS_PER_INSTALLATION: &[(&str, u64, Option<u64>)] = &[
    ("0", 0, Some(0)),
    ("1", 1, Some(1)),
    ("2", 2, Some(2)),
    ("3", 3, Some(3)),
    ("4", 4, Some(4)),
    ("5", 5, Some(5)),
    ("6-10", 6, Some(10)),
    ("11-20", 11, Some(20)),
    ("21-50", 21, Some(50)),
    ("50+", 51, None),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartsDocument {
    pub total_instances: u64,
    pub last_updated: DateTime<Utc>,
    pub charts: Vec<Chart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub id: &'static str,
    pub title: &'static str,
    #[serde(flatten)]
    pub data: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChartData {
    /// Daily series; `null` values mark days without data, listed again in `gaps`.
    Line {
        dates: Vec<String>,
        gaps: Vec<LabeledGap>,
        series: Vec<Series>,
    },
    Pie {
        slices: Vec<Slice>,
    },
    Bar {
        labels: Vec<String>,
        series: Vec<Series>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<Option<u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledGap {
    pub start: String,
    pub end: String,
}

/// Builds every chart from summaries sorted by date. `None` when nothing is left
/// after dropping incomplete trailing days.
pub fn build_document(
    records: &[SummaryRecord],
    config: &ChartsConfig,
    bins: &LibraryBins,
    now: DateTime<Utc>,
) -> Option<ChartsDocument> {
    let records = exclude_incomplete_days(records, config.incomplete_threshold);
    let latest = &records.last()?.data;
    let ts = TimeSeries::build(records);

    let charts = vec![
        Chart {
            id: "versions",
            title: "Number of Installations",
            data: versions_chart(&ts, config.top_versions, config.version_window_days),
        },
        Chart {
            id: "os",
            title: "Operating systems and architectures",
            data: os_chart(latest),
        },
        Chart {
            id: "players",
            title: "Number of Active Clients",
            data: players_chart(&ts),
        },
        Chart {
            id: "playerTypes",
            title: "Client types",
            data: player_types_chart(latest, config.player_group_threshold),
        },
        Chart {
            id: "playersPerInstallation",
            title: "Active Clients per Installation",
            data: players_per_installation_chart(latest),
        },
        Chart {
            id: "tracks",
            title: "Number of Tracks in Library",
            data: tracks_chart(latest, &bins.tracks),
        },
        Chart {
            id: "albumsArtists",
            title: "Albums and Artists in Library",
            data: albums_artists_chart(latest, &bins.albums),
        },
    ];

    Some(ChartsDocument {
        total_instances: latest.num_instances,
        last_updated: now,
        charts,
    })
}

fn labeled_gaps(ts: &TimeSeries<'_>) -> Vec<LabeledGap> {
    ts.gaps()
        .into_iter()
        .map(|g| LabeledGap {
            start: g.start.format(CHART_DATE_FORMAT).to_string(),
            end: g.end.format(CHART_DATE_FORMAT).to_string(),
        })
        .collect()
}

/// "All", the top versions of the trailing window, then "Others".
pub fn versions_chart(ts: &TimeSeries<'_>, top_n: usize, window_days: u32) -> ChartData {
    let selection = select_top_categories(ts, |s| &s.versions, top_n, window_days);

    let mut series = Vec::with_capacity(selection.categories.len() + 2);
    series.push(Series {
        name: "All".into(),
        data: selection.totals,
    });
    for (name, data) in selection.categories.into_iter().zip(selection.series) {
        series.push(Series { name, data });
    }
    series.push(Series {
        name: "Others".into(),
        data: selection.others,
    });

    ChartData::Line {
        dates: ts.labels(),
        gaps: labeled_gaps(ts),
        series,
    }
}

pub fn players_chart(ts: &TimeSeries<'_>) -> ChartData {
    ChartData::Line {
        dates: ts.labels(),
        gaps: labeled_gaps(ts),
        series: vec![Series {
            name: "Total Clients".into(),
            data: ts.map(|s| s.player_types.values().sum()),
        }],
    }
}

fn sorted_slices(mut slices: Vec<Slice>) -> Vec<Slice> {
    slices.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    slices
}

pub fn os_chart(latest: &Summary) -> ChartData {
    let slices = latest
        .os
        .iter()
        .map(|(name, &value)| Slice {
            name: name.clone(),
            value,
        })
        .collect();
    ChartData::Pie {
        slices: sorted_slices(slices),
    }
}

/// Client types under `threshold` of all clients are merged into one "Others" slice.
pub fn player_types_chart(latest: &Summary, threshold: f64) -> ChartData {
    let total: u64 = latest.player_types.values().sum();
    let cutoff = total as f64 * threshold;

    let mut slices = Vec::new();
    let mut others = 0;
    for (name, &value) in &latest.player_types {
        if (value as f64) < cutoff {
            others += value;
        } else {
            slices.push(Slice {
                name: name.clone(),
                value,
            });
        }
    }
    if others > 0 {
        let percent = (threshold * 1000.0).round() / 10.0;
        slices.push(Slice {
            name: format!("Others (less than {}%)", percent),
            value: others,
        });
    }
    ChartData::Pie {
        slices: sorted_slices(slices),
    }
}

pub fn players_per_installation_chart(latest: &Summary) -> ChartData {
    let mut values = vec![0u64; PLAYERS_PER_INSTALLATION.len()];
    for (key, &count) in &latest.players {
        let Ok(players) = key.parse::<u64>() else {
            continue;
        };
        if let Some(i) = PLAYERS_PER_INSTALLATION
            .iter()
            .position(|&(_, min, max)| players >= min && max.is_none_or(|m| players <= m))
        {
            values[i] += count;
        }
    }
    ChartData::Bar {
        labels: PLAYERS_PER_INSTALLATION
            .iter()
            .map(|(label, _, _)| (*label).to_string())
            .collect(),
        series: vec![Series {
            name: "Installations".into(),
            data: values.into_iter().map(Some).collect(),
        }],
    }
}

fn bin_series(name: &str, counts: &CountMap, bins: &BinSet) -> Series {
    Series {
        name: name.into(),
        data: bins
            .labels()
            .into_iter()
            .map(|(key, _)| Some(counts.get(&key).copied().unwrap_or(0)))
            .collect(),
    }
}

fn bin_labels(bins: &BinSet) -> Vec<String> {
    bins.labels().into_iter().map(|(_, label)| label).collect()
}

pub fn tracks_chart(latest: &Summary, bins: &BinSet) -> ChartData {
    ChartData::Bar {
        labels: bin_labels(bins),
        series: vec![bin_series("Installations", &latest.tracks, bins)],
    }
}

/// Albums and artists share one axis, keyed by the album thresholds.
pub fn albums_artists_chart(latest: &Summary, bins: &BinSet) -> ChartData {
    ChartData::Bar {
        labels: bin_labels(bins),
        series: vec![
            bin_series("Albums", &latest.albums, bins),
            bin_series("Artists", &latest.artists, bins),
        ],
    }
}

/// Loads all summaries, builds the charts and writes `<output_dir>/charts.json`.
/// Returns the written path, or `None` when there was no data to export.
#[instrument(skip(store, config, bins), fields(operation = "export_charts"))]
pub fn export_charts(
    store: &SummaryStore,
    config: &ChartsConfig,
    bins: &LibraryBins,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<PathBuf>> {
    let records = store.load_all()?;
    let Some(document) = build_document(&records, config, bins, now) else {
        info!("no data to export");
        return Ok(None);
    };
    let path = PathBuf::from(&config.output_dir).join(CHARTS_JSON_FILE);
    let json = serde_json::to_vec_pretty(&document)?;
    write_atomic(&path, &json)?;
    info!(path = %path.display(), total_instances = document.total_instances, "exported charts");
    Ok(Some(path))
}

/// `export_charts` on the blocking pool, for callers inside the runtime.
pub async fn export_charts_blocking(
    store: &SummaryStore,
    config: &ChartsConfig,
    bins: &LibraryBins,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<PathBuf>> {
    let (store, config, bins) = (store.clone(), config.clone(), bins.clone());
    tokio::task::spawn_blocking(move || export_charts(&store, &config, &bins, now)).await?
}
