use serde::Deserialize;
use std::str::FromStr;

use crate::normalize::bins::{
    BinSet, DEFAULT_ALBUM_BINS, DEFAULT_ARTIST_BINS, DEFAULT_TRACK_BINS, LibraryBins,
};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub summaries: SummariesConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub charts: ChartsConfig,
    #[serde(default)]
    pub bins: BinsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// One /collect request per source IP per window.
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    /// When set, GET /api/charts requires this key (Bearer header or api_key query).
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_rate_limit_window_secs() -> u64 {
    30 * 60
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    60
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummariesConfig {
    pub dir: String,
    /// Days re-summarized on every run, today included.
    pub lookback_days: u32,
}

impl Default for SummariesConfig {
    fn default() -> Self {
        Self {
            dir: "data/summaries".into(),
            lookback_days: 10,
        }
    }
}

/// Cron expressions (seconds field first), evaluated in UTC.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub summarize: String,
    pub export_charts: String,
    pub purge: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            summarize: "0 0 */2 * * *".into(),
            export_charts: "0 5 0 * * *".into(),
            purge: "0 30 0 * * *".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub output_dir: String,
    pub top_versions: usize,
    /// Trailing days used to pick the top versions.
    pub version_window_days: u32,
    /// A trailing day below this ratio of the previous day is treated as incomplete.
    pub incomplete_threshold: f64,
    /// Client types below this share of the total are folded into "Others".
    pub player_group_threshold: f64,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            output_dir: "web/chartdata".into(),
            top_versions: 15,
            version_window_days: 7,
            incomplete_threshold: 0.8,
            player_group_threshold: 0.002,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BinsConfig {
    pub tracks: Vec<i64>,
    pub albums: Vec<i64>,
    pub artists: Vec<i64>,
}

impl Default for BinsConfig {
    fn default() -> Self {
        Self {
            tracks: DEFAULT_TRACK_BINS.to_vec(),
            albums: DEFAULT_ALBUM_BINS.to_vec(),
            artists: DEFAULT_ARTIST_BINS.to_vec(),
        }
    }
}

impl BinsConfig {
    pub fn library_bins(&self) -> LibraryBins {
        LibraryBins {
            tracks: BinSet::new(self.tracks.clone()),
            albums: BinSet::new(self.albums.clone()),
            artists: BinSet::new(self.artists.clone()),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.server.rate_limit_window_secs > 0,
            "server.rate_limit_window_secs must be > 0, got {}",
            self.server.rate_limit_window_secs
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.retention_days > 0,
            "database.retention_days must be > 0, got {}",
            self.database.retention_days
        );
        anyhow::ensure!(
            !self.summaries.dir.is_empty(),
            "summaries.dir must be non-empty"
        );
        anyhow::ensure!(
            self.summaries.lookback_days > 0,
            "summaries.lookback_days must be > 0, got {}",
            self.summaries.lookback_days
        );
        for (key, expr) in [
            ("schedule.summarize", &self.schedule.summarize),
            ("schedule.export_charts", &self.schedule.export_charts),
            ("schedule.purge", &self.schedule.purge),
        ] {
            if let Err(e) = cron::Schedule::from_str(expr) {
                anyhow::bail!("{} is not a valid cron expression ({:?}): {}", key, expr, e);
            }
        }
        anyhow::ensure!(
            !self.charts.output_dir.is_empty(),
            "charts.output_dir must be non-empty"
        );
        anyhow::ensure!(
            self.charts.top_versions > 0,
            "charts.top_versions must be > 0, got {}",
            self.charts.top_versions
        );
        anyhow::ensure!(
            self.charts.version_window_days > 0,
            "charts.version_window_days must be > 0, got {}",
            self.charts.version_window_days
        );
        anyhow::ensure!(
            self.charts.incomplete_threshold > 0.0 && self.charts.incomplete_threshold <= 1.0,
            "charts.incomplete_threshold must be in (0, 1], got {}",
            self.charts.incomplete_threshold
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.charts.player_group_threshold),
            "charts.player_group_threshold must be in [0, 1), got {}",
            self.charts.player_group_threshold
        );
        let bins = self.bins.library_bins();
        for (key, set) in [
            ("bins.tracks", &bins.tracks),
            ("bins.albums", &bins.albums),
            ("bins.artists", &bins.artists),
        ] {
            anyhow::ensure!(
                !set.thresholds().is_empty() && set.is_ascending(),
                "{} must be a non-empty, strictly ascending list",
                key
            );
        }
        Ok(())
    }
}
