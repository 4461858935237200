// Summary files: <dir>/YYYY/MM/summary-YYYY-MM-DD.json, one per day.
// Writes go to a temp file that is renamed over the target, so readers never see
// a partial summary and a failed write keeps the previous one.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Summary, SummaryRecord};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

static SUMMARY_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^summary-(\d{4}-\d{2}-\d{2})\.json$").expect("valid summary file regex")
});

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("summary store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("summary serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone)]
pub struct SummaryStore {
    dir: PathBuf,
}

impl SummaryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.dir
            .join(day.format("%Y").to_string())
            .join(day.format("%m").to_string())
            .join(format!("summary-{}.json", day.format(DATE_FORMAT)))
    }

    /// Writes (or replaces) the summary for `day`. Returns the file path.
    pub fn save(&self, day: NaiveDate, summary: &Summary) -> Result<PathBuf, StoreError> {
        let path = self.path_for(day);
        let json = serde_json::to_vec_pretty(summary)?;
        write_atomic(&path, &json)?;
        Ok(path)
    }

    /// Summary for one day, `None` if it was never written.
    pub fn load(&self, day: NaiveDate) -> Result<Option<Summary>, StoreError> {
        let path = self.path_for(day);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    /// All non-empty summaries, oldest first. Unreadable or malformed files are skipped.
    pub fn load_all(&self) -> Result<Vec<SummaryRecord>, StoreError> {
        let mut out = Vec::new();
        if !self.dir.exists() {
            return Ok(out);
        }
        walk(&self.dir, &mut out)?;
        out.sort_by_key(|r| r.date);
        Ok(out)
    }
}

fn walk(dir: &Path, out: &mut Vec<SummaryRecord>) -> Result<(), StoreError> {
    let entries = std::fs::read_dir(dir).map_err(io_err(dir))?;
    for entry in entries {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_err(&path))?;
        if file_type.is_dir() {
            walk(&path, out)?;
            continue;
        }
        let name = entry.file_name();
        let Some(caps) = name.to_str().and_then(|n| SUMMARY_FILE.captures(n)) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(&caps[1], DATE_FORMAT) else {
            warn!(path = %path.display(), "skipping summary file with invalid date");
            continue;
        };
        if let Some(data) = read_summary(&path) {
            out.push(SummaryRecord::new(date, data));
        }
    }
    Ok(())
}

fn read_summary(path: &Path) -> Option<Summary> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable summary file");
            return None;
        }
    };
    let summary: Summary = match serde_json::from_slice(&bytes) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping malformed summary file");
            return None;
        }
    };
    if summary.num_instances == 0 {
        debug!(path = %path.display(), "skipping empty summary");
        return None;
    }
    Some(summary)
}

/// Write to `<path>.tmp` then rename over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(e) = std::fs::write(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&tmp)(e));
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        io_err(path)(e)
    })
}
