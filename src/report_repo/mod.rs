// SQLite store for raw reports. One row per submission; payload kept as JSON text.
// Times are UTC, stored as "YYYY-MM-DD HH:MM:SS" so date() range filters work on the text.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures_util::{Stream, StreamExt};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

use crate::models::Report;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Latest report per instance within one day, ordered by id then newest first.
const SELECT_DAY: &str = r#"
SELECT i1.id, i1.time, i1.data
FROM insights i1
INNER JOIN (
    SELECT id, MAX(time) AS max_time
    FROM insights
    WHERE time >= date($1) AND time < date($1, '+1 day')
    GROUP BY id
) i2 ON i1.id = i2.id AND i1.time = i2.max_time
WHERE i1.time >= date($1) AND i1.time < date($1, '+1 day')
ORDER BY i1.id, i1.time DESC
"#;

pub struct ReportRepo {
    pool: SqlitePool,
}

impl ReportRepo {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS insights (
                id TEXT NOT NULL,
                time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS insights_time ON insights(time)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS insights_id_time ON insights(id, time)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, report), fields(repo = "reports", operation = "save_report"))]
    pub async fn save_report(&self, report: &Report, at: DateTime<Utc>) -> anyhow::Result<()> {
        let data = serde_json::to_string(report)?;
        sqlx::query("INSERT INTO insights (id, time, data) VALUES ($1, $2, $3)")
            .bind(&report.id)
            .bind(at.format(TIME_FORMAT).to_string())
            .bind(data)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Lazily yields the latest report of each instance submitted on `day`.
    /// At most one report per instance: rows sharing the same latest timestamp are collapsed.
    pub fn select_day(
        &self,
        day: NaiveDate,
    ) -> impl Stream<Item = anyhow::Result<Report>> + Send + '_ {
        let mut last_id: Option<String> = None;
        sqlx::query(SELECT_DAY)
            .bind(day.format("%Y-%m-%d").to_string())
            .fetch(&self.pool)
            .filter_map(move |row| {
                let out = match row.map_err(anyhow::Error::from).and_then(|r| parse_row(&r)) {
                    Ok((id, _)) if last_id.as_deref() == Some(id.as_str()) => None,
                    Ok((id, report)) => {
                        last_id = Some(id);
                        Some(Ok(report))
                    }
                    Err(e) => Some(Err(e)),
                };
                futures_util::future::ready(out)
            })
    }

    /// Number of stored rows submitted on `day` (all submissions, not deduplicated).
    pub async fn count_day(&self, day: NaiveDate) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM insights WHERE time >= date($1) AND time < date($1, '+1 day')",
        )
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    /// Deletes reports older than `retention_days` relative to `now`. Returns rows deleted.
    #[instrument(skip(self), fields(repo = "reports", operation = "purge_older_than"))]
    pub async fn purge_older_than(
        &self,
        retention_days: u32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        let cutoff = now - Duration::days(retention_days as i64);
        let r = sqlx::query("DELETE FROM insights WHERE time < $1")
            .bind(cutoff.format(TIME_FORMAT).to_string())
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }
}

fn parse_row(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<(String, Report)> {
    let id: String = row.try_get("id")?;
    let data: String = row.try_get("data")?;
    let mut report: Report = serde_json::from_str(&data)
        .map_err(|e| anyhow::anyhow!("decode report {}: {}", id, e))?;
    report.id = id.clone();
    Ok((id, report))
}
