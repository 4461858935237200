// Background task loop: summarize recent days, export charts, purge old reports.
// Each job fires on its own cron schedule (UTC); jobs run one at a time in a single
// loop, so two summarizations of the same day never overlap.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, Utc};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, ChartsConfig};
use crate::normalize::LibraryBins;
use crate::report_repo::ReportRepo;
use crate::reporting::charts;
use crate::summary::{SummaryStore, summarize_day};

/// Repos and shutdown for the task loop.
pub struct TaskDeps {
    pub repo: Arc<ReportRepo>,
    pub store: SummaryStore,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Schedules and parameters for the task loop.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    pub summarize_schedule: String,
    pub export_schedule: String,
    pub purge_schedule: String,
    pub lookback_days: u32,
    pub retention_days: u32,
    pub charts: ChartsConfig,
    pub bins: LibraryBins,
}

impl From<&AppConfig> for TaskConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            summarize_schedule: config.schedule.summarize.clone(),
            export_schedule: config.schedule.export_charts.clone(),
            purge_schedule: config.schedule.purge.clone(),
            lookback_days: config.summaries.lookback_days,
            retention_days: config.database.retention_days,
            charts: config.charts.clone(),
            bins: config.bins.library_bins(),
        }
    }
}

/// Spawns the task loop. Returns a join handle; the loop exits when shutdown fires.
pub fn spawn(deps: TaskDeps, config: TaskConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(deps, config).await;
    })
}

#[instrument(skip_all)]
async fn run(deps: TaskDeps, config: TaskConfig) {
    let TaskDeps {
        repo,
        store,
        mut shutdown_rx,
    } = deps;

    let (summarize_tx, mut summarize_rx) = mpsc::channel::<()>(1);
    let (export_tx, mut export_rx) = mpsc::channel::<()>(1);
    let (purge_tx, mut purge_rx) = mpsc::channel::<()>(1);
    let tickers = [
        tokio::spawn(cron_ticker("summarize", config.summarize_schedule.clone(), summarize_tx)),
        tokio::spawn(cron_ticker("export_charts", config.export_schedule.clone(), export_tx)),
        tokio::spawn(cron_ticker("purge", config.purge_schedule.clone(), purge_tx)),
    ];

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("task loop shutting down");
                break;
            }
            Some(()) = summarize_rx.recv() => {
                let today = Utc::now().date_naive();
                if let Err(e) = summarize_recent(&repo, &store, &config.bins, config.lookback_days, today).await {
                    warn!(error = %e, "summarize failed");
                }
            }
            Some(()) = export_rx.recv() => {
                if let Err(e) = charts::export_charts_blocking(&store, &config.charts, &config.bins, Utc::now()).await {
                    warn!(error = %e, "chart export failed");
                }
            }
            Some(()) = purge_rx.recv() => {
                if let Err(e) = purge(&repo, config.retention_days, Utc::now()).await {
                    warn!(error = %e, "purge failed");
                }
            }
        }
    }

    for ticker in tickers {
        ticker.abort();
    }
}

/// Sends a message on `tx` at each fire time of `expr`, evaluated in UTC.
async fn cron_ticker(job: &'static str, expr: String, tx: mpsc::Sender<()>) {
    let Ok(schedule) = cron::Schedule::from_str(&expr) else {
        warn!(job, cron = %expr, "invalid schedule; job will not run");
        return;
    };
    loop {
        let now = Utc::now();
        let Some(next) = schedule.after(&now).next() else {
            warn!(job, cron = %expr, "schedule has no upcoming fire time");
            return;
        };
        let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
        tokio::time::sleep(delay).await;
        if tx.send(()).await.is_err() {
            break;
        }
    }
}

/// The `lookback_days` days ending at `today`, oldest first.
pub fn recent_days(today: NaiveDate, lookback_days: u32) -> Vec<NaiveDate> {
    (0..lookback_days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back as u64)))
        .collect()
}

/// Re-summarizes `today` and the preceding days so late submissions are picked up.
/// A failing day is logged and does not stop the others. Returns days written.
#[instrument(skip(repo, store, bins), fields(operation = "summarize_recent"))]
pub async fn summarize_recent(
    repo: &ReportRepo,
    store: &SummaryStore,
    bins: &LibraryBins,
    lookback_days: u32,
    today: NaiveDate,
) -> anyhow::Result<usize> {
    let mut written = 0;
    let mut failed = 0;
    for day in recent_days(today, lookback_days) {
        match summarize_day(repo, store, bins, day).await {
            Ok(true) => written += 1,
            Ok(false) => {}
            Err(e) => {
                failed += 1;
                warn!(date = %day, error = %e, "summarizing day failed");
            }
        }
    }
    info!(written, failed, "summarize pass complete");
    anyhow::ensure!(failed == 0, "{} of {} days failed to summarize", failed, lookback_days);
    Ok(written)
}

/// Deletes raw reports past the retention window.
pub async fn purge(
    repo: &ReportRepo,
    retention_days: u32,
    now: DateTime<Utc>,
) -> anyhow::Result<u64> {
    let deleted = repo.purge_older_than(retention_days, now).await?;
    info!(deleted, retention_days, "purged old reports");
    Ok(deleted)
}
