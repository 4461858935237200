// Startup pass: summarize the recent days and export charts once, before the first cron tick.

use chrono::Utc;
use tracing::info;

use crate::report_repo::ReportRepo;
use crate::reporting::charts;
use crate::summary::SummaryStore;
use crate::tasks::{TaskConfig, summarize_recent};

/// Runs one summarize + export pass. A failed summarize still attempts the export.
pub async fn run_backfill(
    repo: &ReportRepo,
    store: &SummaryStore,
    config: &TaskConfig,
) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let summarized =
        summarize_recent(repo, store, &config.bins, config.lookback_days, today).await;
    charts::export_charts_blocking(store, &config.charts, &config.bins, Utc::now()).await?;
    summarized?;
    info!("backfill complete");
    Ok(())
}
