// One-shot chart export from the stored daily summaries (no database access).

use anyhow::Result;
use insights::config::AppConfig;
use insights::reporting::charts;
use insights::summary::SummaryStore;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::load()?;
    let store = SummaryStore::new(&config.summaries.dir);
    let bins = config.bins.library_bins();
    match charts::export_charts(&store, &config.charts, &bins, chrono::Utc::now())? {
        Some(path) => println!("charts written to {}", path.display()),
        None => println!("no summaries found in {}", store.dir().display()),
    }
    Ok(())
}
