// Config loading and validation tests

mod common;

use common::TEST_CONFIG;
use insights::config::AppConfig;

const FULL_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"
rate_limit_window_secs = 600
api_key = "k"

[database]
path = "data/insights.db"
max_pool_size = 10
retention_days = 30

[summaries]
dir = "data/summaries"
lookback_days = 5

[schedule]
summarize = "0 0 * * * *"
export_charts = "0 10 0 * * *"
purge = "0 40 0 * * *"

[charts]
output_dir = "out"
top_versions = 10
version_window_days = 14
incomplete_threshold = 0.75
player_group_threshold = 0.01

[bins]
tracks = [0, 1, 1000]
albums = [0, 10]
artists = [0, 10]
"#;

fn rejects(config: &str, key: &str) {
    let err = AppConfig::load_from_str(config).unwrap_err();
    assert!(
        err.to_string().contains(key),
        "expected error about {}, got: {}",
        key,
        err
    );
}

#[test]
fn test_config_defaults_when_omitted() {
    let config = AppConfig::load_from_str(TEST_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.rate_limit_window_secs, 1800);
    assert!(config.server.api_key.is_none());
    assert_eq!(config.database.retention_days, 60);
    assert_eq!(config.summaries.lookback_days, 10);
    assert_eq!(config.schedule.summarize, "0 0 */2 * * *");
    assert_eq!(config.charts.top_versions, 15);
    assert_eq!(config.charts.incomplete_threshold, 0.8);
    assert_eq!(config.charts.player_group_threshold, 0.002);
    let bins = config.bins.library_bins();
    assert_eq!(bins.tracks.thresholds().len(), 12);
    assert_eq!(bins.tracks.thresholds()[2], 100);
}

#[test]
fn test_config_loads_all_sections() {
    let config = AppConfig::load_from_str(FULL_CONFIG).expect("valid");
    assert_eq!(config.server.rate_limit_window_secs, 600);
    assert_eq!(config.server.api_key.as_deref(), Some("k"));
    assert_eq!(config.database.retention_days, 30);
    assert_eq!(config.summaries.lookback_days, 5);
    assert_eq!(config.schedule.purge, "0 40 0 * * *");
    assert_eq!(config.charts.output_dir, "out");
    assert_eq!(config.charts.version_window_days, 14);
    assert_eq!(config.bins.tracks, vec![0, 1, 1000]);
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    rejects(&TEST_CONFIG.replace("port = 8081", "port = 0"), "server.port");
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    rejects(
        &TEST_CONFIG.replace("path = \"data/test.db\"", "path = \"\""),
        "database.path",
    );
}

#[test]
fn test_config_validation_rejects_max_pool_size_zero() {
    rejects(
        &TEST_CONFIG.replace("max_pool_size = 2", "max_pool_size = 0"),
        "database.max_pool_size",
    );
}

#[test]
fn test_config_validation_rejects_retention_zero() {
    rejects(
        &FULL_CONFIG.replace("retention_days = 30", "retention_days = 0"),
        "database.retention_days",
    );
}

#[test]
fn test_config_validation_rejects_lookback_zero() {
    rejects(
        &FULL_CONFIG.replace("lookback_days = 5", "lookback_days = 0"),
        "summaries.lookback_days",
    );
}

#[test]
fn test_config_validation_rejects_bad_cron() {
    rejects(
        &FULL_CONFIG.replace("purge = \"0 40 0 * * *\"", "purge = \"every night\""),
        "schedule.purge",
    );
}

#[test]
fn test_config_validation_rejects_threshold_out_of_range() {
    rejects(
        &FULL_CONFIG.replace("incomplete_threshold = 0.75", "incomplete_threshold = 1.5"),
        "charts.incomplete_threshold",
    );
    rejects(
        &FULL_CONFIG.replace("player_group_threshold = 0.01", "player_group_threshold = 1.0"),
        "charts.player_group_threshold",
    );
}

#[test]
fn test_config_validation_rejects_unsorted_bins() {
    rejects(
        &FULL_CONFIG.replace("tracks = [0, 1, 1000]", "tracks = [0, 1000, 1]"),
        "bins.tracks",
    );
    rejects(&FULL_CONFIG.replace("albums = [0, 10]", "albums = []"), "bins.albums");
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, FULL_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.database.path, "data/insights.db");
}
