// SummaryStore tests: file layout, replace-on-save, load_all filtering

mod common;

use common::{day, summary};
use insights::models::Summary;
use insights::stats::calc_stats;
use insights::summary::SummaryStore;
use tempfile::TempDir;

#[test]
fn save_writes_dated_path() {
    let dir = TempDir::new().unwrap();
    let store = SummaryStore::new(dir.path());
    let path = store.save(day("2025-03-07"), &summary(5, &[])).unwrap();
    assert_eq!(
        path,
        dir.path().join("2025").join("03").join("summary-2025-03-07.json")
    );
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn save_replaces_previous_summary() {
    let dir = TempDir::new().unwrap();
    let store = SummaryStore::new(dir.path());
    let d = day("2025-03-07");
    store.save(d, &summary(5, &[("1.0", 5)])).unwrap();
    store.save(d, &summary(7, &[("1.1", 7)])).unwrap();
    let loaded = store.load(d).unwrap().unwrap();
    assert_eq!(loaded, summary(7, &[("1.1", 7)]));
}

#[test]
fn load_missing_day_is_none() {
    let dir = TempDir::new().unwrap();
    let store = SummaryStore::new(dir.path());
    assert!(store.load(day("2025-01-01")).unwrap().is_none());
}

#[test]
fn load_all_missing_dir_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = SummaryStore::new(dir.path().join("nope"));
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn load_all_sorted_and_skips_bad_files() {
    let dir = TempDir::new().unwrap();
    let store = SummaryStore::new(dir.path());
    store.save(day("2025-02-01"), &summary(20, &[])).unwrap();
    store.save(day("2025-01-15"), &summary(10, &[])).unwrap();
    store.save(day("2025-01-20"), &summary(0, &[])).unwrap();

    let month = dir.path().join("2025").join("01");
    std::fs::write(month.join("summary-2025-01-16.json"), b"{not json").unwrap();
    std::fs::write(month.join("summary-2025-13-40.json"), b"{}").unwrap();
    std::fs::write(month.join("notes.txt"), b"ignored").unwrap();

    let records = store.load_all().unwrap();
    let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates, vec!["2025-01-15", "2025-02-01"]);
    assert_eq!(records[1].data.num_instances, 20);
}

/// Deterministic pseudo-random library sizes.
fn sample_values(seed: u64, n: usize) -> Vec<i64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) % 500_000) as i64
        })
        .collect()
}

#[test]
fn stats_survive_save_and_load_exactly() {
    let dir = TempDir::new().unwrap();
    let store = SummaryStore::new(dir.path());
    let d = day("2025-04-01");
    for seed in 0..300u64 {
        let n = 2 + (seed as usize % 97);
        let s = Summary {
            track_stats: calc_stats(&sample_values(seed, n)),
            album_stats: calc_stats(&sample_values(seed + 1000, n)),
            artist_stats: calc_stats(&sample_values(seed + 2000, n)),
            playlist_stats: calc_stats(&sample_values(seed + 3000, n)),
            share_stats: calc_stats(&sample_values(seed + 4000, n)),
            radio_stats: calc_stats(&sample_values(seed + 5000, n)),
            library_stats: calc_stats(&sample_values(seed + 6000, n)),
            ..summary(n as u64, &[("1.0", n as u64)])
        };
        store.save(d, &s).unwrap();
        let loaded = store.load(d).unwrap().unwrap();
        assert_eq!(loaded, s, "seed {}", seed);
    }
}

#[test]
fn failed_save_keeps_previous_summary() {
    let dir = TempDir::new().unwrap();
    let store = SummaryStore::new(dir.path());
    let d = day("2025-03-07");
    store.save(d, &summary(5, &[("1.0", 5)])).unwrap();

    // A directory in place of the temp file makes the write fail.
    let path = store.path_for(d);
    std::fs::create_dir_all(path.with_extension("json.tmp")).unwrap();

    assert!(store.save(d, &summary(9, &[("2.0", 9)])).is_err());
    let loaded = store.load(d).unwrap().unwrap();
    assert_eq!(loaded, summary(5, &[("1.0", 5)]));
}
