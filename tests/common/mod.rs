// Shared test helpers
#![allow(dead_code)]

use chrono::NaiveDate;
use insights::models::*;
use std::collections::BTreeMap;

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A containerized linux instance with a small library and no clients.
pub fn report(id: &str, version: &str) -> Report {
    Report {
        id: id.into(),
        version: version.into(),
        uptime: 3600,
        os: OsInfo {
            type_: "linux".into(),
            distro: "alpine".into(),
            version: "3.20".into(),
            containerized: true,
            arch: "amd64".into(),
            num_cpu: 4,
        },
        fs: FsMounts {
            music: Some(FsInfo::new("ext4")),
            data: Some(FsInfo::new("ext4")),
        },
        library: LibraryInfo {
            tracks: 1500,
            albums: 120,
            artists: 60,
            playlists: 2,
            shares: 0,
            radios: 1,
            libraries: 1,
            active_users: 1,
            active_players: BTreeMap::new(),
        },
    }
}

pub fn with_players(mut report: Report, players: &[(&str, i64)]) -> Report {
    report.library.active_players = players
        .iter()
        .map(|(name, n)| (name.to_string(), *n))
        .collect();
    report
}

/// A summary carrying only an instance count and a version map.
pub fn summary(num_instances: u64, versions: &[(&str, u64)]) -> Summary {
    Summary {
        num_instances,
        versions: versions.iter().map(|(v, n)| (v.to_string(), *n)).collect(),
        ..Default::default()
    }
}

pub fn record(date: &str, num_instances: u64) -> SummaryRecord {
    SummaryRecord::new(day(date), summary(num_instances, &[]))
}

pub const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "127.0.0.1"

[database]
path = "data/test.db"
max_pool_size = 2
"#;
