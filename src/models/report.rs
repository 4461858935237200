// Raw usage report as submitted by a running instance.
// Unknown fields are ignored; missing ones fall back to defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    /// Stable, anonymous instance identifier.
    pub id: String,
    pub version: String,
    pub uptime: i64,
    pub os: OsInfo,
    pub fs: FsMounts,
    pub library: LibraryInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OsInfo {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub distro: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub containerized: bool,
    pub arch: String,
    #[serde(rename = "numCPU")]
    pub num_cpu: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsMounts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<FsInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<FsInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsInfo {
    #[serde(rename = "type")]
    pub type_: String,
}

impl FsInfo {
    pub fn new(type_: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryInfo {
    pub tracks: i64,
    pub albums: i64,
    pub artists: i64,
    pub playlists: i64,
    pub shares: i64,
    pub radios: i64,
    pub libraries: i64,
    pub active_users: i64,
    /// Client identifier -> concurrent sessions.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub active_players: BTreeMap<String, i64>,
}
