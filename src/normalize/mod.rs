// Normalizers: map free-form report fields to canonical category labels.
// Every function here is total; unexpected input yields some label, never an error.

pub mod bins;
pub mod players;

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{FsInfo, OsInfo};

pub use bins::{BinSet, LibraryBins, bin_count};
pub use players::classify_players;

/// Parenthesized git hash of 8+ hex digits; keeps the first 8.
static VERSION_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9a-fA-F]{8})[0-9a-fA-F]*\)").expect("valid regex"));

/// Truncates an embedded build hash: `"0.54.2 (0b184893278620bb...)"` -> `"0.54.2 (0b184893)"`.
pub fn normalize_version(version: &str) -> String {
    VERSION_HASH.replace_all(version, "(${1})").into_owned()
}

/// `"<friendly OS name> - <arch>"`, e.g. `"Linux (containerized) - x86_64"`.
pub fn normalize_os(os: &OsInfo) -> String {
    let name = match os.type_.as_str() {
        "darwin" => "macOS".to_string(),
        "linux" if os.containerized => "Linux (containerized)".to_string(),
        "linux" => "Linux".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "netbsd" => "NetBSD".to_string(),
        "openbsd" => "OpenBSD".to_string(),
        other => title_case(other).replace("bsd", "BSD"),
    };
    format!("{} - {}", name, os.arch)
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

/// Filesystem magic numbers reported as `unknown(0x...)`.
/// The `0x-...` entries are the same magic numbers seen through a signed 32-bit
/// conversion on some platforms (unsigned value in the trailing comment).
const FS_MAPPINGS: &[(&str, &str)] = &[
    ("unknown(0x2011bab0)", "exfat"),
    ("unknown(0x7366746e)", "ntfs"),
    ("unknown(0xc36400)", "ceph"),
    ("unknown(0xf15f)", "ecryptfs"),
    ("unknown(0xff534d42)", "cifs"),
    ("unknown(0x786f4256)", "vboxsf"),
    ("unknown(0xf2f52010)", "f2fs"),
    ("unknown(0x5346544e)", "ntfs"),
    ("unknown(0x482b)", "hfs+"),
    ("unknown(0xca451a4e)", "virtiofs"),
    ("unknown(0x187)", "autofs"),
    ("unknown(0x-6edc97c2)", "btrfs"), // 0x9123683e
    ("unknown(0x-1acb2be)", "smb2"),   // 0xfe534d42
    ("unknown(0x-acb2be)", "cifs"),    // 0xff534d42
    ("unknown(0x-d0adff0)", "f2fs"),   // 0xf2f52010
];

/// Friendly filesystem name; `"unknown"` when the mount was not reported.
pub fn normalize_fs(fs: Option<&FsInfo>) -> String {
    let Some(fs) = fs else {
        return "unknown".to_string();
    };
    FS_MAPPINGS
        .iter()
        .find(|(tag, _)| *tag == fs.type_)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| fs.type_.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_lowercases_tail() {
        assert_eq!(title_case("dragonfly"), "Dragonfly");
        assert_eq!(title_case("SOLARIS"), "Solaris");
        assert_eq!(title_case("gnu/hurd"), "Gnu/Hurd");
        assert_eq!(title_case(""), "");
    }
}
