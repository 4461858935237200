// Client/player classification: ordered pattern rules, first match wins.
// An empty label discards the entry (duplicate or misreporting clients).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::CountMap;

const PLAYER_RULES: &[(&str, &str)] = &[
    ("NavidromeUI.*", "NavidromeUI"),
    ("supersonic", "Supersonic"),
    ("(?i)feishin", ""), // old releases report once per window
    ("audioling", "Audioling"),
    ("^AginMusic.*", "AginMusic"),
    ("playSub.*", "play:Sub"),
    ("eu.callcc.audrey", "audrey"),
    ("DSubCC", ""), // chromecast proxy of DSub
    (r"bonob\+.*", ""), // one entry per transcoding profile
    ("https?://airsonic.*", "Airsonic Refix"),
    ("multi-scrobbler.*", "Multi-Scrobbler"),
    ("SubMusic.*", "SubMusic"),
    ("(?i)(hiby|_hiby_)", "HiBy"),
    ("microSub", "AVSub"),
    ("Stream Music", "Musiver"),
];

static PLAYER_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PLAYER_RULES
        .iter()
        .map(|(pattern, label)| (Regex::new(pattern).expect("valid player pattern"), *label))
        .collect()
});

/// Canonical label for a client identifier. `None` means discard.
pub fn canonical_player(identifier: &str) -> Option<&str> {
    let label = PLAYER_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(identifier))
        .map_or(identifier, |(_, label)| *label);
    (!label.is_empty()).then_some(label)
}

/// Classifies one report's active players and adds them into `totals`.
///
/// Identifiers that collapse onto the same label contribute the maximum of their
/// counts, not the sum, so a client reporting under several aliases is counted once.
/// Returns the report's total active players (sum of per-label maxima).
pub fn classify_players(active_players: &BTreeMap<String, i64>, totals: &mut CountMap) -> u64 {
    let mut seen: BTreeMap<&str, u64> = BTreeMap::new();
    for (identifier, &count) in active_players {
        let Some(label) = canonical_player(identifier) else {
            continue;
        };
        let count = count.max(0) as u64;
        let entry = seen.entry(label).or_default();
        *entry = (*entry).max(count);
    }

    let mut total = 0;
    for (label, count) in seen {
        total += count;
        *totals.entry(label.to_string()).or_default() += count;
    }
    total
}
