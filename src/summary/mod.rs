// Daily summarization: fold one day's reports (latest per instance) into a Summary.
// Pure accumulation lives in SummaryAccumulator; summarize_day wires repo -> store.

pub mod store;

use std::borrow::Borrow;

use chrono::NaiveDate;
use futures_util::TryStreamExt;
use tracing::{info, instrument};

use crate::models::{CountMap, Report, Summary};
use crate::normalize::{self, LibraryBins};
use crate::report_repo::ReportRepo;
use crate::stats::calc_stats;

pub use store::{StoreError, SummaryStore};

/// Raw per-instance values kept for the statistics pass.
#[derive(Debug, Default)]
struct Samples {
    tracks: Vec<i64>,
    albums: Vec<i64>,
    artists: Vec<i64>,
    playlists: Vec<i64>,
    shares: Vec<i64>,
    radios: Vec<i64>,
    libraries: Vec<i64>,
}

/// Running counters for one day. Dropping it before `finish` discards everything.
#[derive(Debug)]
pub struct SummaryAccumulator<'a> {
    bins: &'a LibraryBins,
    summary: Summary,
    samples: Samples,
}

impl<'a> SummaryAccumulator<'a> {
    pub fn new(bins: &'a LibraryBins) -> Self {
        Self {
            bins,
            summary: Summary::default(),
            samples: Samples::default(),
        }
    }

    pub fn num_instances(&self) -> u64 {
        self.summary.num_instances
    }

    /// Adds one instance-day. Callers must pass at most one report per instance.
    pub fn add(&mut self, report: &Report) {
        let s = &mut self.summary;
        let lib = &report.library;

        s.num_instances += 1;
        s.num_active_users += lib.active_users.max(0) as u64;
        increment(&mut s.versions, normalize::normalize_version(&report.version));
        increment(&mut s.os, normalize::normalize_os(&report.os));
        if report.os.type_ == "linux" && !report.os.containerized {
            increment(&mut s.distros, report.os.distro.clone());
        }
        increment(&mut s.users, lib.active_users.to_string());
        increment(
            &mut s.music_fs,
            normalize::normalize_fs(report.fs.music.as_ref()),
        );
        increment(
            &mut s.data_fs,
            normalize::normalize_fs(report.fs.data.as_ref()),
        );
        let total_players = normalize::classify_players(&lib.active_players, &mut s.player_types);
        increment(&mut s.players, total_players.to_string());

        self.bins.tracks.bin(lib.tracks, &mut s.tracks);
        self.bins.albums.bin(lib.albums, &mut s.albums);
        self.bins.artists.bin(lib.artists, &mut s.artists);

        // Zero tracks/albums/artists means "no library scanned yet"; keep it out of the stats.
        let samples = &mut self.samples;
        if lib.tracks > 0 {
            samples.tracks.push(lib.tracks);
        }
        if lib.albums > 0 {
            samples.albums.push(lib.albums);
        }
        if lib.artists > 0 {
            samples.artists.push(lib.artists);
        }
        samples.playlists.push(lib.playlists);
        samples.shares.push(lib.shares);
        samples.radios.push(lib.radios);
        samples.libraries.push(lib.libraries);
    }

    /// Final summary, or `None` when no report was added.
    pub fn finish(self) -> Option<Summary> {
        if self.summary.num_instances == 0 {
            return None;
        }
        let Samples {
            tracks,
            albums,
            artists,
            playlists,
            shares,
            radios,
            libraries,
        } = self.samples;
        Some(Summary {
            track_stats: calc_stats(&tracks),
            album_stats: calc_stats(&albums),
            artist_stats: calc_stats(&artists),
            playlist_stats: calc_stats(&playlists),
            share_stats: calc_stats(&shares),
            radio_stats: calc_stats(&radios),
            library_stats: calc_stats(&libraries),
            ..self.summary
        })
    }
}

fn increment(counters: &mut CountMap, key: String) {
    *counters.entry(key).or_default() += 1;
}

/// Summarizes an in-memory sequence of reports (one per instance).
pub fn summarize<I>(reports: I, bins: &LibraryBins) -> Option<Summary>
where
    I: IntoIterator,
    I::Item: Borrow<Report>,
{
    let mut acc = SummaryAccumulator::new(bins);
    for report in reports {
        acc.add(report.borrow());
    }
    acc.finish()
}

/// Summarizes `day` from the raw report table and writes the result to `store`.
/// Returns `false` (and writes nothing) when the day has no reports.
#[instrument(skip(repo, store, bins), fields(operation = "summarize_day", date = %day))]
pub async fn summarize_day(
    repo: &ReportRepo,
    store: &SummaryStore,
    bins: &LibraryBins,
    day: NaiveDate,
) -> anyhow::Result<bool> {
    let mut acc = SummaryAccumulator::new(bins);
    {
        let mut reports = std::pin::pin!(repo.select_day(day));
        while let Some(report) = reports.try_next().await? {
            acc.add(&report);
        }
    }

    let num_instances = acc.num_instances();
    let Some(summary) = acc.finish() else {
        info!("no data to summarize");
        return Ok(false);
    };
    let store = store.clone();
    let path = tokio::task::spawn_blocking(move || store.save(day, &summary)).await??;
    info!(num_instances, path = %path.display(), "summary saved");
    Ok(true)
}
