// Domain models: raw usage reports and daily summaries

mod report;
mod summary;

pub use report::{FsInfo, FsMounts, LibraryInfo, OsInfo, Report};
pub use summary::{CountMap, Stats, Summary, SummaryRecord};
