// Library for the service binary, the chart regeneration tool and tests

pub mod backfill;
pub mod config;
pub mod models;
pub mod normalize;
pub mod rate_limit;
pub mod report_repo;
pub mod reporting;
pub mod routes;
pub mod stats;
pub mod summary;
pub mod tasks;
pub mod version;
