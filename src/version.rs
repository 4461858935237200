// Service identity reported by GET /version

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Set from Cargo.toml at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
