//! Incremental archiver for the Ethereum daily discussion threads.
//!
//! Each run fetches the dailies manifest and drops threads that are still fresh. It then
//! diffs the rest against the archive and scrapes what is missing with URS, one thread
//! at a time. Every scrape is wrapped into a dated archive record.

pub mod config;
pub mod error;
pub mod local;
pub mod manifest;
pub mod migrate;
pub mod pipeline;
pub mod postprocess;
pub mod remote;
pub mod scrape;
pub mod select;

pub use config::Config;
pub use error::{ArchiverError, Result};
pub use pipeline::{run_batch, BatchSummary};

/// Install the stderr `tracing` subscriber used by the binaries; `RUST_LOG` overrides `info`.
pub fn init_tracing() {
  use tracing_subscriber::{fmt, EnvFilter};
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .with_timer(fmt::time::UtcTime::rfc_3339())
    .init();
}
