use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Every condition here aborts the batch. Recoverable situations (an empty scrape,
/// a stray archive file, an unknown thread date) are not errors and never reach this type.
#[derive(Debug, Error)]
pub enum ArchiverError {
  #[error("failed to fetch manifest from {url}: {source}")]
  ManifestFetch {
    url: String,
    #[source]
    source: reqwest::Error,
  },
  #[error("manifest is not a valid list of daily threads: {0}")]
  ManifestParse(#[source] serde_json::Error),
  #[error("failed to launch scraper `{program}`: {source}")]
  ScraperSpawn {
    program: String,
    #[source]
    source: std::io::Error,
  },
  #[error("scraper exited with {status}; last output:\n{output}")]
  ScraperFailed { status: ExitStatus, output: String },
  #[error("failed to read scrape {}: {source}", path.display())]
  ReadScrape {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("scrape {} is not valid JSON: {source}", path.display())]
  ParseScrape {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
  #[error("scrape {} has no usable thread link (found {link:?})", path.display())]
  MalformedLink { path: PathBuf, link: Option<String> },
  #[error("refusing to overwrite existing archive record {}", path.display())]
  ArchiveCollision { path: PathBuf },
  #[error("failed to walk directory: {0}")]
  Walk(#[from] jwalk::Error),
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("failed to serialize archive record: {0}")]
  Serialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArchiverError>;
