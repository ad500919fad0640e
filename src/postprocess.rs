use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ArchiverError, Result};
use crate::manifest::ThreadLink;

pub const UNDATED: &str = "undated";

/// On-disk archive record: the untouched scrape plus when and for which day it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
  pub datetime_retrieved: i64,
  /// From the manifest, not the scrape: the manifest decides which day a thread belongs to.
  pub date_of_thread: Option<String>,
  pub urs_data: Value,
}

impl ArchiveRecord {
  /// The thread link recorded by the scraper under `scrape_settings.url`.
  pub fn scrape_url(&self) -> Option<&str> {
    scrape_url(&self.urs_data)
  }
}

fn scrape_url(urs_data: &Value) -> Option<&str> {
  urs_data.get("scrape_settings")?.get("url")?.as_str()
}

/// `{date}-{subreddit}-{thread_id}.json`
pub fn archive_file_name(date_of_thread: Option<&str>, link: &ThreadLink) -> String {
  format!(
    "{}-{}-{}.json",
    date_of_thread.unwrap_or(UNDATED),
    link.subreddit_id,
    link.thread_id
  )
}

/// Fold a raw scrape into the archive and mark the raw file consumed.
///
/// `dates` maps thread ids to their manifest date; a missing entry is archived as undated.
/// Returns the path of the new archive record.
pub fn postprocess(
  config: &Config,
  raw_path: &Path,
  dates: &HashMap<String, String>,
  retrieved_at: i64,
) -> Result<PathBuf> {
  info!(path = %raw_path.display(), "postprocessing");
  let payload = fs::read_to_string(raw_path).map_err(|source| ArchiverError::ReadScrape {
    path: raw_path.to_path_buf(),
    source,
  })?;
  let urs_data: Value = serde_json::from_str(&payload).map_err(|source| ArchiverError::ParseScrape {
    path: raw_path.to_path_buf(),
    source,
  })?;

  let url = scrape_url(&urs_data);
  let link = url
    .and_then(ThreadLink::parse)
    .ok_or_else(|| ArchiverError::MalformedLink {
      path: raw_path.to_path_buf(),
      link: url.map(String::from),
    })?;
  let date_of_thread = dates.get(&link.thread_id).cloned();
  let file_name = archive_file_name(date_of_thread.as_deref(), &link);

  let record = ArchiveRecord {
    datetime_retrieved: retrieved_at,
    date_of_thread,
    urs_data,
  };
  let archive_path = config.archive_dir.join(&file_name);
  write_record(&record, &archive_path)?;
  info!(file = %file_name, "wrote archive record");

  let consumed = consumed_path(raw_path, &config.consumed_suffix);
  fs::rename(raw_path, &consumed)?;
  info!(path = %consumed.display(), "marked scrape consumed");
  Ok(archive_path)
}

/// Minified write through a temporary sibling, so a crash never leaves half a record
/// under a name the archive scan would trust.
fn write_record(record: &ArchiveRecord, archive_path: &Path) -> Result<()> {
  if archive_path.exists() {
    return Err(ArchiverError::ArchiveCollision {
      path: archive_path.to_path_buf(),
    });
  }
  let bytes = serde_json::to_vec(record).map_err(ArchiverError::Serialize)?;
  write_through_tmp(&bytes, archive_path)
}

fn write_through_tmp(bytes: &[u8], target: &Path) -> Result<()> {
  let mut tmp_name = target.as_os_str().to_owned();
  tmp_name.push(".tmp");
  let tmp_path = PathBuf::from(tmp_name);
  fs::write(&tmp_path, bytes)?;
  if let Err(e) = fs::rename(&tmp_path, target) {
    if let Err(cleanup) = fs::remove_file(&tmp_path) {
      warn!(path = %tmp_path.display(), error = %cleanup, "could not remove temporary record");
    }
    return Err(e.into());
  }
  Ok(())
}

pub fn consumed_path(raw_path: &Path, suffix: &str) -> PathBuf {
  let mut name = OsString::from(raw_path.as_os_str());
  name.push(suffix);
  PathBuf::from(name)
}
