use std::collections::HashSet;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use jwalk::WalkDir;

use crate::error::Result;

lazy_static! {
  // {date}-{subreddit}-{thread_id}.json ; "None" is what older runs wrote for an unknown date.
  static ref ARCHIVE_NAME_REGEX: Regex =
    Regex::new(r"^(?:\d{4}-\d{2}-\d{2}|undated|None)-[A-Za-z0-9_]+-([A-Za-z0-9]+)\.json$").unwrap();
  // {date}-{subreddit}.json, the naming used before thread ids were part of the name.
  static ref LEGACY_NAME_REGEX: Regex =
    Regex::new(r"^(?:\d{4}-\d{2}-\d{2}|None)-[A-Za-z0-9_]+\.json$").unwrap();
}

/// What the archive directory says about already-processed threads.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveScan {
  pub thread_ids: HashSet<String>,
  /// Records still carrying the old `{date}-{subreddit}.json` name; they hide their thread id.
  pub legacy: usize,
  /// Anything else found in the archive tree.
  pub unrecognized: usize,
}

/// Thread id encoded in a canonical archive file name, if it is one.
pub fn thread_id_from_file_name(name: &str) -> Option<&str> {
  ARCHIVE_NAME_REGEX
    .captures(name)
    .and_then(|cap| cap.get(1))
    .map(|m| m.as_str())
}

pub fn is_legacy_file_name(name: &str) -> bool {
  LEGACY_NAME_REGEX.is_match(name)
}

/// Collect the thread ids of every archived record, from file names alone.
/// File contents are never opened, so a malformed record cannot break the scan.
pub fn archived_thread_ids(archive_root: &Path) -> Result<ArchiveScan> {
  let mut scan = ArchiveScan::default();
  if !archive_root.exists() {
    return Ok(scan);
  }
  for entry in WalkDir::new(archive_root)
    .follow_links(true)
    .sort(true)
    .into_iter()
  {
    let entry = entry?;
    if !entry.file_type().is_file() {
      continue;
    }
    let file_name = entry.file_name().to_string_lossy();
    if let Some(id) = thread_id_from_file_name(&file_name) {
      scan.thread_ids.insert(id.to_string());
    } else if is_legacy_file_name(&file_name) {
      scan.legacy += 1;
    } else {
      debug!(file = %file_name, "ignoring non-archive file");
      scan.unrecognized += 1;
    }
  }
  if scan.legacy > 0 {
    warn!(
      count = scan.legacy,
      "archive holds records without a thread id in their name; run migrate_archive_names or they will be scraped again"
    );
  }
  Ok(scan)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  #[test]
  fn extracts_thread_id_from_canonical_names() {
    assert_eq!(thread_id_from_file_name("2025-05-16-ethereum-1kntpet.json"), Some("1kntpet"));
    assert_eq!(thread_id_from_file_name("undated-ethfinance-abc123.json"), Some("abc123"));
    assert_eq!(thread_id_from_file_name("None-ethfinance-abc123.json"), Some("abc123"));
    assert_eq!(thread_id_from_file_name("2025-05-16-ethereum.json"), None);
    assert_eq!(thread_id_from_file_name("2025-05-16-ethereum-1kntpet.json.tmp"), None);
    assert_eq!(thread_id_from_file_name("notes.json"), None);
  }

  #[test]
  fn recognizes_legacy_names() {
    assert!(is_legacy_file_name("2025-05-16-ethereum.json"));
    assert!(is_legacy_file_name("None-ethfinance.json"));
    assert!(!is_legacy_file_name("2025-05-16-ethereum-1kntpet.json"));
    assert!(!is_legacy_file_name("README.md"));
  }

  #[test]
  fn scans_nested_archive_by_name_only() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("2025")).unwrap();
    // contents are deliberately not JSON: the scan must not read them
    fs::write(root.join("2025-05-16-ethereum-1kntpet.json"), "garbage").unwrap();
    fs::write(root.join("2025").join("2025-05-17-ethfinance-abc123.json"), "").unwrap();
    fs::write(root.join("2025-05-01-ethereum.json"), "{}").unwrap();
    fs::write(root.join("README.md"), "# archive").unwrap();

    let scan = archived_thread_ids(root).unwrap();
    let expected: HashSet<String> = ["1kntpet", "abc123"].iter().map(|s| s.to_string()).collect();
    assert_eq!(scan.thread_ids, expected);
    assert_eq!(scan.legacy, 1);
    assert_eq!(scan.unrecognized, 1);
  }

  #[test]
  fn missing_archive_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let scan = archived_thread_ids(&tmp.path().join("absent")).unwrap();
    assert_eq!(scan, ArchiveScan::default());
  }
}
