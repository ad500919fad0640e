//! One-time rename of archive records written before the thread id was part of the file name.
//! Unlike the archive scan, this reads each record to recover its link.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use tracing::{info, warn};

use crate::error::{ArchiverError, Result};
use crate::manifest::ThreadLink;
use crate::postprocess::{archive_file_name, ArchiveRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
  pub from: PathBuf,
  pub to: PathBuf,
}

pub fn plan_renames(archive_root: &Path) -> Result<Vec<Rename>> {
  let mut plan = Vec::new();
  if !archive_root.exists() {
    return Ok(plan);
  }
  for entry in WalkDir::new(archive_root).sort(true).into_iter() {
    let entry = entry?;
    let from = entry.path();
    if !entry.file_type().is_file() || from.extension().map_or(true, |ext| ext != "json") {
      continue;
    }
    let payload = fs::read_to_string(&from).map_err(|source| ArchiverError::ReadScrape {
      path: from.clone(),
      source,
    })?;
    let record: ArchiveRecord = match serde_json::from_str(&payload) {
      Ok(record) => record,
      Err(e) => {
        warn!(path = %from.display(), error = %e, "not an archive record, leaving it alone");
        continue;
      }
    };
    let Some(link) = record.scrape_url().and_then(ThreadLink::parse) else {
      warn!(path = %from.display(), url = ?record.scrape_url(), "record has no usable thread link, leaving it alone");
      continue;
    };
    let file_name = archive_file_name(record.date_of_thread.as_deref(), &link);
    if entry.file_name().to_string_lossy() == file_name {
      continue;
    }
    let to = from.with_file_name(file_name);
    plan.push(Rename { from, to });
  }
  Ok(plan)
}

/// Carry out `plan`, never clobbering an existing file. Returns how many files moved.
pub fn apply_renames(plan: &[Rename], dry_run: bool) -> Result<usize> {
  let mut renamed = 0;
  for rename in plan {
    if rename.to.exists() {
      warn!(from = %rename.from.display(), to = %rename.to.display(), "target exists, skipping");
      continue;
    }
    info!(from = %rename.from.display(), to = %rename.to.display(), dry_run, "rename");
    if !dry_run {
      fs::rename(&rename.from, &rename.to)?;
    }
    renamed += 1;
  }
  Ok(renamed)
}
