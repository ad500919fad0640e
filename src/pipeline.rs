use std::fs;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::local::archived_thread_ids;
use crate::manifest::Candidate;
use crate::postprocess::postprocess;
use crate::scrape::scrape_candidate;
use crate::select::{aged_candidates, pending_candidates, thread_dates};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
  /// Manifest entries old enough to archive.
  pub aged: usize,
  /// Threads already in the archive when the batch started.
  pub archived_before: usize,
  /// Aged threads missing from the archive.
  pub pending: usize,
  /// Pending threads this batch attempted, after the limit.
  pub selected: usize,
  pub archived: usize,
  /// Scrapes that ran fine but produced no file.
  pub skipped_empty: usize,
}

/// Archive up to `limit` pending threads (0 = all of them), one at a time.
///
/// Each thread is committed (record written, raw file consumed) before the next one starts,
/// so stopping on the first error loses nothing already done.
pub fn run_batch(
  config: &Config,
  manifest: &[Candidate],
  now: DateTime<Utc>,
  limit: usize,
) -> Result<BatchSummary> {
  fs::create_dir_all(&config.archive_dir)?;
  fs::create_dir_all(&config.scratch_dir)?;

  let aged = aged_candidates(manifest, now, config.aging_lag);
  let dates = thread_dates(&aged);
  let scan = archived_thread_ids(&config.archive_dir)?;
  let pending = pending_candidates(&aged, &scan.thread_ids, 0);
  let queue = pending_candidates(&aged, &scan.thread_ids, limit);
  info!(
    total = aged.len(),
    in_archive = scan.thread_ids.len(),
    to_archive = pending.len(),
    this_batch = queue.len(),
    "daily threads"
  );

  let mut summary = BatchSummary {
    aged: aged.len(),
    archived_before: scan.thread_ids.len(),
    pending: pending.len(),
    selected: queue.len(),
    ..BatchSummary::default()
  };

  for (i, candidate) in queue.iter().enumerate() {
    info!(date = %candidate.date, comments = candidate.comments, link = %candidate.link, "now scraping");
    match scrape_candidate(config, candidate)? {
      Some(raw_path) => {
        postprocess(config, &raw_path, &dates, Utc::now().timestamp())?;
        summary.archived += 1;
      }
      None => summary.skipped_empty += 1,
    }
    info!(left = queue.len() - i - 1, "threads left in this batch");
  }

  info!(
    archived = summary.archived,
    skipped = summary.skipped_empty,
    "batch complete"
  );
  Ok(summary)
}
