//! Drives the external scraper and works out which file it produced.
//!
//! The scraper has no way to report where it wrote its output, so we compare
//! `*.json` snapshots of the scratch tree taken right before and after each run.
//! This only holds while a single scrape runs against the scratch tree at a time.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::SystemTime;

use jwalk::WalkDir;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ArchiverError, Result};
use crate::manifest::Candidate;

lazy_static! {
  // URS prints its request quota as a table row: | remaining | used |
  static ref QUOTA_ROW_REGEX: Regex = Regex::new(r"\|\s*(\d+)\s*\|\s*(\d+)\s*\|").unwrap();
}

const FAILURE_OUTPUT_TAIL: usize = 40;

/// Combined stdout/stderr of a successful scraper run.
#[derive(Debug, Clone, Default)]
pub struct ScraperOutput {
  pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestQuota {
  pub remaining: u64,
  pub used: u64,
}

impl ScraperOutput {
  pub fn request_quota(&self) -> Option<RequestQuota> {
    let cap = QUOTA_ROW_REGEX.captures(&self.text)?;
    Some(RequestQuota {
      remaining: cap.get(1)?.as_str().parse().ok()?,
      used: cap.get(2)?.as_str().parse().ok()?,
    })
  }
}

/// Every `*.json` file currently under `scratch_root`. Consumed files carry an
/// extra suffix and so drop out of the snapshot.
pub fn snapshot(scratch_root: &Path) -> Result<HashSet<PathBuf>> {
  let mut files = HashSet::new();
  if !scratch_root.exists() {
    return Ok(files);
  }
  for entry in WalkDir::new(scratch_root).follow_links(true).into_iter() {
    let entry = entry?;
    if entry.file_type().is_file() && entry.path().extension().map_or(false, |ext| ext == "json") {
      files.insert(entry.path());
    }
  }
  Ok(files)
}

/// Pick the most recently modified path. Ties go to the greater path so the choice is stable.
///
/// This is a heuristic: it assumes the newest file belongs to the run we just made.
pub fn newest_file<I>(paths: I) -> Option<PathBuf>
where
  I: IntoIterator<Item = PathBuf>,
{
  paths
    .into_iter()
    .map(|path| {
      let modified = match std::fs::metadata(&path).and_then(|meta| meta.modified()) {
        Ok(modified) => modified,
        Err(e) => {
          warn!(path = %path.display(), error = %e, "cannot read mtime, ranking file oldest");
          SystemTime::UNIX_EPOCH
        }
      };
      (modified, path)
    })
    .max()
    .map(|(_, path)| path)
}

fn scraper_command(config: &Config) -> Command {
  let mut command = Command::new(&config.scraper_program);
  command
    .args(&config.scraper_args)
    .current_dir(&config.scraper_dir)
    .stdin(Stdio::null());
  command
}

fn run_to_completion(config: &Config, mut command: Command) -> Result<ScraperOutput> {
  let output = command.output().map_err(|source| ArchiverError::ScraperSpawn {
    program: config.scraper_program.clone(),
    source,
  })?;
  let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
  text.push_str(&String::from_utf8_lossy(&output.stderr));
  if !output.status.success() {
    return Err(ArchiverError::ScraperFailed {
      status: output.status,
      output: tail_lines(&text, FAILURE_OUTPUT_TAIL),
    });
  }
  Ok(ScraperOutput { text })
}

/// Run the scraper once for `link`, blocking until it exits. Any non-zero exit is fatal:
/// quota exhaustion or a network outage would fail every following thread the same way.
pub fn run_scraper(config: &Config, link: &str) -> Result<ScraperOutput> {
  let mut command = scraper_command(config);
  command.arg("-c").arg(link).arg(config.comment_depth.to_string());
  debug!(program = %config.scraper_program, args = ?config.scraper_args, %link, "running scraper");
  run_to_completion(config, command)
}

/// Ask the scraper for its remaining request quota and report it.
pub fn check_quota(config: &Config) -> Result<ScraperOutput> {
  let mut command = scraper_command(config);
  command.arg("--check");
  let output = run_to_completion(config, command)?;
  match output.request_quota() {
    Some(quota) => info!(remaining = quota.remaining, used = quota.used, "request quota"),
    None => info!(output = %output.text.trim_end(), "quota check output"),
  }
  Ok(output)
}

/// Scrape one candidate and return the raw file it produced.
///
/// `Ok(None)` means the scraper succeeded but wrote nothing; the thread stays pending.
pub fn scrape_candidate(config: &Config, candidate: &Candidate) -> Result<Option<PathBuf>> {
  let before = snapshot(&config.scratch_dir)?;
  let output = run_scraper(config, &candidate.link)?;
  let after = snapshot(&config.scratch_dir)?;

  if let Some(quota) = output.request_quota() {
    info!(remaining = quota.remaining, used = quota.used, "request quota");
  }

  let new_files: Vec<PathBuf> = after.difference(&before).cloned().collect();
  if new_files.is_empty() {
    warn!(link = %candidate.link, "no new JSON file found after scraping");
    return Ok(None);
  }
  let produced = newest_file(new_files.iter().cloned());
  if new_files.len() > 1 {
    debug!(count = new_files.len(), chosen = ?produced, "several new files, keeping the newest");
  }
  Ok(produced)
}

fn tail_lines(text: &str, n: usize) -> String {
  let lines: Vec<&str> = text.lines().collect();
  lines[lines.len().saturating_sub(n)..].join("\n")
}
