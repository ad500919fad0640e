//! Meant to run periodically (e.g. daily from cron). Re-running is always safe:
//! threads already in the archive are skipped, and an interrupted batch resumes
//! with the next unarchived thread.

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use tracing::info;

use eth_daily_archiver::config::{Config, ARCHIVE_ROOT_PATH, MANIFEST_URL, URS_ROOT_PATH};
use eth_daily_archiver::remote::fetch_manifest;
use eth_daily_archiver::scrape::check_quota;
use eth_daily_archiver::{init_tracing, run_batch};

#[derive(Parser, Debug)]
#[command(author, version, about = "Archive the Reddit daily discussion threads with URS")]
struct Cli {
  /// Maximum number of reddit threads to process before exiting (0 means unlimited)
  #[arg(short, long = "number-of-discussions", default_value_t = 0)]
  number_of_discussions: usize,

  /// Check Reddit API quota and exit
  #[arg(short = 'c', long)]
  check_quota: bool,

  /// URS checkout; scrapes land in <URS_ROOT>/scrapes and the scraper runs from <URS_ROOT>/urs
  #[arg(long, env = "URS_ROOT", default_value = URS_ROOT_PATH)]
  urs_root: PathBuf,

  /// Directory holding the postprocessed archive records
  #[arg(long, env = "ARCHIVE_DIR", default_value = ARCHIVE_ROOT_PATH)]
  archive_dir: PathBuf,

  /// URL of the dailies manifest
  #[arg(long, env = "MANIFEST_URL", default_value = MANIFEST_URL)]
  manifest_url: String,

  /// Program used to launch URS
  #[arg(long, env = "URS_PROGRAM", default_value = "poetry")]
  scraper_program: String,

  /// Arguments passed to the program before `-c <link> 0`
  #[arg(long, env = "URS_ARGS", value_delimiter = ' ', default_value = "run python ./Urs.py")]
  scraper_args: Vec<String>,
}

impl Cli {
  fn config(&self) -> Config {
    Config {
      manifest_url: self.manifest_url.clone(),
      archive_dir: self.archive_dir.clone(),
      scraper_program: self.scraper_program.clone(),
      scraper_args: self.scraper_args.clone(),
      ..Config::default()
    }
    .with_urs_root(&self.urs_root)
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  init_tracing();
  let start_time = Instant::now();
  let args = Cli::parse();
  info!(
    number_of_discussions = args.number_of_discussions,
    check_quota = args.check_quota,
    "flags"
  );
  let config = args.config();

  if args.check_quota {
    check_quota(&config)?;
    return Ok(());
  }

  let manifest = fetch_manifest(&config)?;
  let summary = run_batch(&config, &manifest, Utc::now(), args.number_of_discussions)?;
  info!(
    archived = summary.archived,
    skipped_empty = summary.skipped_empty,
    still_pending = summary.pending - summary.archived,
    secs = start_time.elapsed().as_secs(),
    "done"
  );
  Ok(())
}
