//! This should not need to be run more than once. It renames archive records written
//! before thread ids became part of the file name, so the archive scan can see them.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use eth_daily_archiver::config::ARCHIVE_ROOT_PATH;
use eth_daily_archiver::init_tracing;
use eth_daily_archiver::migrate::{apply_renames, plan_renames};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rename legacy archive records to {date}-{subreddit}-{thread_id}.json")]
struct Cli {
  /// Directory holding the postprocessed archive records
  #[arg(long, env = "ARCHIVE_DIR", default_value = ARCHIVE_ROOT_PATH)]
  archive_dir: PathBuf,

  /// Only report what would be renamed
  #[arg(long)]
  dry_run: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
  init_tracing();
  let args = Cli::parse();
  let plan = plan_renames(&args.archive_dir)?;
  info!(planned = plan.len(), "archive records to rename");
  let renamed = apply_renames(&plan, args.dry_run)?;
  info!(renamed, dry_run = args.dry_run, "done");
  Ok(())
}
