use std::path::PathBuf;
use std::time::Duration;

pub const MANIFEST_URL: &str =
  "https://raw.githubusercontent.com/etheralpha/dailydoots-com/refs/heads/main/_data/dailies.json";
pub const URS_ROOT_PATH: &str = "../URS";
pub const ARCHIVE_ROOT_PATH: &str = "../eth-daily-archiver-data";
pub const CONSUMED_SUFFIX: &str = ".finished";
pub const USER_AGENT: &str = "eth-daily-archiver (https://github.com/etheralpha/dailydoots-com)";
/// Daily threads go up partway through the day; we date their "posting moment" at this UTC hour.
pub const STABLE_HOUR_UTC: u32 = 6;
pub const AGING_LAG_DAYS: i64 = 3;

/// Everything the pipeline needs to know about its surroundings.
///
/// Each component receives this explicitly; nothing reads paths or commands from globals.
#[derive(Debug, Clone)]
pub struct Config {
  pub manifest_url: String,
  pub user_agent: String,
  pub http_timeout: Duration,
  /// Where postprocessed archive records live.
  pub archive_dir: PathBuf,
  /// Tree the scraper writes its raw JSON output into.
  pub scratch_dir: PathBuf,
  /// Working directory for the scraper process.
  pub scraper_dir: PathBuf,
  pub scraper_program: String,
  /// Arguments placed before `-c <link> <depth>`.
  pub scraper_args: Vec<String>,
  /// 0 asks the scraper for every comment.
  pub comment_depth: u32,
  pub consumed_suffix: String,
  pub aging_lag: chrono::Duration,
}

impl Default for Config {
  fn default() -> Self {
    let urs_root = PathBuf::from(URS_ROOT_PATH);
    Config {
      manifest_url: MANIFEST_URL.to_string(),
      user_agent: USER_AGENT.to_string(),
      http_timeout: Duration::from_secs(60),
      archive_dir: PathBuf::from(ARCHIVE_ROOT_PATH),
      scratch_dir: urs_root.join("scrapes"),
      scraper_dir: urs_root.join("urs"),
      scraper_program: "poetry".to_string(),
      scraper_args: vec!["run".into(), "python".into(), "./Urs.py".into()],
      comment_depth: 0,
      consumed_suffix: CONSUMED_SUFFIX.to_string(),
      aging_lag: chrono::Duration::days(AGING_LAG_DAYS),
    }
  }
}

impl Config {
  /// Lay out the scratch and scraper directories the way URS expects them under `urs_root`.
  pub fn with_urs_root(mut self, urs_root: impl Into<PathBuf>) -> Self {
    let urs_root = urs_root.into();
    self.scratch_dir = urs_root.join("scrapes");
    self.scraper_dir = urs_root.join("urs");
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_follow_urs_layout() {
    let config = Config::default();
    assert_eq!(config.scratch_dir, PathBuf::from("../URS/scrapes"));
    assert_eq!(config.scraper_dir, PathBuf::from("../URS/urs"));
    assert_eq!(config.comment_depth, 0);
    assert_eq!(config.aging_lag, chrono::Duration::days(3));
  }

  #[test]
  fn urs_root_moves_both_directories() {
    let config = Config::default().with_urs_root("/opt/urs");
    assert_eq!(config.scratch_dir, PathBuf::from("/opt/urs/scrapes"));
    assert_eq!(config.scraper_dir, PathBuf::from("/opt/urs/urs"));
  }
}
