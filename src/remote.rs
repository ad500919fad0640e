use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ArchiverError, Result};
use crate::manifest::Candidate;

/// Single blocking read of the dailies manifest. There is no retry: without a fresh
/// manifest there is nothing sensible to do, so callers are expected to abort.
pub fn fetch_manifest(config: &Config) -> Result<Vec<Candidate>> {
  let fetch_err = |source| ArchiverError::ManifestFetch {
    url: config.manifest_url.clone(),
    source,
  };
  let client = reqwest::blocking::Client::builder()
    .user_agent(config.user_agent.as_str())
    .timeout(config.http_timeout)
    .build()
    .map_err(fetch_err)?;

  debug!(url = %config.manifest_url, "fetching manifest");
  let payload = client
    .get(&config.manifest_url)
    .send()
    .and_then(|resp| resp.error_for_status())
    .and_then(|resp| resp.text())
    .map_err(fetch_err)?;

  let candidates = parse_manifest(&payload)?;
  info!(count = candidates.len(), "fetched manifest");
  Ok(candidates)
}

pub fn parse_manifest(payload: &str) -> Result<Vec<Candidate>> {
  serde_json::from_str(payload).map_err(ArchiverError::ManifestParse)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_dailies_payload() {
    let payload = r#"[
      {"date": "2025-05-16", "title": "Daily General Discussion - May 16, 2025", "link": "https://reddit.com/r/ethereum/comments/1kntpet/", "comments": 5},
      {"date": "2025-05-17", "title": "Daily General Discussion - May 17, 2025", "link": "https://reddit.com/r/ethereum/comments/1kolx2b/", "comments": 212}
    ]"#;
    let candidates = parse_manifest(payload).unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].date, "2025-05-16");
    assert_eq!(candidates[1].comments, 212);
    assert_eq!(candidates[1].thread_id(), Some("1kolx2b"));
  }

  #[test]
  fn rejects_non_list_payload() {
    assert!(matches!(
      parse_manifest(r#"{"date": "2025-05-16"}"#),
      Err(ArchiverError::ManifestParse(_))
    ));
    assert!(matches!(
      parse_manifest("<html>rate limited</html>"),
      Err(ArchiverError::ManifestParse(_))
    ));
  }
}
