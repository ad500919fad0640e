use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::config::STABLE_HOUR_UTC;
use crate::manifest::Candidate;

/// The moment a daily thread is considered posted: its calendar date at 06:00 UTC.
pub fn stable_at(date: &str) -> Option<DateTime<Utc>> {
  let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
  Some(day.and_hms_opt(STABLE_HOUR_UTC, 0, 0)?.and_utc())
}

/// Keep candidates whose posting moment is strictly more than `lag` before `now`.
/// Threads younger than that may still be collecting comments.
pub fn aged_candidates(candidates: &[Candidate], now: DateTime<Utc>, lag: Duration) -> Vec<Candidate> {
  candidates
    .iter()
    .filter(|candidate| match stable_at(&candidate.date) {
      Some(posted) => now - posted > lag,
      None => {
        warn!(date = %candidate.date, link = %candidate.link, "unparseable manifest date, skipping");
        false
      }
    })
    .cloned()
    .collect()
}

/// The manifest date rewritten as zero-padded `YYYY-MM-DD`, the only form archive names carry.
pub fn canonical_date(date: &str) -> Option<String> {
  let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
  Some(day.format("%Y-%m-%d").to_string())
}

/// thread_id -> canonical manifest date, used to stamp archive records. First occurrence wins.
pub fn thread_dates(candidates: &[Candidate]) -> HashMap<String, String> {
  let mut dates = HashMap::new();
  for candidate in candidates {
    let (Some(id), Some(date)) = (candidate.thread_id(), canonical_date(&candidate.date)) else {
      continue;
    };
    dates.entry(id.to_string()).or_insert(date);
  }
  dates
}

/// Candidates not yet archived, in manifest order, capped at `limit` (0 = no cap).
///
/// The same manifest and archive always yield the same queue, so an interrupted batch
/// resumes exactly where it stopped.
pub fn pending_candidates(
  aged: &[Candidate],
  archived: &HashSet<String>,
  limit: usize,
) -> Vec<Candidate> {
  let mut seen = HashSet::new();
  let pending = aged.iter().filter(|candidate| match candidate.thread_id() {
    Some(id) => !archived.contains(id) && seen.insert(id.to_string()),
    None => {
      debug!(link = %candidate.link, "no thread id in manifest link");
      false
    }
  });
  if limit == 0 {
    pending.cloned().collect()
  } else {
    pending.take(limit).cloned().collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn candidate(date: &str, id: &str) -> Candidate {
    Candidate {
      date: date.to_string(),
      title: format!("Daily General Discussion - {}", date),
      link: format!("https://reddit.com/r/ethereum/comments/{}/", id),
      comments: 1,
    }
  }

  #[test]
  fn stable_moment_is_six_utc() {
    assert_eq!(
      stable_at("2025-05-16"),
      Some(Utc.with_ymd_and_hms(2025, 5, 16, 6, 0, 0).unwrap())
    );
    assert_eq!(stable_at("16/05/2025"), None);
    assert_eq!(stable_at("2025-02-30"), None);
  }

  #[test]
  fn aging_boundary_is_strict() {
    let items = vec![candidate("2025-05-16", "a1")];
    let posted = Utc.with_ymd_and_hms(2025, 5, 16, 6, 0, 0).unwrap();
    let lag = Duration::days(3);

    let just_before = posted + lag - Duration::seconds(1);
    assert!(aged_candidates(&items, just_before, lag).is_empty());
    assert!(aged_candidates(&items, posted + lag, lag).is_empty());
    let just_after = posted + lag + Duration::seconds(1);
    assert_eq!(aged_candidates(&items, just_after, lag), items);
  }

  #[test]
  fn aging_drops_bad_dates_and_keeps_order() {
    let items = vec![
      candidate("2025-05-01", "a1"),
      candidate("not-a-date", "a2"),
      candidate("2025-05-02", "a3"),
      candidate("2025-05-20", "a4"),
    ];
    let now = Utc.with_ymd_and_hms(2025, 5, 10, 0, 0, 0).unwrap();
    let aged = aged_candidates(&items, now, Duration::days(3));
    let ids: Vec<_> = aged.iter().filter_map(|c| c.thread_id()).collect();
    assert_eq!(ids, vec!["a1", "a3"]);
  }

  #[test]
  fn unpadded_dates_are_normalized() {
    assert_eq!(canonical_date("2025-5-6").as_deref(), Some("2025-05-06"));
    assert_eq!(canonical_date("2025-05-16").as_deref(), Some("2025-05-16"));
    assert_eq!(canonical_date("yesterday"), None);
    let dates = thread_dates(&[candidate("2025-5-6", "abc123")]);
    assert_eq!(dates.get("abc123").map(String::as_str), Some("2025-05-06"));
  }

  #[test]
  fn archived_threads_are_not_pending() {
    let items = vec![candidate("2025-05-01", "abc123"), candidate("2025-05-02", "xyz789")];
    let archived: HashSet<String> = ["abc123".to_string()].into_iter().collect();
    let pending = pending_candidates(&items, &archived, 0);
    assert_eq!(pending, vec![items[1].clone()]);
  }

  #[test]
  fn limit_takes_oldest_first_then_the_rest() {
    let items: Vec<_> = (1..=5)
      .map(|day| candidate(&format!("2025-05-0{}", day), &format!("t{}", day)))
      .collect();
    let mut archived = HashSet::new();

    let first = pending_candidates(&items, &archived, 2);
    assert_eq!(first, items[..2].to_vec());
    archived.extend(first.iter().filter_map(|c| c.thread_id()).map(String::from));

    let rest = pending_candidates(&items, &archived, 0);
    assert_eq!(rest, items[2..].to_vec());
  }

  #[test]
  fn duplicate_and_linkless_entries_are_dropped() {
    let mut linkless = candidate("2025-05-03", "zzz");
    linkless.link = "https://reddit.com/r/ethereum/".to_string();
    let items = vec![
      candidate("2025-05-01", "dup"),
      candidate("2025-05-02", "dup"),
      linkless,
    ];
    let pending = pending_candidates(&items, &HashSet::new(), 0);
    assert_eq!(pending, vec![items[0].clone()]);
    assert_eq!(thread_dates(&items).get("dup").map(String::as_str), Some("2025-05-01"));
  }
}
