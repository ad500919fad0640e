use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
  static ref THREAD_ID_REGEX: Regex = Regex::new("/comments/([A-Za-z0-9]+)").unwrap();
  static ref SUBREDDIT_ID_REGEX: Regex = Regex::new("r/([A-Za-z0-9_]+)/comments/").unwrap();
}

/// One entry of the remote dailies list, e.g.
/// `{"date": "2025-05-16", "title": "Daily General Discussion - May 16, 2025",
///   "link": "https://reddit.com/r/ethereum/comments/1kntpet/", "comments": 5}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  pub date: String,
  #[serde(default)]
  pub title: String,
  pub link: String,
  #[serde(default)]
  pub comments: u64,
}

impl Candidate {
  pub fn thread_id(&self) -> Option<&str> {
    thread_id(&self.link)
  }
}

/// The identifying parts of a discussion link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadLink {
  pub subreddit_id: String,
  pub thread_id: String,
}

impl ThreadLink {
  pub fn parse(link: &str) -> Option<Self> {
    let subreddit_id = SUBREDDIT_ID_REGEX.captures(link)?.get(1)?.as_str();
    let thread_id = thread_id(link)?;
    Some(ThreadLink {
      subreddit_id: subreddit_id.to_string(),
      thread_id: thread_id.to_string(),
    })
  }
}

pub fn thread_id(link: &str) -> Option<&str> {
  THREAD_ID_REGEX
    .captures(link)
    .and_then(|cap| cap.get(1))
    .map(|m| m.as_str())
}
