use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::domain::WritingTask;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
  pub display_name: String,
  pub task: WritingTask,
  pub score: u8,
  pub word_count: usize,
  pub achieved_at: DateTime<Utc>,
}

impl LeaderboardEntry {
  pub fn achieved_display(&self) -> String {
    self.achieved_at.format("%Y-%m-%d").to_string()
  }
}

/// Higher score first, then more words, then whoever got there first
pub fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
  b.score
    .cmp(&a.score)
    .then_with(|| b.word_count.cmp(&a.word_count))
    .then_with(|| a.achieved_at.cmp(&b.achieved_at))
}

/// Sort entries into leaderboard order and keep the top `limit`
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
  entries.sort_by(compare_entries);
  entries.truncate(limit);
  entries
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn entry(name: &str, score: u8, words: usize, day: u32) -> LeaderboardEntry {
    LeaderboardEntry {
      display_name: name.to_string(),
      task: WritingTask::Task1,
      score,
      word_count: words,
      achieved_at: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
    }
  }

  fn names(entries: &[LeaderboardEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.display_name.as_str()).collect()
  }

  #[test]
  fn test_score_then_words_then_earlier() {
    let ranked = rank_entries(
      vec![
        entry("late-tie", 10, 180, 9),
        entry("low", 6, 200, 1),
        entry("top", 12, 150, 5),
        entry("early-tie", 10, 180, 2),
        entry("more-words", 10, 190, 8),
      ],
      10,
    );
    assert_eq!(names(&ranked), vec!["top", "more-words", "early-tie", "late-tie", "low"]);
  }

  #[test]
  fn test_truncates_to_limit() {
    let entries: Vec<_> = (1..=15).map(|i| entry(&i.to_string(), (i % 13) as u8, 160, i)).collect();
    let ranked = rank_entries(entries, 10);
    assert_eq!(ranked.len(), 10);
    assert_eq!(ranked[0].score, 12);
  }
}
