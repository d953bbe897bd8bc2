//! Severity-weighted aggregation of feedback items into a CELPIP-style score.

use super::text::TextStats;
use crate::config::MAX_SCORE;
use crate::domain::{FeedbackItem, WritingFeedback, WritingTask};

/// `MAX_SCORE` minus the deductions of every failed item, clamped to `[0, MAX_SCORE]`
pub fn score_items(items: &[FeedbackItem]) -> u8 {
  let deductions: u32 = items.iter().map(|i| u32::from(i.deduction())).sum();
  u32::from(MAX_SCORE).saturating_sub(deductions) as u8
}

/// Band label for a score
pub fn level_summary(score: u8) -> &'static str {
  match score {
    10.. => "Advanced proficiency: ready for the test",
    7..=9 => "Competent: a few weaknesses left to fix",
    5..=6 => "Developing: work on structure and task coverage",
    _ => "Needs significant work: start with the blockers",
  }
}

/// Assemble the full feedback for a task from its checked items
pub fn build_feedback(task: WritingTask, stats: &TextStats, items: Vec<FeedbackItem>) -> WritingFeedback {
  let score = score_items(&items);
  WritingFeedback {
    task,
    score,
    max_score: MAX_SCORE,
    word_count: stats.word_count(),
    sentence_count: stats.sentences.len(),
    paragraph_count: stats.paragraphs.len(),
    level_summary: level_summary(score).to_string(),
    items,
  }
}
