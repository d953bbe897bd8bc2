use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::feedback::{WritingFeedback, WritingTask};

/// A stored writing submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
  pub id: i64,
  pub task: WritingTask,
  pub prompt_id: Option<String>,
  pub prompt_title: Option<String>,
  pub text: String,
  pub word_count: usize,
  pub score: u8,
  pub feedback: WritingFeedback,
  pub created_at: DateTime<Utc>,
}

impl Attempt {
  pub fn new(
    task: WritingTask,
    prompt_id: Option<String>,
    prompt_title: Option<String>,
    text: String,
    feedback: WritingFeedback,
  ) -> Self {
    Self {
      id: 0,
      task,
      prompt_id,
      prompt_title,
      word_count: feedback.word_count,
      score: feedback.score,
      text,
      feedback,
      created_at: Utc::now(),
    }
  }

  /// Short preview of the submission for history lists
  pub fn excerpt(&self) -> String {
    const LIMIT: usize = 80;
    let flat: String = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= LIMIT {
      flat
    } else {
      let cut: String = flat.chars().take(LIMIT).collect();
      format!("{}…", cut.trim_end())
    }
  }

  pub fn created_display(&self) -> String {
    self.created_at.format("%Y-%m-%d %H:%M").to_string()
  }
}
