use serde::{Deserialize, Serialize};

use crate::config::MAX_SCORE;

/// Which CELPIP writing task a submission answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingTask {
  /// Task 1: writing an email
  Task1,
  /// Task 2: responding to survey questions
  Task2,
}

impl WritingTask {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Task1 => "task1",
      Self::Task2 => "task2",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "task1" => Some(Self::Task1),
      "task2" => Some(Self::Task2),
      _ => None,
    }
  }

  pub fn title(&self) -> &'static str {
    match self {
      Self::Task1 => "Task 1: Writing an Email",
      Self::Task2 => "Task 2: Responding to Survey Questions",
    }
  }
}

/// How much a failed check costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
  /// Structural problem an examiner will mark down heavily
  Blocker,
  /// Clear weakness in task fulfilment or organisation
  Important,
  /// Small stylistic issue
  Polish,
}

impl Severity {
  /// Points deducted from the score when a check of this severity fails
  pub fn deduction(&self) -> u8 {
    match self {
      Self::Blocker => 3,
      Self::Important => 2,
      Self::Polish => 1,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Blocker => "Blocker",
      Self::Important => "Important",
      Self::Polish => "Polish",
    }
  }

  pub fn css_class(&self) -> &'static str {
    match self {
      Self::Blocker => "sev-blocker",
      Self::Important => "sev-important",
      Self::Polish => "sev-polish",
    }
  }
}

/// Result of one checked criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
  pub id: String,
  pub message: String,
  pub passed: bool,
  pub severity: Severity,
}

impl FeedbackItem {
  pub fn pass(id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      message: message.into(),
      passed: true,
      severity,
    }
  }

  pub fn fail(id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      message: message.into(),
      passed: false,
      severity,
    }
  }

  /// Build a passed or failed item from a boolean outcome
  pub fn check(
    id: impl Into<String>,
    passed: bool,
    severity: Severity,
    ok_message: impl Into<String>,
    fail_message: impl Into<String>,
  ) -> Self {
    if passed {
      Self::pass(id, severity, ok_message)
    } else {
      Self::fail(id, severity, fail_message)
    }
  }

  /// Points this item removes from the score
  pub fn deduction(&self) -> u8 {
    if self.passed { 0 } else { self.severity.deduction() }
  }
}

/// Aggregated evaluation of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingFeedback {
  pub task: WritingTask,
  pub items: Vec<FeedbackItem>,
  pub score: u8,
  pub max_score: u8,
  pub word_count: usize,
  pub sentence_count: usize,
  pub paragraph_count: usize,
  pub level_summary: String,
}

impl WritingFeedback {
  pub fn passed_count(&self) -> usize {
    self.items.iter().filter(|i| i.passed).count()
  }

  pub fn failed_count(&self) -> usize {
    self.items.len() - self.passed_count()
  }

  /// Failed items, most severe first
  pub fn failures(&self) -> Vec<&FeedbackItem> {
    let mut failed: Vec<&FeedbackItem> = self.items.iter().filter(|i| !i.passed).collect();
    failed.sort_by_key(|i| i.severity);
    failed
  }

  pub fn is_perfect(&self) -> bool {
    self.score == MAX_SCORE
  }
}
