//! Rule-based writing evaluator.
//!
//! Each task runs an ordered table of independent checks over the submitted
//! text. Every check yields one [`FeedbackItem`](crate::domain::FeedbackItem);
//! failed items deduct points by severity from a maximum of 12.

pub mod common;
pub mod scoring;
pub mod task1;
pub mod task2;
pub mod text;

pub use scoring::{level_summary, score_items};
pub use task1::{evaluate_task1_email, generate_task1_feedback};
pub use task2::{evaluate_task2_response, generate_task2_feedback};
pub use text::{highlight_contractions, tokenize, TextStats};

use crate::content;
use crate::domain::{WritingFeedback, WritingTask};

/// Evaluate a submission for either task, resolving the prompt id against the static prompt bank
pub fn evaluate_submission(task: WritingTask, text: &str, prompt_id: Option<&str>) -> WritingFeedback {
  match task {
    WritingTask::Task1 => {
      let prompt = prompt_id.and_then(content::task1_prompt);
      generate_task1_feedback(text, prompt)
    }
    WritingTask::Task2 => {
      let prompt = prompt_id.and_then(content::task2_prompt);
      generate_task2_feedback(text, prompt)
    }
  }
}
