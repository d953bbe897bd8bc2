//! Static teaching material: writing prompts, the quiz bank and the CSF/PRE guides.
//!
//! All content ships inside the binary as JSON (`src/content/data/`) and is
//! parsed once on first use.

pub mod guides;
pub mod prompts;
pub mod quiz;

pub use guides::{guide, guides, Guide, GuideSection};
pub use prompts::{
  random_task1_prompt, random_task2_prompt, task1_prompt, task1_prompts, task2_prompt,
  task2_prompts,
};
pub use quiz::{grade_quiz, quiz_bank, quiz_question, QuizAnswerDetail, QuizQuestion, QuizResult};

/// Parse an embedded JSON table. Content is compiled in, so a parse failure is a build defect.
fn parse_embedded<T: serde::de::DeserializeOwned>(name: &str, json: &str) -> Vec<T> {
  match serde_json::from_str(json) {
    Ok(items) => items,
    Err(e) => {
      tracing::error!("Embedded content {} is invalid: {}", name, e);
      Vec::new()
    }
  }
}
