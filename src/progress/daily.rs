//! Deterministic daily challenge.
//!
//! The challenge for a date is derived from SHA-256 of `celpip-daily:<date>`,
//! so every install shows the same challenge on the same day without storing it.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::config::{DAILY_QUIZ_PASS, DAILY_QUIZ_QUESTIONS};
use crate::content::{self, QuizResult};
use crate::domain::WritingTask;

const SEED_PREFIX: &str = "celpip-daily:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
  Email,
  Survey,
  Quiz,
}

impl ChallengeKind {
  pub fn label(&self) -> &'static str {
    match self {
      Self::Email => "Write an email",
      Self::Survey => "Answer a survey",
      Self::Quiz => "Quick quiz",
    }
  }

  pub fn task(&self) -> Option<WritingTask> {
    match self {
      Self::Email => Some(WritingTask::Task1),
      Self::Survey => Some(WritingTask::Task2),
      Self::Quiz => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallenge {
  pub date: NaiveDate,
  pub kind: ChallengeKind,
  /// Writing prompt for email and survey challenges
  pub prompt_id: Option<String>,
  /// Questions for quiz challenges
  pub quiz_question_ids: Vec<String>,
  /// Score a writing submission must reach
  pub target_score: Option<u8>,
}

impl DailyChallenge {
  /// Whether a writing submission made on `self.date` completes the challenge
  pub fn is_met_by_submission(&self, task: WritingTask, prompt_id: Option<&str>, score: u8) -> bool {
    self.kind.task() == Some(task)
      && self.prompt_id.is_some()
      && self.prompt_id.as_deref() == prompt_id
      && self.target_score.is_some_and(|target| score >= target)
  }

  /// Whether a graded quiz completes the challenge. The quiz must answer exactly
  /// the challenge questions, each once, with at least `DAILY_QUIZ_PASS` right.
  pub fn is_met_by_quiz(&self, result: &QuizResult) -> bool {
    if self.kind != ChallengeKind::Quiz || self.quiz_question_ids.is_empty() {
      return false;
    }
    let expected: HashSet<&str> = self.quiz_question_ids.iter().map(String::as_str).collect();
    let mut answered: HashSet<&str> = HashSet::new();
    for detail in &result.details {
      if !expected.contains(detail.question_id.as_str()) || !answered.insert(detail.question_id.as_str()) {
        return false;
      }
    }
    let correct = result.details.iter().filter(|d| d.correct).count();
    answered.len() == expected.len() && correct >= DAILY_QUIZ_PASS.min(expected.len())
  }

  pub fn date_key(&self) -> String {
    self.date.format("%Y-%m-%d").to_string()
  }
}

/// Seed for a date: first 8 bytes (big-endian) of SHA-256("celpip-daily:YYYY-MM-DD")
pub fn daily_seed(date: NaiveDate) -> u64 {
  let digest = Sha256::digest(format!("{}{}", SEED_PREFIX, date.format("%Y-%m-%d")).as_bytes());
  let mut bytes = [0u8; 8];
  bytes.copy_from_slice(&digest[..8]);
  u64::from_be_bytes(bytes)
}

/// The challenge for a given day
pub fn daily_challenge(date: NaiveDate) -> DailyChallenge {
  let mut rng = StdRng::seed_from_u64(daily_seed(date));

  let kind = match rng.random_range(0..3u8) {
    0 => ChallengeKind::Email,
    1 => ChallengeKind::Survey,
    _ => ChallengeKind::Quiz,
  };

  let mut challenge = DailyChallenge {
    date,
    kind,
    prompt_id: None,
    quiz_question_ids: Vec::new(),
    target_score: None,
  };

  match kind {
    ChallengeKind::Email => {
      let prompts = content::task1_prompts();
      if !prompts.is_empty() {
        challenge.prompt_id = Some(prompts[rng.random_range(0..prompts.len())].id.clone());
      }
      challenge.target_score = Some(rng.random_range(7..=10));
    }
    ChallengeKind::Survey => {
      let prompts = content::task2_prompts();
      if !prompts.is_empty() {
        challenge.prompt_id = Some(prompts[rng.random_range(0..prompts.len())].id.clone());
      }
      challenge.target_score = Some(rng.random_range(7..=10));
    }
    ChallengeKind::Quiz => {
      let bank = content::quiz_bank();
      let amount = DAILY_QUIZ_QUESTIONS.min(bank.len());
      challenge.quiz_question_ids = rand::seq::index::sample(&mut rng, bank.len(), amount)
        .into_iter()
        .map(|i| bank[i].id.clone())
        .collect();
    }
  }

  challenge
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::grade_quiz;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  #[test]
  fn test_seed_is_sha256_prefix() {
    let digest = Sha256::digest(b"celpip-daily:2024-05-10");
    let expected = u64::from_be_bytes(digest[..8].try_into().unwrap());
    assert_eq!(daily_seed(d("2024-05-10")), expected);
    assert_ne!(daily_seed(d("2024-05-10")), daily_seed(d("2024-05-11")));
  }

  #[test]
  fn test_same_date_same_challenge() {
    for day in 1..=28 {
      let date = d(&format!("2024-02-{:02}", day));
      assert_eq!(daily_challenge(date), daily_challenge(date));
    }
  }

  #[test]
  fn test_challenge_shapes() {
    let mut kinds = HashSet::new();
    for day in 0..120 {
      let date = d("2024-01-01") + chrono::Duration::days(day);
      let c = daily_challenge(date);
      kinds.insert(c.kind);
      match c.kind {
        ChallengeKind::Email => {
          let id = c.prompt_id.as_deref().unwrap();
          assert!(content::task1_prompt(id).is_some());
          assert!((7..=10).contains(&c.target_score.unwrap()));
          assert!(c.quiz_question_ids.is_empty());
        }
        ChallengeKind::Survey => {
          let id = c.prompt_id.as_deref().unwrap();
          assert!(content::task2_prompt(id).is_some());
          assert!((7..=10).contains(&c.target_score.unwrap()));
        }
        ChallengeKind::Quiz => {
          assert_eq!(c.quiz_question_ids.len(), DAILY_QUIZ_QUESTIONS);
          let unique: HashSet<&String> = c.quiz_question_ids.iter().collect();
          assert_eq!(unique.len(), DAILY_QUIZ_QUESTIONS);
          assert!(c.prompt_id.is_none());
          assert!(c.target_score.is_none());
        }
      }
    }
    assert_eq!(kinds.len(), 3, "all kinds should appear over four months");
  }

  #[test]
  fn test_submission_completion_rules() {
    let challenge = DailyChallenge {
      date: d("2024-05-10"),
      kind: ChallengeKind::Email,
      prompt_id: Some("t1-damaged-order".into()),
      quiz_question_ids: vec![],
      target_score: Some(8),
    };
    assert!(challenge.is_met_by_submission(WritingTask::Task1, Some("t1-damaged-order"), 8));
    assert!(!challenge.is_met_by_submission(WritingTask::Task1, Some("t1-damaged-order"), 7));
    assert!(!challenge.is_met_by_submission(WritingTask::Task1, Some("t1-friend-visit"), 12));
    assert!(!challenge.is_met_by_submission(WritingTask::Task2, Some("t1-damaged-order"), 12));
    assert!(!challenge.is_met_by_submission(WritingTask::Task1, None, 12));
    assert!(!challenge.is_met_by_quiz(&grade_quiz(&[("q-format-1".to_string(), Some(0))])));
  }

  fn quiz_challenge() -> DailyChallenge {
    DailyChallenge {
      date: d("2024-05-10"),
      kind: ChallengeKind::Quiz,
      prompt_id: None,
      quiz_question_ids: content::quiz_bank().iter().take(5).map(|q| q.id.clone()).collect(),
      target_score: None,
    }
  }

  /// Answers for `ids`, the first `right` of them correct
  fn answers(ids: &[String], right: usize) -> Vec<(String, Option<usize>)> {
    ids
      .iter()
      .enumerate()
      .map(|(i, id)| {
        let q = content::quiz_question(id).unwrap();
        let choice = if i < right { q.answer_index } else { (q.answer_index + 1) % q.choices.len() };
        (id.clone(), Some(choice))
      })
      .collect()
  }

  #[test]
  fn test_quiz_completion_rule() {
    let challenge = quiz_challenge();
    let ids = challenge.quiz_question_ids.clone();
    assert!(challenge.is_met_by_quiz(&grade_quiz(&answers(&ids, 4))));
    assert!(challenge.is_met_by_quiz(&grade_quiz(&answers(&ids, 5))));
    assert!(!challenge.is_met_by_quiz(&grade_quiz(&answers(&ids, 3))));
    assert!(!challenge.is_met_by_submission(WritingTask::Task1, None, 12));
  }

  #[test]
  fn test_quiz_must_answer_todays_questions() {
    let challenge = quiz_challenge();
    let others: Vec<String> = content::quiz_bank()
      .iter()
      .filter(|q| !challenge.quiz_question_ids.contains(&q.id))
      .take(5)
      .map(|q| q.id.clone())
      .collect();
    assert!(!challenge.is_met_by_quiz(&grade_quiz(&answers(&others, 5))));

    // Only part of the set
    let ids = &challenge.quiz_question_ids;
    assert!(!challenge.is_met_by_quiz(&grade_quiz(&answers(&ids[..4], 4))));
  }

  #[test]
  fn test_repeated_question_does_not_count() {
    let challenge = quiz_challenge();
    let first = challenge.quiz_question_ids[0].clone();
    let repeated = vec![first; 5];
    assert!(!challenge.is_met_by_quiz(&grade_quiz(&answers(&repeated, 5))));

    let mut ids = challenge.quiz_question_ids.clone();
    ids.push(ids[0].clone());
    assert!(!challenge.is_met_by_quiz(&grade_quiz(&answers(&ids, 6))));
  }
}
