//! Multiple-choice quiz bank and grading.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static QUIZ_BANK: LazyLock<Vec<QuizQuestion>> =
  LazyLock::new(|| super::parse_embedded("quizzes", include_str!("data/quizzes.json")));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
  pub id: String,
  /// connectors, register, format, vocabulary, structure
  pub topic: String,
  pub question: String,
  pub choices: Vec<String>,
  pub answer_index: usize,
  pub explanation: String,
}

impl QuizQuestion {
  pub fn correct_choice(&self) -> &str {
    self.choices.get(self.answer_index).map(String::as_str).unwrap_or("")
  }
}

/// Outcome for one graded question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizAnswerDetail {
  pub question_id: String,
  pub question: String,
  pub chosen: Option<String>,
  pub correct_choice: String,
  pub correct: bool,
  pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
  pub correct: usize,
  pub total: usize,
  pub details: Vec<QuizAnswerDetail>,
}

impl QuizResult {
  pub fn percentage(&self) -> u32 {
    if self.total == 0 {
      0
    } else {
      (self.correct * 100 / self.total) as u32
    }
  }

  pub fn is_perfect(&self) -> bool {
    self.total > 0 && self.correct == self.total
  }
}

pub fn quiz_bank() -> &'static [QuizQuestion] {
  &QUIZ_BANK
}

pub fn quiz_question(id: &str) -> Option<&'static QuizQuestion> {
  QUIZ_BANK.iter().find(|q| q.id == id)
}

/// Grade `(question_id, chosen index)` pairs. Unknown question ids are skipped;
/// a missing (`None`) or out-of-range choice counts as wrong.
pub fn grade_quiz(answers: &[(String, Option<usize>)]) -> QuizResult {
  let details: Vec<QuizAnswerDetail> = answers
    .iter()
    .filter_map(|(id, choice)| {
      let question = quiz_question(id)?;
      let chosen = choice.and_then(|c| question.choices.get(c).cloned());
      Some(QuizAnswerDetail {
        question_id: question.id.clone(),
        question: question.question.clone(),
        correct: chosen.is_some() && *choice == Some(question.answer_index),
        chosen,
        correct_choice: question.correct_choice().to_string(),
        explanation: question.explanation.clone(),
      })
    })
    .collect();

  QuizResult {
    correct: details.iter().filter(|d| d.correct).count(),
    total: details.len(),
    details,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_bank_is_well_formed() {
    assert!(quiz_bank().len() >= 12);
    let mut ids = HashSet::new();
    for q in quiz_bank() {
      assert!(ids.insert(q.id.as_str()), "duplicate {}", q.id);
      assert!(q.answer_index < q.choices.len(), "{}", q.id);
      assert!(q.choices.len() >= 2);
    }
  }

  #[test]
  fn test_bank_covers_topics() {
    let topics: HashSet<&str> = quiz_bank().iter().map(|q| q.topic.as_str()).collect();
    for topic in ["connectors", "register", "format", "vocabulary"] {
      assert!(topics.contains(topic), "missing topic {}", topic);
    }
  }

  #[test]
  fn test_grade_quiz_counts_correct() {
    let q1 = quiz_question("q-format-2").unwrap();
    let q2 = quiz_question("q-connector-1").unwrap();
    let answers = vec![
      (q1.id.clone(), Some(q1.answer_index)),
      (q2.id.clone(), Some((q2.answer_index + 1) % q2.choices.len())),
    ];
    let result = grade_quiz(&answers);
    assert_eq!(result.total, 2);
    assert_eq!(result.correct, 1);
    assert!(result.details[0].correct);
    assert!(!result.details[1].correct);
    assert_eq!(result.details[1].correct_choice, q2.correct_choice());
    assert_eq!(result.percentage(), 50);
  }

  #[test]
  fn test_unknown_ids_skipped_and_missing_answers_wrong() {
    let answers = vec![
      ("no-such-question".to_string(), Some(0)),
      ("q-register-1".to_string(), None),
      ("q-register-2".to_string(), Some(99)),
    ];
    let result = grade_quiz(&answers);
    assert_eq!(result.total, 2);
    assert_eq!(result.correct, 0);
    assert!(result.details.iter().all(|d| d.chosen.is_none()));
  }

  #[test]
  fn test_perfect_result() {
    let answers: Vec<(String, Option<usize>)> = quiz_bank()
      .iter()
      .take(3)
      .map(|q| (q.id.clone(), Some(q.answer_index)))
      .collect();
    let result = grade_quiz(&answers);
    assert!(result.is_perfect());
    assert_eq!(result.percentage(), 100);
    assert!(!grade_quiz(&[]).is_perfect());
  }
}
