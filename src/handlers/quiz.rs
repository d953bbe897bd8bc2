//! Practice quizzes and the daily quiz challenge.

use askama::Template;
use axum::{
  extract::{Query, State},
  response::Html,
  Form,
};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use std::collections::HashSet;

use crate::config::PRACTICE_QUIZ_QUESTIONS;
use crate::content::{self, QuizQuestion, QuizResult};
use crate::db;
use crate::progress::{self, AchievementId, ChallengeKind};
use crate::services::{record_quiz, RecordOutcome};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "quiz/index.html")]
pub struct QuizTemplate {
  pub questions: Vec<&'static QuizQuestion>,
  pub daily: bool,
  pub topic: Option<String>,
  pub topics: Vec<&'static str>,
  pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "quiz/result.html")]
pub struct QuizResultTemplate {
  pub result: QuizResult,
  pub daily: bool,
  pub challenge_completed: bool,
  pub unlocked: Vec<AchievementId>,
}

#[derive(Deserialize)]
pub struct QuizQuery {
  pub daily: Option<String>,
  pub topic: Option<String>,
}

fn is_set(flag: Option<&str>) -> bool {
  matches!(flag, Some("1" | "true" | "on"))
}

/// Distinct topics in bank order
pub fn quiz_topics() -> Vec<&'static str> {
  let mut topics: Vec<&'static str> = Vec::new();
  for q in content::quiz_bank() {
    if !topics.contains(&q.topic.as_str()) {
      topics.push(q.topic.as_str());
    }
  }
  topics
}

/// Random practice questions, optionally restricted to one topic
pub fn practice_questions(topic: Option<&str>, count: usize) -> Vec<&'static QuizQuestion> {
  let pool: Vec<&'static QuizQuestion> = content::quiz_bank()
    .iter()
    .filter(|q| topic.is_none_or(|t| q.topic == t))
    .collect();
  pool.choose_multiple(&mut rand::rng(), count).copied().collect()
}

pub async fn quiz_page(Query(query): Query<QuizQuery>) -> Html<String> {
  let topic = query.topic.as_deref().filter(|t| !t.is_empty());
  let mut notice = None;

  let daily_ids = if is_set(query.daily.as_deref()) {
    let challenge = progress::daily_challenge(progress::today());
    if challenge.kind == ChallengeKind::Quiz {
      Some(challenge.quiz_question_ids)
    } else {
      notice = Some(format!(
        "Today's challenge is {}, not a quiz. Here is a practice quiz instead.",
        challenge.kind.label().to_lowercase()
      ));
      None
    }
  } else {
    None
  };

  let template = match daily_ids {
    Some(ids) => QuizTemplate {
      questions: ids.iter().filter_map(|id| content::quiz_question(id)).collect(),
      daily: true,
      topic: None,
      topics: quiz_topics(),
      notice,
    },
    None => QuizTemplate {
      questions: practice_questions(topic, PRACTICE_QUIZ_QUESTIONS),
      daily: false,
      topic: topic.map(String::from),
      topics: quiz_topics(),
      notice,
    },
  };
  super::render(&template)
}

/// Pull `(question id, chosen index)` pairs out of the submitted form.
/// Questions arrive as repeated `question` fields, answers as `answer_<id>`.
/// A question listed twice is graded once.
pub fn parse_answers(fields: &[(String, String)]) -> Vec<(String, Option<usize>)> {
  let mut seen: HashSet<&str> = HashSet::new();
  let mut answers = Vec::new();
  for (key, id) in fields {
    if key != "question" || !seen.insert(id.as_str()) {
      continue;
    }
    let answer_key = format!("answer_{}", id);
    let chosen = fields
      .iter()
      .find(|(key, _)| *key == answer_key)
      .and_then(|(_, value)| value.parse().ok());
    answers.push((id.clone(), chosen));
  }
  answers
}

pub async fn submit_quiz(State(state): State<AppState>, Form(fields): Form<Vec<(String, String)>>) -> Html<String> {
  let daily = is_set(fields.iter().find(|(k, _)| k == "daily").map(|(_, v)| v.as_str()));
  let result = content::grade_quiz(&parse_answers(&fields));

  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return super::db_error_page(),
  };

  let outcome = if result.total == 0 {
    RecordOutcome::default()
  } else {
    match record_quiz(&conn, &result, daily, progress::today()) {
      Ok(outcome) => outcome,
      Err(e) => {
        tracing::warn!("Failed to record quiz: {}", e);
        RecordOutcome::default()
      }
    }
  };

  super::render(&QuizResultTemplate {
    result,
    daily,
    challenge_completed: outcome.challenge_completed,
    unlocked: outcome.unlocked,
  })
}
