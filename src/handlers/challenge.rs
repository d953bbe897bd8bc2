use askama::Template;
use axum::{extract::State, response::Html};

use crate::content;
use crate::db::{self, LogOnError};
use crate::progress::{self, ChallengeKind, DailyChallenge};
use crate::state::AppState;

/// Today's challenge as shown on the dashboard and the challenge page
#[derive(Debug, Clone)]
pub struct ChallengeView {
  pub date: String,
  pub kind_label: &'static str,
  pub title: String,
  pub description: String,
  pub href: String,
  pub target_score: Option<u8>,
  pub completed: bool,
}

pub fn challenge_view(challenge: &DailyChallenge, completed: bool) -> ChallengeView {
  let (title, description, href) = match challenge.kind {
    ChallengeKind::Email => {
      let prompt = challenge.prompt_id.as_deref().and_then(content::task1_prompt);
      (
        prompt.map(|p| p.title.clone()).unwrap_or_else(|| "Email practice".to_string()),
        prompt.map(|p| p.scenario.clone()).unwrap_or_default(),
        format!("/writing/task1?prompt={}", challenge.prompt_id.as_deref().unwrap_or("")),
      )
    }
    ChallengeKind::Survey => {
      let prompt = challenge.prompt_id.as_deref().and_then(content::task2_prompt);
      (
        prompt.map(|p| p.title.clone()).unwrap_or_else(|| "Survey practice".to_string()),
        prompt.map(|p| p.question.clone()).unwrap_or_default(),
        format!("/writing/task2?prompt={}", challenge.prompt_id.as_deref().unwrap_or("")),
      )
    }
    ChallengeKind::Quiz => (
      format!("{}-question quiz", challenge.quiz_question_ids.len()),
      format!(
        "Answer at least {} of {} questions correctly.",
        crate::config::DAILY_QUIZ_PASS,
        challenge.quiz_question_ids.len()
      ),
      "/quiz?daily=1".to_string(),
    ),
  };

  ChallengeView {
    date: challenge.date_key(),
    kind_label: challenge.kind.label(),
    title,
    description,
    href,
    target_score: challenge.target_score,
    completed,
  }
}

#[derive(Template)]
#[template(path = "challenge.html")]
pub struct ChallengeTemplate {
  pub challenge: ChallengeView,
  pub challenges_completed: u32,
}

pub async fn challenge_page(State(state): State<AppState>) -> Html<String> {
  let today = progress::today();
  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return super::db_error_page(),
  };

  let completed = db::is_challenge_completed(&conn, today).log_warn_default("Failed to load challenge state");
  let template = ChallengeTemplate {
    challenge: challenge_view(&progress::daily_challenge(today), completed),
    challenges_completed: db::count_completed_challenges(&conn)
      .log_warn_default("Failed to count challenges"),
  };
  super::render(&template)
}
