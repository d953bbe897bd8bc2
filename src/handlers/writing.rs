//! Writing practice pages: prompt, submission, and rule-based feedback.

use askama::Template;
use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::{Html, IntoResponse, Response},
  Form,
};
use serde::Deserialize;

use crate::config::{MAX_SUBMISSION_CHARS, MAX_WORDS, MIN_WORDS};
use crate::content::{self, Guide};
use crate::db;
use crate::domain::{Attempt, Task1Prompt, Task2Prompt, WritingFeedback, WritingTask};
use crate::evaluation::{evaluate_submission, highlight_contractions};
use crate::progress::{self, AchievementId};
use crate::services::{record_submission, RecordOutcome, Submission};
use crate::state::AppState;

/// Prompt choice for the picker
pub struct PromptOption {
  pub id: String,
  pub title: String,
  pub selected: bool,
}

#[derive(Template)]
#[template(path = "writing/task1.html")]
pub struct Task1Template {
  pub prompt: Option<&'static Task1Prompt>,
  pub prompts: Vec<PromptOption>,
  pub guide: Option<&'static Guide>,
  pub min_words: usize,
  pub max_words: usize,
  pub text: String,
  pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "writing/task2.html")]
pub struct Task2Template {
  pub prompt: Option<&'static Task2Prompt>,
  pub prompts: Vec<PromptOption>,
  pub guide: Option<&'static Guide>,
  pub min_words: usize,
  pub max_words: usize,
  pub text: String,
  pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "writing/feedback.html")]
pub struct FeedbackTemplate {
  pub task_title: &'static str,
  pub prompt_title: Option<String>,
  pub feedback: WritingFeedback,
  /// Escaped submission with contractions marked where they count against the writer
  pub highlighted: String,
  pub unlocked: Vec<AchievementId>,
  pub challenge_completed: bool,
  pub attempt_id: Option<i64>,
  pub created: String,
  pub retry_href: String,
}

impl FeedbackTemplate {
  pub fn for_attempt(attempt: &Attempt, outcome: RecordOutcome) -> Self {
    Self {
      task_title: attempt.task.title(),
      prompt_title: attempt.prompt_title.clone(),
      feedback: attempt.feedback.clone(),
      highlighted: highlight_for(attempt.task, attempt.prompt_id.as_deref(), &attempt.text),
      unlocked: outcome.unlocked,
      challenge_completed: outcome.challenge_completed,
      attempt_id: outcome.attempt_id.or(Some(attempt.id).filter(|id| *id > 0)),
      created: attempt.created_display(),
      retry_href: retry_href(attempt.task, attempt.prompt_id.as_deref()),
    }
  }
}

#[derive(Deserialize)]
pub struct PromptQuery {
  pub prompt: Option<String>,
}

#[derive(Deserialize)]
pub struct SubmissionForm {
  #[serde(default)]
  pub text: String,
  #[serde(default)]
  pub prompt_id: Option<String>,
}

impl SubmissionForm {
  fn prompt_id(&self) -> Option<&str> {
    self.prompt_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
  }
}

fn prompt_options<'a>(items: impl Iterator<Item = (&'a str, &'a str)>, selected: Option<&str>) -> Vec<PromptOption> {
  items
    .map(|(id, title)| PromptOption {
      id: id.to_string(),
      title: title.to_string(),
      selected: Some(id) == selected,
    })
    .collect()
}

fn task1_template(prompt_id: Option<&str>, text: String, error: Option<String>) -> Task1Template {
  let prompt = match prompt_id {
    Some(id) => content::task1_prompt(id),
    None => content::random_task1_prompt(),
  };
  let selected = prompt.map(|p| p.id.as_str());
  Task1Template {
    prompt,
    prompts: prompt_options(
      content::task1_prompts().iter().map(|p| (p.id.as_str(), p.title.as_str())),
      selected,
    ),
    guide: content::guide(WritingTask::Task1.as_str()),
    min_words: MIN_WORDS,
    max_words: MAX_WORDS,
    text,
    error,
  }
}

fn task2_template(prompt_id: Option<&str>, text: String, error: Option<String>) -> Task2Template {
  let prompt = match prompt_id {
    Some(id) => content::task2_prompt(id),
    None => content::random_task2_prompt(),
  };
  let selected = prompt.map(|p| p.id.as_str());
  Task2Template {
    prompt,
    prompts: prompt_options(
      content::task2_prompts().iter().map(|p| (p.id.as_str(), p.title.as_str())),
      selected,
    ),
    guide: content::guide(WritingTask::Task2.as_str()),
    min_words: MIN_WORDS,
    max_words: MAX_WORDS,
    text,
    error,
  }
}

pub async fn task1_page(Query(query): Query<PromptQuery>) -> Html<String> {
  let prompt_id = query.prompt.as_deref().filter(|id| !id.is_empty());
  super::render(&task1_template(prompt_id, String::new(), None))
}

pub async fn task2_page(Query(query): Query<PromptQuery>) -> Html<String> {
  let prompt_id = query.prompt.as_deref().filter(|id| !id.is_empty());
  super::render(&task2_template(prompt_id, String::new(), None))
}

pub async fn submit_task1(State(state): State<AppState>, Form(form): Form<SubmissionForm>) -> Response {
  if let Some(error) = submission_error(&form.text) {
    let page = task1_template(form.prompt_id(), form.text.clone(), Some(error));
    return (StatusCode::BAD_REQUEST, super::render(&page)).into_response();
  }
  submit(&state, WritingTask::Task1, &form).into_response()
}

pub async fn submit_task2(State(state): State<AppState>, Form(form): Form<SubmissionForm>) -> Response {
  if let Some(error) = submission_error(&form.text) {
    let page = task2_template(form.prompt_id(), form.text.clone(), Some(error));
    return (StatusCode::BAD_REQUEST, super::render(&page)).into_response();
  }
  submit(&state, WritingTask::Task2, &form).into_response()
}

/// Reason a submission cannot be evaluated, if any
pub fn submission_error(text: &str) -> Option<String> {
  if text.trim().is_empty() {
    Some("Write your response before submitting.".to_string())
  } else if text.chars().count() > MAX_SUBMISSION_CHARS {
    Some(format!("Responses are limited to {} characters.", MAX_SUBMISSION_CHARS))
  } else {
    None
  }
}

fn submit(state: &AppState, task: WritingTask, form: &SubmissionForm) -> Html<String> {
  let prompt_id = form.prompt_id();
  let feedback = evaluate_submission(task, &form.text, prompt_id);
  let prompt_title = prompt_title(task, prompt_id);

  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return super::db_error_page(),
  };

  let submission = Submission {
    task,
    prompt_id,
    prompt_title: prompt_title.as_deref(),
    text: &form.text,
    feedback: &feedback,
  };
  let outcome = match record_submission(&conn, submission, progress::today()) {
    Ok(outcome) => outcome,
    Err(e) => {
      tracing::warn!("Failed to record {} submission: {}", task.as_str(), e);
      RecordOutcome::default()
    }
  };

  let attempt = Attempt::new(
    task,
    prompt_id.map(String::from),
    prompt_title,
    form.text.clone(),
    feedback,
  );
  super::render(&FeedbackTemplate::for_attempt(&attempt, outcome))
}

/// Title of a built-in prompt
pub fn prompt_title(task: WritingTask, prompt_id: Option<&str>) -> Option<String> {
  let id = prompt_id?;
  match task {
    WritingTask::Task1 => content::task1_prompt(id).map(|p| p.title.clone()),
    WritingTask::Task2 => content::task2_prompt(id).map(|p| p.title.clone()),
  }
}

/// Escaped submission text. Contractions are marked unless the prompt asks for an informal email.
pub fn highlight_for(task: WritingTask, prompt_id: Option<&str>, text: &str) -> String {
  let informal = task == WritingTask::Task1
    && prompt_id
      .and_then(content::task1_prompt)
      .is_some_and(|p| !p.tone.avoids_contractions());
  if informal {
    html_escape::encode_text(text).to_string()
  } else {
    highlight_contractions(text)
  }
}

pub fn retry_href(task: WritingTask, prompt_id: Option<&str>) -> String {
  match prompt_id {
    Some(id) if !id.starts_with("ai-") => format!("/writing/{}?prompt={}", task.as_str(), id),
    _ => format!("/writing/{}", task.as_str()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::handlers::test_support::server;

  const EMAIL: &str = "Dear Sir or Madam,\n\nI am writing to complain about an order that arrived damaged. \
    It isn't acceptable.\n\nYours faithfully,\nAna";

  #[test]
  fn test_submission_error() {
    assert!(submission_error("   ").is_some());
    assert!(submission_error(&"a".repeat(MAX_SUBMISSION_CHARS + 1)).is_some());
    assert!(submission_error("Dear Sam,").is_none());
  }

  #[test]
  fn test_informal_prompt_is_not_highlighted() {
    let text = "I can't wait";
    assert!(highlight_for(WritingTask::Task1, Some("t1-friend-visit"), text).contains("can't"));
    assert!(!highlight_for(WritingTask::Task1, Some("t1-friend-visit"), text).contains("<mark>"));
    assert!(highlight_for(WritingTask::Task1, Some("t1-damaged-order"), text).contains("<mark>"));
    assert!(highlight_for(WritingTask::Task2, None, text).contains("<mark>"));
  }

  #[test]
  fn test_retry_href() {
    assert_eq!(
      retry_href(WritingTask::Task1, Some("t1-damaged-order")),
      "/writing/task1?prompt=t1-damaged-order"
    );
    assert_eq!(retry_href(WritingTask::Task2, Some("ai-t2-abc")), "/writing/task2");
    assert_eq!(retry_href(WritingTask::Task2, None), "/writing/task2");
  }

  #[tokio::test]
  async fn test_task_pages_render_selected_prompt() {
    let (_temp, server) = server();
    let response = server.get("/writing/task1").add_query_param("prompt", "t1-damaged-order").await;
    response.assert_status_ok();
    assert!(response.text().contains("Damaged online order"));

    let response = server.get("/writing/task2").add_query_param("prompt", "t2-vacant-lot").await;
    response.assert_status_ok();
    assert!(response.text().contains("Using a vacant lot"));
  }

  #[tokio::test]
  async fn test_submit_renders_feedback_and_records_attempt() {
    let (_temp, server) = server();
    let response = server
      .post("/writing/task1")
      .form(&[("text", EMAIL), ("prompt_id", "t1-damaged-order")])
      .await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Damaged online order"));
    assert!(html.contains("<mark>isn&#x27;t</mark>") || html.contains("<mark>isn't</mark>"));
    assert!(html.contains("First Email"));

    let history = server.get("/history").await.text();
    assert!(history.contains("Damaged online order"));
  }

  #[tokio::test]
  async fn test_empty_submission_is_rejected() {
    let (_temp, server) = server();
    let response = server
      .post("/writing/task2")
      .form(&[("text", "  "), ("prompt_id", "")])
      .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Write your response before submitting."));
  }
}
