use askama::Template;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};

use crate::config::RECENT_ATTEMPTS_LIMIT;
use crate::db::{self, AttemptStats, LogOnError};
use crate::domain::Attempt;
use crate::services::RecordOutcome;
use crate::state::AppState;

use super::writing::FeedbackTemplate;

#[derive(Template)]
#[template(path = "history/index.html")]
pub struct HistoryTemplate {
  pub attempts: Vec<Attempt>,
  pub stats: AttemptStats,
}

pub async fn history_index(State(state): State<AppState>) -> Html<String> {
  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return super::db_error_page(),
  };

  let template = HistoryTemplate {
    attempts: db::list_recent_attempts(&conn, RECENT_ATTEMPTS_LIMIT).log_warn_default("Failed to load history"),
    stats: db::get_attempt_stats(&conn).log_warn_default("Failed to load attempt stats"),
  };
  super::render(&template)
}

/// Stored feedback for one attempt
pub async fn history_detail(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return super::db_error_page().into_response(),
  };

  match db::get_attempt(&conn, id) {
    Ok(Some(attempt)) => super::render(&FeedbackTemplate::for_attempt(&attempt, RecordOutcome::default())).into_response(),
    Ok(None) => (
      StatusCode::NOT_FOUND,
      Html("<h1>Not found</h1><p>That attempt does not exist. <a href=\"/history\">Back to history</a></p>".to_string()),
    )
      .into_response(),
    Err(e) => {
      tracing::warn!("Failed to load attempt {}: {}", id, e);
      (StatusCode::INTERNAL_SERVER_ERROR, super::db_error_page()).into_response()
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;

  use crate::handlers::test_support::server;

  #[tokio::test]
  async fn test_empty_history() {
    let (_temp, server) = server();
    let response = server.get("/history").await;
    response.assert_status_ok();
    assert!(response.text().contains("No submissions yet"));
  }

  #[tokio::test]
  async fn test_detail_shows_stored_feedback() {
    let (_temp, server) = server();
    server
      .post("/writing/task2")
      .form(&[("text", "I prefer Option A because it helps families."), ("prompt_id", "t2-vacant-lot")])
      .await
      .assert_status_ok();

    let response = server.get("/history/1").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Using a vacant lot"));
    assert!(html.contains("I prefer Option A"));
  }

  #[tokio::test]
  async fn test_missing_attempt_is_404() {
    let (_temp, server) = server();
    server.get("/history/999").await.assert_status(StatusCode::NOT_FOUND);
  }
}
