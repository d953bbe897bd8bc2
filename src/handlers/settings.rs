use askama::Template;
use axum::{
  extract::{Query, State},
  response::{Html, Redirect},
  Form,
};
use serde::Deserialize;

use crate::config::MAX_SCORE;
use crate::db::{self, LogOnError};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
  pub display_name: String,
  pub target_score: u8,
  pub max_score: u8,
  pub llm_enabled: bool,
  pub llm_model: Option<String>,
  pub tts_program: String,
  pub message: Option<&'static str>,
}

#[derive(Deserialize)]
pub struct SettingsQuery {
  pub saved: Option<String>,
  pub cleared: Option<String>,
}

pub async fn settings_page(State(state): State<AppState>, Query(query): Query<SettingsQuery>) -> Html<String> {
  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return super::db_error_page(),
  };

  let message = if query.cleared.is_some() {
    Some("History cleared.")
  } else if query.saved.is_some() {
    Some("Settings saved.")
  } else {
    None
  };

  let template = SettingsTemplate {
    display_name: db::get_display_name(&conn).log_warn_default("Failed to load display name"),
    target_score: db::get_target_score(&conn).unwrap_or(db::DEFAULT_TARGET_SCORE),
    max_score: MAX_SCORE,
    llm_enabled: state.llm_enabled(),
    llm_model: state.llm.as_ref().map(|llm| llm.model().to_string()),
    tts_program: state.tts.program().to_string(),
    message,
  };
  super::render(&template)
}

#[derive(Deserialize)]
pub struct SettingsForm {
  #[serde(default)]
  pub display_name: String,
  #[serde(default)]
  pub target_score: String,
}

pub async fn update_settings(State(state): State<AppState>, Form(form): Form<SettingsForm>) -> Redirect {
  let Ok(conn) = db::try_lock(&state.db) else {
    return Redirect::to("/settings");
  };

  let _ = db::set_display_name(&conn, &form.display_name).log_warn("Failed to save display name");
  if let Ok(score) = form.target_score.trim().parse::<u8>() {
    let _ = db::set_target_score(&conn, score).log_warn("Failed to save target score");
  }

  Redirect::to("/settings?saved=1")
}

/// Wipe attempts, quizzes, streak days, challenges and achievements
pub async fn clear_history(State(state): State<AppState>) -> Redirect {
  let Ok(conn) = db::try_lock(&state.db) else {
    return Redirect::to("/settings");
  };

  if db::clear_history(&conn).log_warn("Failed to clear history").is_some() {
    tracing::info!("Learning history cleared");
  }
  Redirect::to("/settings?cleared=1")
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;

  use crate::handlers::test_support::server;

  #[tokio::test]
  async fn test_update_settings() {
    let (_temp, server) = server();
    let response = server
      .post("/settings")
      .form(&[("display_name", "  Priya  "), ("target_score", "15")])
      .await;
    response.assert_status(StatusCode::SEE_OTHER);

    let html = server.get("/settings").add_query_param("saved", "1").await.text();
    assert!(html.contains("value=\"Priya\""));
    assert!(html.contains("value=\"12\""));
    assert!(html.contains("Settings saved."));
  }

  #[tokio::test]
  async fn test_clear_history_empties_dashboard() {
    let (_temp, server) = server();
    server
      .post("/writing/task1")
      .form(&[("text", "Dear Sam,\n\nHello there.\n\nBest,\nAna"), ("prompt_id", "")])
      .await
      .assert_status_ok();
    assert!(!server.get("/").await.text().contains("No submissions yet"));

    server.post("/settings/clear-history").await.assert_status(StatusCode::SEE_OTHER);
    assert!(server.get("/").await.text().contains("No submissions yet"));
  }
}
