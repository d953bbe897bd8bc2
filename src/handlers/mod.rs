pub mod api;
pub mod challenge;
pub mod guide;
pub mod history;
pub mod leaderboard;
pub mod quiz;
pub mod settings;
pub mod writing;

use askama::Template;
use axum::{
  extract::State,
  response::Html,
  routing::{get, post},
  Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::DASHBOARD_ATTEMPTS;
use crate::db::{self, LogOnError};
use crate::domain::Attempt;
use crate::paths;
use crate::progress::{self, achievement_views, AchievementView, Streak};
use crate::state::AppState;

pub use challenge::{challenge_view, ChallengeView};

/// Every route of the application
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/", get(index))
    .route("/health", get(health))
    .route("/writing/task1", get(writing::task1_page).post(writing::submit_task1))
    .route("/writing/task2", get(writing::task2_page).post(writing::submit_task2))
    .route("/history", get(history::history_index))
    .route("/history/{id}", get(history::history_detail))
    .route("/quiz", get(quiz::quiz_page).post(quiz::submit_quiz))
    .route("/challenge", get(challenge::challenge_page))
    .route("/guide", get(guide::guide))
    .route("/leaderboard", get(leaderboard::leaderboard_page))
    .route("/settings", get(settings::settings_page).post(settings::update_settings))
    .route("/settings/clear-history", post(settings::clear_history))
    .route("/api/evaluate", post(api::evaluate))
    .route("/api/generate", post(api::generate))
    .route("/api/coach", post(api::coach))
    .route("/api/tts", post(api::tts))
    .route("/api/challenge/today", get(api::challenge_today))
    .route("/api/progress", get(api::progress))
    .nest_service("/static", ServeDir::new(paths::STATIC_DIR))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Shown when the database lock cannot be taken
pub(crate) fn db_error_page() -> Html<String> {
  Html("<h1>Database Error</h1><p>Please refresh the page.</p>".to_string())
}

/// Render a template, degrading to an error fragment
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
  match template.render() {
    Ok(html) => Html(html),
    Err(e) => {
      tracing::warn!("Template render failed: {}", e);
      Html("<h1>Something went wrong</h1><p>The page could not be displayed.</p>".to_string())
    }
  }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub display_name: String,
  pub streak: Streak,
  pub practised_today: bool,
  pub total_attempts: u32,
  pub best_score: u8,
  pub average_score: String,
  pub target_score: u8,
  pub recent: Vec<Attempt>,
  pub challenge: ChallengeView,
  pub achievements: Vec<AchievementView>,
  pub unlocked_count: usize,
  pub llm_enabled: bool,
}

/// Dashboard: streak, recent attempts, today's challenge and achievements
pub async fn index(State(state): State<AppState>) -> Html<String> {
  let today = progress::today();
  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return db_error_page(),
  };

  let (_, streak) = db::get_progress_snapshot(&conn, today).log_warn_default("Failed to load progress");
  let stats = db::get_attempt_stats(&conn).log_warn_default("Failed to load attempt stats");
  let recent = db::list_recent_attempts(&conn, DASHBOARD_ATTEMPTS).log_warn_default("Failed to load recent attempts");
  let unlocked = db::get_unlocked_achievements(&conn).log_warn_default("Failed to load achievements");
  let completed = db::is_challenge_completed(&conn, today).log_warn_default("Failed to load challenge state");

  let template = IndexTemplate {
    display_name: db::get_display_name(&conn).log_warn_default("Failed to load display name"),
    practised_today: streak.active_today(today),
    streak,
    total_attempts: stats.total(),
    best_score: stats.best_score,
    average_score: stats.average_display(),
    target_score: db::get_target_score(&conn).unwrap_or(db::DEFAULT_TARGET_SCORE),
    recent,
    challenge: challenge_view(&progress::daily_challenge(today), completed),
    unlocked_count: unlocked.len(),
    achievements: achievement_views(&unlocked),
    llm_enabled: state.llm_enabled(),
  };

  render(&template)
}

pub async fn health() -> &'static str {
  "ok"
}
