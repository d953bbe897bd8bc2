use askama::Template;
use axum::{extract::State, response::Html};

use crate::config::LEADERBOARD_SIZE;
use crate::db::{self, LogOnError};
use crate::domain::WritingTask;
use crate::progress::LeaderboardEntry;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "leaderboard.html")]
pub struct LeaderboardTemplate {
  pub task1: Vec<LeaderboardEntry>,
  pub task2: Vec<LeaderboardEntry>,
}

/// Best attempts per task on this machine
pub async fn leaderboard_page(State(state): State<AppState>) -> Html<String> {
  let conn = match db::try_lock(&state.db) {
    Ok(conn) => conn,
    Err(_) => return super::db_error_page(),
  };

  let template = LeaderboardTemplate {
    task1: db::leaderboard(&conn, WritingTask::Task1, LEADERBOARD_SIZE).log_warn_default("Failed to load Task 1 leaderboard"),
    task2: db::leaderboard(&conn, WritingTask::Task2, LEADERBOARD_SIZE).log_warn_default("Failed to load Task 2 leaderboard"),
  };
  super::render(&template)
}
