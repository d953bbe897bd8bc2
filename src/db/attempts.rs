//! Writing history

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::config::MAX_SCORE;
use crate::domain::{Attempt, WritingFeedback, WritingTask};
use crate::progress::{rank_entries, LeaderboardEntry};

/// Aggregates over the writing history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttemptStats {
  pub task1_count: u32,
  pub task2_count: u32,
  pub best_score: u8,
  pub perfect_scores: u32,
  pub total_words: u64,
  pub average_score: f64,
}

impl AttemptStats {
  pub fn total(&self) -> u32 {
    self.task1_count + self.task2_count
  }

  pub fn average_display(&self) -> String {
    format!("{:.1}", self.average_score)
  }
}

pub(crate) fn parse_timestamp(idx: usize, value: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(value)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_attempt(row: &Row) -> Result<Attempt> {
  let task: String = row.get(1)?;
  let task = WritingTask::from_str(&task).ok_or_else(|| {
    rusqlite::Error::FromSqlConversionFailure(1, Type::Text, format!("unknown task {}", task).into())
  })?;
  let feedback_json: String = row.get(7)?;
  let feedback: WritingFeedback = serde_json::from_str(&feedback_json)
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;
  let created_at: String = row.get(8)?;

  Ok(Attempt {
    id: row.get(0)?,
    task,
    prompt_id: row.get(2)?,
    prompt_title: row.get(3)?,
    text: row.get(4)?,
    word_count: row.get::<_, i64>(5)? as usize,
    score: row.get(6)?,
    feedback,
    created_at: parse_timestamp(8, &created_at)?,
  })
}

const ATTEMPT_COLUMNS: &str =
  "id, task, prompt_id, prompt_title, text, word_count, score, feedback_json, created_at";

/// Store a submission together with its feedback. Returns the new id.
pub fn insert_attempt(conn: &Connection, attempt: &Attempt, display_name: &str) -> Result<i64> {
  let feedback_json = serde_json::to_string(&attempt.feedback)
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
  conn.execute(
    r#"
    INSERT INTO attempts
      (task, prompt_id, prompt_title, text, word_count, score, feedback_json, display_name, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    "#,
    params![
      attempt.task.as_str(),
      attempt.prompt_id,
      attempt.prompt_title,
      attempt.text,
      attempt.word_count as i64,
      attempt.score,
      feedback_json,
      display_name,
      attempt.created_at.to_rfc3339(),
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn get_attempt(conn: &Connection, id: i64) -> Result<Option<Attempt>> {
  conn
    .query_row(
      &format!("SELECT {} FROM attempts WHERE id = ?1", ATTEMPT_COLUMNS),
      params![id],
      row_to_attempt,
    )
    .optional()
}

/// Most recent submissions first
pub fn list_recent_attempts(conn: &Connection, limit: i64) -> Result<Vec<Attempt>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM attempts ORDER BY created_at DESC, id DESC LIMIT ?1",
    ATTEMPT_COLUMNS
  ))?;
  let attempts = stmt
    .query_map(params![limit], row_to_attempt)?
    .collect::<Result<Vec<_>>>()?;
  Ok(attempts)
}

pub fn get_attempt_stats(conn: &Connection) -> Result<AttemptStats> {
  conn.query_row(
    r#"
    SELECT
      COALESCE(SUM(CASE WHEN task = 'task1' THEN 1 ELSE 0 END), 0),
      COALESCE(SUM(CASE WHEN task = 'task2' THEN 1 ELSE 0 END), 0),
      COALESCE(MAX(score), 0),
      COALESCE(SUM(CASE WHEN score >= ?1 THEN 1 ELSE 0 END), 0),
      COALESCE(SUM(word_count), 0),
      COALESCE(AVG(score), 0.0)
    FROM attempts
    "#,
    params![MAX_SCORE],
    |row| {
      Ok(AttemptStats {
        task1_count: row.get::<_, i64>(0)? as u32,
        task2_count: row.get::<_, i64>(1)? as u32,
        best_score: row.get::<_, i64>(2)? as u8,
        perfect_scores: row.get::<_, i64>(3)? as u32,
        total_words: row.get::<_, i64>(4)? as u64,
        average_score: row.get(5)?,
      })
    },
  )
}

/// Best submissions for a task, in leaderboard order
pub fn leaderboard(conn: &Connection, task: WritingTask, limit: usize) -> Result<Vec<LeaderboardEntry>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT display_name, score, word_count, created_at
    FROM attempts
    WHERE task = ?1
    ORDER BY score DESC, word_count DESC, created_at ASC
    LIMIT ?2
    "#,
  )?;
  let entries = stmt
    .query_map(params![task.as_str(), limit as i64], |row| {
      let achieved_at: String = row.get(3)?;
      Ok(LeaderboardEntry {
        display_name: row.get(0)?,
        task,
        score: row.get(1)?,
        word_count: row.get::<_, i64>(2)? as usize,
        achieved_at: parse_timestamp(3, &achieved_at)?,
      })
    })?
    .collect::<Result<Vec<_>>>()?;

  // Timestamps from older rows may carry offsets; re-rank on parsed values
  Ok(rank_entries(entries, limit))
}
