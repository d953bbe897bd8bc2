//! Persisting a finished activity and everything that follows from it:
//! the activity day, the daily challenge, and newly earned achievements.

use chrono::NaiveDate;
use rusqlite::{Connection, Result};

use crate::content::QuizResult;
use crate::db;
use crate::domain::{Attempt, WritingFeedback, WritingTask};
use crate::progress::{daily_challenge, newly_unlocked, AchievementId};

/// What a recorded activity changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordOutcome {
  /// Attempt id for writing submissions
  pub attempt_id: Option<i64>,
  pub challenge_completed: bool,
  pub unlocked: Vec<AchievementId>,
}

/// A writing submission ready to be stored
pub struct Submission<'a> {
  pub task: WritingTask,
  pub prompt_id: Option<&'a str>,
  pub prompt_title: Option<&'a str>,
  pub text: &'a str,
  pub feedback: &'a WritingFeedback,
}

/// Store a writing submission made on `today`. All writes land in one transaction.
pub fn record_submission(conn: &Connection, submission: Submission<'_>, today: NaiveDate) -> Result<RecordOutcome> {
  let tx = conn.unchecked_transaction()?;
  let conn: &Connection = &tx;
  let display_name = db::get_display_name(conn)?;
  let attempt = Attempt::new(
    submission.task,
    submission.prompt_id.map(String::from),
    submission.prompt_title.map(String::from),
    submission.text.to_string(),
    submission.feedback.clone(),
  );
  let attempt_id = db::insert_attempt(conn, &attempt, &display_name)?;
  db::record_activity(conn, today)?;

  let challenge = daily_challenge(today);
  let challenge_completed = challenge.is_met_by_submission(
    submission.task,
    submission.prompt_id,
    submission.feedback.score,
  ) && db::mark_challenge_completed(conn, today, challenge.kind)?;

  let unlocked = unlock_new_achievements(conn, today)?;
  tx.commit()?;
  tracing::info!(
    "Recorded {} attempt {} (score {}/{}, {} new achievements)",
    submission.task.as_str(),
    attempt_id,
    submission.feedback.score,
    submission.feedback.max_score,
    unlocked.len()
  );

  Ok(RecordOutcome {
    attempt_id: Some(attempt_id),
    challenge_completed,
    unlocked,
  })
}

/// Store a graded quiz. `daily` marks the quiz as today's challenge quiz.
pub fn record_quiz(conn: &Connection, result: &QuizResult, daily: bool, today: NaiveDate) -> Result<RecordOutcome> {
  let tx = conn.unchecked_transaction()?;
  let conn: &Connection = &tx;
  db::insert_quiz_result(conn, result, daily)?;
  db::record_activity(conn, today)?;

  let challenge = daily_challenge(today);
  let challenge_completed =
    daily && challenge.is_met_by_quiz(result) && db::mark_challenge_completed(conn, today, challenge.kind)?;

  let unlocked = unlock_new_achievements(conn, today)?;
  tx.commit()?;
  tracing::info!(
    "Recorded quiz {}/{} (daily: {}, {} new achievements)",
    result.correct,
    result.total,
    daily,
    unlocked.len()
  );

  Ok(RecordOutcome {
    attempt_id: None,
    challenge_completed,
    unlocked,
  })
}

/// Evaluate every achievement against current progress and persist the new ones
pub fn unlock_new_achievements(conn: &Connection, today: NaiveDate) -> Result<Vec<AchievementId>> {
  let (snapshot, _) = db::get_progress_snapshot(conn, today)?;
  let already = db::get_unlocked_achievements(conn)?;
  let fresh = newly_unlocked(&snapshot, &already);
  for id in &fresh {
    db::unlock_achievement(conn, *id)?;
  }
  Ok(fresh)
}
