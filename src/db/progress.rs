//! Activity days, quiz results, achievements and daily challenge completion

use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::collections::HashSet;

use super::attempts::get_attempt_stats;
use crate::content::QuizResult;
use crate::progress::{calculate_streak, AchievementId, ChallengeKind, ProgressSnapshot, Streak};

const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizStats {
  pub completed: u32,
  pub perfect: u32,
}

pub fn insert_quiz_result(conn: &Connection, result: &QuizResult, is_daily: bool) -> Result<i64> {
  conn.execute(
    "INSERT INTO quiz_results (correct, total, is_daily, completed_at) VALUES (?1, ?2, ?3, ?4)",
    params![
      result.correct as i64,
      result.total as i64,
      is_daily,
      Utc::now().to_rfc3339()
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn get_quiz_stats(conn: &Connection) -> Result<QuizStats> {
  conn.query_row(
    r#"
    SELECT COUNT(*),
           COALESCE(SUM(CASE WHEN total > 0 AND correct = total THEN 1 ELSE 0 END), 0)
    FROM quiz_results
    "#,
    [],
    |row| {
      Ok(QuizStats {
        completed: row.get::<_, i64>(0)? as u32,
        perfect: row.get::<_, i64>(1)? as u32,
      })
    },
  )
}

/// Mark a day as active. Recording the same day twice is a no-op.
pub fn record_activity(conn: &Connection, day: NaiveDate) -> Result<()> {
  conn.execute(
    "INSERT OR IGNORE INTO activity_days (day) VALUES (?1)",
    params![day.format(DAY_FORMAT).to_string()],
  )?;
  Ok(())
}

pub fn get_activity_dates(conn: &Connection) -> Result<Vec<NaiveDate>> {
  let mut stmt = conn.prepare("SELECT day FROM activity_days ORDER BY day")?;
  let days = stmt
    .query_map([], |row| {
      let day: String = row.get(0)?;
      NaiveDate::parse_from_str(&day, DAY_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
    })?
    .collect::<Result<Vec<_>>>()?;
  Ok(days)
}

/// Unlocked achievements. Ids written by newer versions are skipped.
pub fn get_unlocked_achievements(conn: &Connection) -> Result<HashSet<AchievementId>> {
  let mut stmt = conn.prepare("SELECT id FROM achievements")?;
  let ids = stmt
    .query_map([], |row| row.get::<_, String>(0))?
    .collect::<Result<Vec<_>>>()?;
  Ok(ids.iter().filter_map(|id| AchievementId::from_str(id)).collect())
}

/// Returns true if the achievement was newly unlocked
pub fn unlock_achievement(conn: &Connection, id: AchievementId) -> Result<bool> {
  let inserted = conn.execute(
    "INSERT OR IGNORE INTO achievements (id, unlocked_at) VALUES (?1, ?2)",
    params![id.as_str(), Utc::now().to_rfc3339()],
  )?;
  Ok(inserted > 0)
}

/// Returns true if this call completed the challenge (false if already completed)
pub fn mark_challenge_completed(conn: &Connection, day: NaiveDate, kind: ChallengeKind) -> Result<bool> {
  let kind = match kind {
    ChallengeKind::Email => "email",
    ChallengeKind::Survey => "survey",
    ChallengeKind::Quiz => "quiz",
  };
  let inserted = conn.execute(
    "INSERT OR IGNORE INTO daily_challenges (day, kind, completed_at) VALUES (?1, ?2, ?3)",
    params![day.format(DAY_FORMAT).to_string(), kind, Utc::now().to_rfc3339()],
  )?;
  Ok(inserted > 0)
}

pub fn is_challenge_completed(conn: &Connection, day: NaiveDate) -> Result<bool> {
  let found: Option<i64> = conn
    .query_row(
      "SELECT 1 FROM daily_challenges WHERE day = ?1",
      params![day.format(DAY_FORMAT).to_string()],
      |row| row.get(0),
    )
    .optional()?;
  Ok(found.is_some())
}

pub fn count_completed_challenges(conn: &Connection) -> Result<u32> {
  let count: i64 = conn.query_row("SELECT COUNT(*) FROM daily_challenges", [], |row| row.get(0))?;
  Ok(count as u32)
}

/// Gather every counter the achievement rules need
pub fn get_progress_snapshot(conn: &Connection, today: NaiveDate) -> Result<(ProgressSnapshot, Streak)> {
  let attempts = get_attempt_stats(conn)?;
  let quizzes = get_quiz_stats(conn)?;
  let streak = calculate_streak(&get_activity_dates(conn)?, today);
  let challenges_completed = count_completed_challenges(conn)?;

  let snapshot = ProgressSnapshot {
    task1_count: attempts.task1_count,
    task2_count: attempts.task2_count,
    best_score: attempts.best_score,
    perfect_scores: attempts.perfect_scores,
    current_streak: streak.current,
    longest_streak: streak.longest,
    quizzes_completed: quizzes.completed,
    perfect_quizzes: quizzes.perfect,
    challenges_completed,
    total_words: attempts.total_words,
  };
  Ok((snapshot, streak))
}

/// Wipe all learning history. Settings survive.
pub fn clear_history(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    DELETE FROM attempts;
    DELETE FROM quiz_results;
    DELETE FROM activity_days;
    DELETE FROM daily_challenges;
    DELETE FROM achievements;
    "#,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{get_display_name, insert_attempt, set_setting};
  use crate::domain::{Attempt, WritingTask};
  use crate::evaluation::generate_task2_feedback;
  use crate::testing::TestEnv;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DAY_FORMAT).unwrap()
  }

  fn quiz(correct: usize, total: usize) -> QuizResult {
    QuizResult {
      correct,
      total,
      details: vec![],
    }
  }

  #[test]
  fn test_activity_is_deduplicated() {
    let env = TestEnv::new().unwrap();
    record_activity(&env.conn, d("2024-05-10")).unwrap();
    record_activity(&env.conn, d("2024-05-10")).unwrap();
    record_activity(&env.conn, d("2024-05-09")).unwrap();
    assert_eq!(get_activity_dates(&env.conn).unwrap(), vec![d("2024-05-09"), d("2024-05-10")]);
  }

  #[test]
  fn test_quiz_stats() {
    let env = TestEnv::new().unwrap();
    insert_quiz_result(&env.conn, &quiz(5, 5), true).unwrap();
    insert_quiz_result(&env.conn, &quiz(3, 5), false).unwrap();
    insert_quiz_result(&env.conn, &quiz(0, 0), false).unwrap();
    let stats = get_quiz_stats(&env.conn).unwrap();
    assert_eq!(stats, QuizStats { completed: 3, perfect: 1 });
  }

  #[test]
  fn test_achievements_unlock_once() {
    let env = TestEnv::new().unwrap();
    assert!(unlock_achievement(&env.conn, AchievementId::FirstEmail).unwrap());
    assert!(!unlock_achievement(&env.conn, AchievementId::FirstEmail).unwrap());
    env
      .conn
      .execute("INSERT INTO achievements (id, unlocked_at) VALUES ('retired', 'x')", [])
      .unwrap();
    let unlocked = get_unlocked_achievements(&env.conn).unwrap();
    assert_eq!(unlocked.len(), 1);
    assert!(unlocked.contains(&AchievementId::FirstEmail));
  }

  #[test]
  fn test_challenge_completion() {
    let env = TestEnv::new().unwrap();
    let day = d("2024-05-10");
    assert!(!is_challenge_completed(&env.conn, day).unwrap());
    assert!(mark_challenge_completed(&env.conn, day, ChallengeKind::Quiz).unwrap());
    assert!(!mark_challenge_completed(&env.conn, day, ChallengeKind::Quiz).unwrap());
    assert!(is_challenge_completed(&env.conn, day).unwrap());
    assert_eq!(count_completed_challenges(&env.conn).unwrap(), 1);
  }

  #[test]
  fn test_snapshot_combines_sources() {
    let env = TestEnv::new().unwrap();
    let text = "I prefer Option A because it is quiet.";
    let attempt = Attempt::new(WritingTask::Task2, None, None, text.into(), generate_task2_feedback(text, None));
    insert_attempt(&env.conn, &attempt, "A").unwrap();
    insert_quiz_result(&env.conn, &quiz(5, 5), false).unwrap();
    record_activity(&env.conn, d("2024-05-09")).unwrap();
    record_activity(&env.conn, d("2024-05-10")).unwrap();
    mark_challenge_completed(&env.conn, d("2024-05-10"), ChallengeKind::Quiz).unwrap();

    let (snapshot, streak) = get_progress_snapshot(&env.conn, d("2024-05-10")).unwrap();
    assert_eq!(snapshot.task2_count, 1);
    assert_eq!(snapshot.total_words, 8);
    assert_eq!(snapshot.perfect_quizzes, 1);
    assert_eq!(snapshot.current_streak, 2);
    assert_eq!(snapshot.challenges_completed, 1);
    assert_eq!(streak.longest, 2);
  }

  #[test]
  fn test_clear_history_keeps_settings() {
    let env = TestEnv::new().unwrap();
    set_setting(&env.conn, "display_name", "Priya").unwrap();
    record_activity(&env.conn, d("2024-05-10")).unwrap();
    unlock_achievement(&env.conn, AchievementId::QuizStarter).unwrap();
    insert_quiz_result(&env.conn, &quiz(1, 5), false).unwrap();

    clear_history(&env.conn).unwrap();

    assert!(get_activity_dates(&env.conn).unwrap().is_empty());
    assert!(get_unlocked_achievements(&env.conn).unwrap().is_empty());
    assert_eq!(get_quiz_stats(&env.conn).unwrap().completed, 0);
    assert_eq!(get_display_name(&env.conn).unwrap(), "Priya");
  }
}
