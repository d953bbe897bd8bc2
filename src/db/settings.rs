//! Key/value learner settings

use rusqlite::{params, Connection, Result};

use crate::config::MAX_SCORE;

pub const DEFAULT_DISPLAY_NAME: &str = "Learner";
pub const DEFAULT_TARGET_SCORE: u8 = 9;

/// Longest display name kept (leaderboard column width)
const DISPLAY_NAME_MAX_CHARS: usize = 40;

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
  let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
  let mut rows = stmt.query(params![key])?;
  if let Some(row) = rows.next()? {
    Ok(Some(row.get(0)?))
  } else {
    Ok(None)
  }
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![key, value],
  )?;
  Ok(())
}

pub fn get_display_name(conn: &Connection) -> Result<String> {
  Ok(
    get_setting(conn, "display_name")?
      .filter(|n| !n.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
  )
}

/// Store a trimmed display name; blank input restores the default
pub fn set_display_name(conn: &Connection, name: &str) -> Result<()> {
  let trimmed: String = name.trim().chars().take(DISPLAY_NAME_MAX_CHARS).collect();
  let value = if trimmed.is_empty() { DEFAULT_DISPLAY_NAME.to_string() } else { trimmed };
  set_setting(conn, "display_name", &value)
}

/// Personal goal shown on the dashboard (1..=12)
pub fn get_target_score(conn: &Connection) -> Result<u8> {
  Ok(
    get_setting(conn, "target_score")?
      .and_then(|v| v.parse::<u8>().ok())
      .filter(|v| (1..=MAX_SCORE).contains(v))
      .unwrap_or(DEFAULT_TARGET_SCORE),
  )
}

pub fn set_target_score(conn: &Connection, score: u8) -> Result<()> {
  set_setting(conn, "target_score", &score.clamp(1, MAX_SCORE).to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  #[test]
  fn test_defaults() {
    let env = TestEnv::new().unwrap();
    assert_eq!(get_display_name(&env.conn).unwrap(), DEFAULT_DISPLAY_NAME);
    assert_eq!(get_target_score(&env.conn).unwrap(), DEFAULT_TARGET_SCORE);
    assert_eq!(get_setting(&env.conn, "missing").unwrap(), None);
  }

  #[test]
  fn test_display_name_trimmed_and_blank_resets() {
    let env = TestEnv::new().unwrap();
    set_display_name(&env.conn, "  Wei  ").unwrap();
    assert_eq!(get_display_name(&env.conn).unwrap(), "Wei");
    set_display_name(&env.conn, "   ").unwrap();
    assert_eq!(get_display_name(&env.conn).unwrap(), DEFAULT_DISPLAY_NAME);
    set_display_name(&env.conn, &"x".repeat(100)).unwrap();
    assert_eq!(get_display_name(&env.conn).unwrap().len(), 40);
  }

  #[test]
  fn test_target_score_clamped() {
    let env = TestEnv::new().unwrap();
    set_target_score(&env.conn, 30).unwrap();
    assert_eq!(get_target_score(&env.conn).unwrap(), MAX_SCORE);
    set_target_score(&env.conn, 0).unwrap();
    assert_eq!(get_target_score(&env.conn).unwrap(), 1);
    set_setting(&env.conn, "target_score", "junk").unwrap();
    assert_eq!(get_target_score(&env.conn).unwrap(), DEFAULT_TARGET_SCORE);
  }
}
