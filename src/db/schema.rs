use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS attempts (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      task TEXT NOT NULL,
      prompt_id TEXT,
      prompt_title TEXT,
      text TEXT NOT NULL,
      word_count INTEGER NOT NULL,
      score INTEGER NOT NULL,
      feedback_json TEXT NOT NULL,
      display_name TEXT NOT NULL DEFAULT 'Learner',
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS quiz_results (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      correct INTEGER NOT NULL,
      total INTEGER NOT NULL,
      is_daily INTEGER NOT NULL DEFAULT 0,
      completed_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS achievements (
      id TEXT PRIMARY KEY,
      unlocked_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS activity_days (
      day TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS daily_challenges (
      day TEXT PRIMARY KEY,
      kind TEXT NOT NULL,
      completed_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS settings (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL
    );

    -- Default settings
    INSERT OR IGNORE INTO settings (key, value) VALUES ('display_name', 'Learner');
    INSERT OR IGNORE INTO settings (key, value) VALUES ('target_score', '9');

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_attempts_task ON attempts(task);
    CREATE INDEX IF NOT EXISTS idx_attempts_created_at ON attempts(created_at);
    CREATE INDEX IF NOT EXISTS idx_attempts_task_score ON attempts(task, score);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: leaderboard name captured per attempt
  add_column_if_missing(conn, "attempts", "display_name", "TEXT NOT NULL DEFAULT 'Learner'")?;

  // Migration: daily quiz flag
  add_column_if_missing(conn, "quiz_results", "is_daily", "INTEGER NOT NULL DEFAULT 0")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}
