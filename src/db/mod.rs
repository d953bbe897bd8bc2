pub mod attempts;
pub mod progress;
pub mod schema;
pub mod settings;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// Re-export all public items from submodules
pub use attempts::*;
pub use progress::*;
pub use schema::run_migrations;
pub use settings::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Database unavailable")
  }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
    DbLockError
  })
}

/// Open (creating if needed) the learner database and bring its schema up to date
pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    if let Err(e) = std::fs::create_dir_all(parent) {
      tracing::warn!("Could not create {}: {}", parent.display(), e);
    }
  }

  // Create backup before migrations if database exists
  if path.exists() {
    let backup_path = path.with_extension("db.backup");
    if let Err(e) = std::fs::copy(path, &backup_path) {
      tracing::warn!("Could not create database backup: {}", e);
    }
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_init_db_creates_dirs_and_backup() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("celpip.db");

    let pool = init_db(&path).unwrap();
    {
      let conn = try_lock(&pool).unwrap();
      set_display_name(&conn, "Ana").unwrap();
    }
    drop(pool);
    assert!(path.exists());
    assert!(!path.with_extension("db.backup").exists());

    let pool = init_db(&path).unwrap();
    assert!(path.with_extension("db.backup").exists());
    let conn = try_lock(&pool).unwrap();
    assert_eq!(get_display_name(&conn).unwrap(), "Ana");
  }

  #[test]
  fn test_log_on_error() {
    let ok: std::result::Result<u32, String> = Ok(3);
    assert_eq!(ok.log_warn("ctx"), Some(3));
    let err: std::result::Result<u32, String> = Err("boom".into());
    assert_eq!(err.log_warn_default("ctx"), 0);
  }
}
