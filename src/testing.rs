//! Test utilities for database and application setup.
//!
//! Provides helpers that reuse the authoritative schema initialization,
//! eliminating schema duplication in test code.

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::config::TtsSettings;
use crate::state::AppState;

/// Test environment with a migrated learner database in a temporary directory.
///
/// The directory (and the database file) is removed when dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// celpip.db connection with full schema (all migrations)
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("celpip.db"))?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Application state over this environment's database, with no LLM configured
    /// and `sh` standing in for the speech synthesizer.
    pub fn into_app_state(self) -> (TempDir, AppState) {
        let tts = TtsSettings {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "cat > /dev/null; printf 'RIFFtest' > \"$0\"".to_string(),
                "{output}".to_string(),
            ],
            timeout: std::time::Duration::from_secs(5),
            cache_dir: self.temp.path().join("tts"),
        };
        let state = AppState::new(Arc::new(Mutex::new(self.conn)), None, tts);
        (self.temp, state)
    }
}
