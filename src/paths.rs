//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! This allows running isolated instances side by side:
//! ```bash
//! DATA_DIR=data/demo PORT=3001 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path (history, achievements, streaks, settings)
pub fn db_path() -> String {
    format!("{}/celpip.db", data_dir())
}

/// Cache directory for synthesized speech
pub fn tts_cache_dir() -> String {
    format!("{}/tts", data_dir())
}

/// Static assets served under /static (not under DATA_DIR)
pub const STATIC_DIR: &str = "static";
