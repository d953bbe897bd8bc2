//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env) > default.
//! Scoring constants used by the evaluator live here as well.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;

// ==================== Scoring Configuration ====================

/// Highest CELPIP writing level a submission can be scored at
pub const MAX_SCORE: u8 = 12;

/// Minimum word count for both writing tasks
pub const MIN_WORDS: usize = 150;

/// Maximum word count for both writing tasks
pub const MAX_WORDS: usize = 200;

/// Sentences longer than this are flagged
pub const MAX_SENTENCE_WORDS: usize = 40;

/// A content word used more often than this is flagged as repetitive
pub const MAX_WORD_REPEATS: usize = 5;

/// Number of questions in a daily quiz challenge
pub const DAILY_QUIZ_QUESTIONS: usize = 5;

/// Correct answers needed to complete a daily quiz challenge
pub const DAILY_QUIZ_PASS: usize = 4;

/// Entries shown per task on the leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

/// Attempts shown on the history page
pub const RECENT_ATTEMPTS_LIMIT: i64 = 20;

/// Attempts shown on the dashboard
pub const DASHBOARD_ATTEMPTS: i64 = 5;

/// Questions in a practice quiz
pub const PRACTICE_QUIZ_QUESTIONS: usize = 5;

/// Submissions longer than this are rejected before evaluation
pub const MAX_SUBMISSION_CHARS: usize = 10_000;

/// Upper bound on text sent to text-to-speech
pub const TTS_MAX_CHARS: usize = 1000;

// ==================== config.toml structure ====================

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<ServerSection>,
    database: Option<DatabaseSection>,
    llm: Option<LlmSection>,
    tts: Option<TtsSection>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LlmSection {
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TtsSection {
    program: Option<String>,
    args: Option<Vec<String>>,
    timeout_secs: Option<u64>,
    cache_dir: Option<String>,
}

// ==================== Resolved configuration ====================

/// LLM settings. `api_key` is only ever read from the environment.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// External text-to-speech program settings
#[derive(Debug, Clone)]
pub struct TtsSettings {
    pub program: String,
    /// Arguments passed to the program; `{output}` is replaced with the target file
    pub args: Vec<String>,
    pub timeout: Duration,
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_addr: String,
    pub server_port: u16,
    pub database_path: PathBuf,
    pub llm: LlmSettings,
    pub tts: TtsSettings,
}

pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TTS_PROGRAM: &str = "espeak-ng";
pub const DEFAULT_TTS_TIMEOUT_SECS: u64 = 20;

fn default_tts_args() -> Vec<String> {
    vec!["-w".to_string(), "{output}".to_string(), "--stdin".to_string()]
}

impl AppConfig {
    /// Load configuration from `config.toml` in the working directory and the environment
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration using an explicit config file path (missing file = defaults)
    pub fn load_from(config_path: &Path) -> Self {
        let file = match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str::<FileConfig>(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid {}: {}", config_path.display(), e);
                    FileConfig::default()
                }
            },
            Err(_) => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let server = file.server;
        let server_addr = server
            .as_ref()
            .and_then(|s| s.addr.clone())
            .or_else(|| env("SERVER_ADDR"))
            .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());
        let server_port = server
            .as_ref()
            .and_then(|s| s.port)
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(DEFAULT_SERVER_PORT);

        let database_path = file
            .database
            .and_then(|d| d.path)
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(paths::db_path()));

        let llm_file = file.llm;
        let llm = LlmSettings {
            api_key: env("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            model: llm_file
                .as_ref()
                .and_then(|l| l.model.clone())
                .or_else(|| env("OPENAI_MODEL"))
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            base_url: llm_file
                .as_ref()
                .and_then(|l| l.base_url.clone())
                .or_else(|| env("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                llm_file
                    .as_ref()
                    .and_then(|l| l.timeout_secs)
                    .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),
            ),
        };

        let tts_file = file.tts;
        let tts = TtsSettings {
            program: tts_file
                .as_ref()
                .and_then(|t| t.program.clone())
                .or_else(|| env("TTS_PROGRAM"))
                .unwrap_or_else(|| DEFAULT_TTS_PROGRAM.to_string()),
            args: tts_file
                .as_ref()
                .and_then(|t| t.args.clone())
                .unwrap_or_else(default_tts_args),
            timeout: Duration::from_secs(
                tts_file
                    .as_ref()
                    .and_then(|t| t.timeout_secs)
                    .unwrap_or(DEFAULT_TTS_TIMEOUT_SECS),
            ),
            cache_dir: tts_file
                .and_then(|t| t.cache_dir)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(paths::tts_cache_dir())),
        };

        Self {
            server_addr,
            server_port,
            database_path,
            llm,
            tts,
        }
    }

    /// Full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}
