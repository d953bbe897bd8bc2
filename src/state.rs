//! Application state shared by all handlers.

use std::sync::Arc;

use crate::ai::{LlmClient, TtsEngine};
use crate::config::TtsSettings;
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    /// Learner database (history, achievements, streaks, settings)
    pub db: DbPool,

    /// Present only when an OpenAI key is configured
    pub llm: Option<Arc<LlmClient>>,

    pub tts: Arc<TtsEngine>,
}

impl AppState {
    pub fn new(db: DbPool, llm: Option<LlmClient>, tts: TtsSettings) -> Self {
        Self {
            db,
            llm: llm.map(Arc::new),
            tts: Arc::new(TtsEngine::new(tts)),
        }
    }

    pub fn llm_enabled(&self) -> bool {
        self.llm.is_some()
    }
}
