//! LLM and text-to-speech integration.

pub mod llm;
pub mod tts;

pub use llm::{LlmClient, LlmError};
pub use tts::{TtsEngine, TtsError};
