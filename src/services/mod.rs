//! Services layer for operations that span several tables.

pub mod recorder;

pub use recorder::{record_quiz, record_submission, unlock_new_achievements, RecordOutcome, Submission};
