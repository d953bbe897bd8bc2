pub mod attempt;
pub mod feedback;
pub mod prompt;

pub use attempt::Attempt;
pub use feedback::{FeedbackItem, Severity, WritingFeedback, WritingTask};
pub use prompt::{PromptPoint, SurveyOption, Task1Prompt, Task2Prompt, Tone};
