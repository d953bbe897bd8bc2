//! JSON API: stateless evaluation, prompt generation, coaching, speech and progress.

use axum::{
  extract::State,
  http::header,
  response::{IntoResponse, Response},
  Json,
};
use serde::{Deserialize, Serialize};

use crate::content;
use crate::db;
use crate::domain::{Task1Prompt, Task2Prompt, WritingFeedback, WritingTask};
use crate::error::{ApiResult, AppError};
use crate::evaluation::evaluate_submission;
use crate::progress::{self, achievement_views, AchievementView, DailyChallenge, ProgressSnapshot, Streak};
use crate::state::AppState;

use super::writing::submission_error;

#[derive(Deserialize)]
pub struct EvaluateRequest {
  pub task: WritingTask,
  pub text: String,
  #[serde(default)]
  pub prompt_id: Option<String>,
}

impl EvaluateRequest {
  fn evaluate(&self) -> ApiResult<WritingFeedback> {
    if let Some(error) = submission_error(&self.text) {
      return Err(AppError::BadRequest(error));
    }
    let prompt_id = self.prompt_id.as_deref().filter(|id| !id.is_empty());
    Ok(evaluate_submission(self.task, &self.text, prompt_id))
  }
}

/// Rule-based feedback without saving anything
pub async fn evaluate(Json(req): Json<EvaluateRequest>) -> ApiResult<Json<WritingFeedback>> {
  Ok(Json(req.evaluate()?))
}

#[derive(Deserialize)]
pub struct GenerateRequest {
  pub task: WritingTask,
  #[serde(default)]
  pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeneratedPrompt {
  Task1(Task1Prompt),
  Task2(Task2Prompt),
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
  /// "llm" or "static"
  pub source: &'static str,
  pub task: WritingTask,
  pub prompt: GeneratedPrompt,
}

fn static_prompt(task: WritingTask) -> ApiResult<GeneratedPrompt> {
  let prompt = match task {
    WritingTask::Task1 => content::random_task1_prompt().cloned().map(GeneratedPrompt::Task1),
    WritingTask::Task2 => content::random_task2_prompt().cloned().map(GeneratedPrompt::Task2),
  };
  prompt.ok_or_else(|| AppError::NotFound("No built-in prompts available".to_string()))
}

/// A fresh prompt from the LLM, or a built-in one when the LLM is absent or fails
pub async fn generate(State(state): State<AppState>, Json(req): Json<GenerateRequest>) -> ApiResult<Json<GenerateResponse>> {
  let topic = req.topic.as_deref();
  if let Some(llm) = state.llm.clone() {
    let generated = match req.task {
      WritingTask::Task1 => llm.generate_task1_prompt(topic).await.map(GeneratedPrompt::Task1),
      WritingTask::Task2 => llm.generate_task2_prompt(topic).await.map(GeneratedPrompt::Task2),
    };
    match generated {
      Ok(prompt) => {
        return Ok(Json(GenerateResponse {
          source: "llm",
          task: req.task,
          prompt,
        }));
      }
      Err(e) => tracing::warn!("Prompt generation failed, using a built-in prompt: {}", e),
    }
  }

  Ok(Json(GenerateResponse {
    source: "static",
    task: req.task,
    prompt: static_prompt(req.task)?,
  }))
}

#[derive(Debug, Serialize)]
pub struct CoachResponse {
  pub feedback: String,
  pub rules: WritingFeedback,
}

/// LLM coaching on top of the rule findings
pub async fn coach(State(state): State<AppState>, Json(req): Json<EvaluateRequest>) -> ApiResult<Json<CoachResponse>> {
  let Some(llm) = state.llm.clone() else {
    return Err(AppError::Unavailable("AI coaching is not configured".to_string()));
  };
  let rules = req.evaluate()?;
  let feedback = llm.coach_feedback(req.task, &req.text, &rules).await?;
  Ok(Json(CoachResponse { feedback, rules }))
}

#[derive(Deserialize)]
pub struct TtsRequest {
  pub text: String,
}

/// WAV audio for a model answer or prompt
pub async fn tts(State(state): State<AppState>, Json(req): Json<TtsRequest>) -> ApiResult<Response> {
  let audio = state.tts.synthesize(&req.text).await?;
  Ok(([(header::CONTENT_TYPE, "audio/wav")], audio).into_response())
}

#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
  #[serde(flatten)]
  pub challenge: DailyChallenge,
  pub completed: bool,
}

pub async fn challenge_today(State(state): State<AppState>) -> ApiResult<Json<ChallengeResponse>> {
  let today = progress::today();
  let conn = db::try_lock(&state.db)?;
  Ok(Json(ChallengeResponse {
    challenge: progress::daily_challenge(today),
    completed: db::is_challenge_completed(&conn, today)?,
  }))
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
  pub snapshot: ProgressSnapshot,
  pub streak: Streak,
  pub achievements: Vec<AchievementView>,
}

pub async fn progress(State(state): State<AppState>) -> ApiResult<Json<ProgressResponse>> {
  let conn = db::try_lock(&state.db)?;
  let (snapshot, streak) = db::get_progress_snapshot(&conn, progress::today())?;
  let unlocked = db::get_unlocked_achievements(&conn)?;
  Ok(Json(ProgressResponse {
    snapshot,
    streak,
    achievements: achievement_views(&unlocked),
  }))
}
