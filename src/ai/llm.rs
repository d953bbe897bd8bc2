//! OpenAI-compatible chat completions client.
//!
//! Used to generate fresh writing prompts and to add free-form coaching on top
//! of the rule-based evaluator. The client only exists when an API key is set.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::LlmSettings;
use crate::domain::{PromptPoint, SurveyOption, Task1Prompt, Task2Prompt, Tone, WritingFeedback, WritingTask};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
  #[error("LLM request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("LLM returned status {status}: {body}")]
  Status { status: u16, body: String },

  #[error("LLM returned no content")]
  EmptyResponse,

  #[error("LLM returned an unusable prompt: {0}")]
  InvalidPrompt(String),
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")]
  kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage<'a>>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
  message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
  content: Option<String>,
}

// Shapes the model is asked to produce

#[derive(Deserialize)]
struct GeneratedTask1 {
  title: String,
  scenario: String,
  #[serde(default)]
  tone: Option<String>,
  points: Vec<GeneratedPoint>,
}

#[derive(Deserialize)]
struct GeneratedPoint {
  text: String,
  #[serde(default)]
  keywords: Vec<String>,
}

#[derive(Deserialize)]
struct GeneratedTask2 {
  title: String,
  question: String,
  options: Vec<GeneratedOption>,
}

#[derive(Deserialize)]
struct GeneratedOption {
  #[serde(default)]
  label: Option<String>,
  summary: String,
  #[serde(default)]
  keywords: Vec<String>,
}

const TASK1_SYSTEM_PROMPT: &str = r#"You write CELPIP Writing Task 1 prompts (writing an email, 150-200 words, 27 minutes).
Reply with a single JSON object:
{"title": string, "scenario": string, "tone": "formal" | "semi_formal" | "informal",
 "points": [{"text": string, "keywords": [string]}]}
Give exactly three points. Keywords are 3-6 lowercase words or word stems a response covering the point would contain."#;

const TASK2_SYSTEM_PROMPT: &str = r#"You write CELPIP Writing Task 2 prompts (responding to survey questions, 150-200 words, 26 minutes).
Reply with a single JSON object:
{"title": string, "question": string,
 "options": [{"label": "Option A", "summary": string, "keywords": [string]},
             {"label": "Option B", "summary": string, "keywords": [string]}]}
Keywords are 1-3 lowercase words that name the option."#;

const COACH_SYSTEM_PROMPT: &str = "You are a CELPIP writing coach. An automatic checker has already scored the \
response; do not repeat its findings. Comment on vocabulary range, tone, coherence and task fulfilment in at \
most three short paragraphs, and finish with one rewritten sentence from the response that shows a stronger \
version. Plain text only.";

/// Maximum number of task points accepted from a generated Task 1 prompt
const MAX_POINTS: usize = 5;

pub struct LlmClient {
  http: reqwest::Client,
  api_key: String,
  model: String,
  base_url: String,
}

impl LlmClient {
  /// Build a client, or `None` when no API key is configured
  pub fn from_settings(settings: &LlmSettings) -> Result<Option<Self>, LlmError> {
    let Some(api_key) = settings.api_key.clone() else {
      return Ok(None);
    };
    let http = reqwest::Client::builder().timeout(settings.timeout).build()?;
    Ok(Some(Self {
      http,
      api_key,
      model: settings.model.clone(),
      base_url: settings.base_url.trim_end_matches('/').to_string(),
    }))
  }

  pub fn model(&self) -> &str {
    &self.model
  }

  async fn chat(&self, system: &str, user: &str, json: bool) -> Result<String, LlmError> {
    let request = ChatRequest {
      model: &self.model,
      messages: vec![
        ChatMessage {
          role: "system",
          content: system,
        },
        ChatMessage {
          role: "user",
          content: user,
        },
      ],
      temperature: 0.8,
      response_format: json.then_some(ResponseFormat { kind: "json_object" }),
    };

    tracing::debug!("LLM request to {} ({} chars)", self.model, user.len());
    let response = self
      .http
      .post(format!("{}/chat/completions", self.base_url))
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(LlmError::Status {
        status: status.as_u16(),
        body: body.chars().take(300).collect(),
      });
    }

    let parsed: ChatResponse = response.json().await?;
    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .map(|c| c.trim().to_string())
      .filter(|c| !c.is_empty())
      .ok_or(LlmError::EmptyResponse)
  }

  pub async fn generate_task1_prompt(&self, topic_hint: Option<&str>) -> Result<Task1Prompt, LlmError> {
    let user = match topic_hint.map(str::trim).filter(|t| !t.is_empty()) {
      Some(topic) => format!("Write a new prompt about: {}", topic),
      None => "Write a new prompt about an everyday situation in Canada.".to_string(),
    };
    let content = self.chat(TASK1_SYSTEM_PROMPT, &user, true).await?;
    parse_task1_prompt(&content)
  }

  pub async fn generate_task2_prompt(&self, topic_hint: Option<&str>) -> Result<Task2Prompt, LlmError> {
    let user = match topic_hint.map(str::trim).filter(|t| !t.is_empty()) {
      Some(topic) => format!("Write a new survey about: {}", topic),
      None => "Write a new survey about a community or workplace decision.".to_string(),
    };
    let content = self.chat(TASK2_SYSTEM_PROMPT, &user, true).await?;
    parse_task2_prompt(&content)
  }

  /// Free-form coaching that complements the rule findings
  pub async fn coach_feedback(
    &self,
    task: WritingTask,
    text: &str,
    rules: &WritingFeedback,
  ) -> Result<String, LlmError> {
    let user = coaching_request(task, text, rules);
    self.chat(COACH_SYSTEM_PROMPT, &user, false).await
  }
}

/// User message for a coaching request: task, rule results, then the response itself
pub fn coaching_request(task: WritingTask, text: &str, rules: &WritingFeedback) -> String {
  let mut message = format!(
    "{}\nChecker score: {}/{}\n",
    task.title(),
    rules.score,
    rules.max_score
  );
  for item in &rules.items {
    let mark = if item.passed { "PASS" } else { "FAIL" };
    message.push_str(&format!("- [{}] {}: {}\n", mark, item.id, item.message));
  }
  message.push_str("\nResponse:\n");
  message.push_str(text);
  message
}

/// Models sometimes wrap JSON in a markdown fence
fn strip_code_fence(content: &str) -> &str {
  let trimmed = content.trim();
  let Some(rest) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  let rest = rest.strip_prefix("json").unwrap_or(rest);
  rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Stable id for generated content so the same prompt keeps the same id
fn generated_id(prefix: &str, content: &str) -> String {
  let digest = Sha256::digest(content.as_bytes());
  format!("{}{}", prefix, &hex::encode(digest)[..10])
}

fn clean_keywords(keywords: Vec<String>) -> Vec<String> {
  keywords
    .into_iter()
    .map(|k| k.trim().to_lowercase())
    .filter(|k| !k.is_empty())
    .collect()
}

pub fn parse_task1_prompt(content: &str) -> Result<Task1Prompt, LlmError> {
  let json = strip_code_fence(content);
  let generated: GeneratedTask1 =
    serde_json::from_str(json).map_err(|e| LlmError::InvalidPrompt(e.to_string()))?;

  if generated.title.trim().is_empty() || generated.scenario.trim().is_empty() {
    return Err(LlmError::InvalidPrompt("missing title or scenario".into()));
  }
  let points: Vec<PromptPoint> = generated
    .points
    .into_iter()
    .filter(|p| !p.text.trim().is_empty())
    .take(MAX_POINTS)
    .map(|p| PromptPoint {
      text: p.text.trim().to_string(),
      keywords: clean_keywords(p.keywords),
    })
    .collect();
  if points.is_empty() {
    return Err(LlmError::InvalidPrompt("no task points".into()));
  }

  let tone = generated
    .tone
    .as_deref()
    .and_then(|t| Tone::from_str(&t.trim().to_lowercase()))
    .unwrap_or_default();

  Ok(Task1Prompt {
    id: generated_id("ai-t1-", json),
    title: generated.title.trim().to_string(),
    scenario: generated.scenario.trim().to_string(),
    tone,
    points,
  })
}

pub fn parse_task2_prompt(content: &str) -> Result<Task2Prompt, LlmError> {
  let json = strip_code_fence(content);
  let generated: GeneratedTask2 =
    serde_json::from_str(json).map_err(|e| LlmError::InvalidPrompt(e.to_string()))?;

  if generated.question.trim().is_empty() {
    return Err(LlmError::InvalidPrompt("missing question".into()));
  }
  let mut options = generated.options.into_iter();
  let (Some(a), Some(b)) = (options.next(), options.next()) else {
    return Err(LlmError::InvalidPrompt("a survey needs two options".into()));
  };

  let to_option = |o: GeneratedOption, default_label: &str| SurveyOption {
    label: o
      .label
      .map(|l| l.trim().to_string())
      .filter(|l| !l.is_empty())
      .unwrap_or_else(|| default_label.to_string()),
    summary: o.summary.trim().to_string(),
    keywords: clean_keywords(o.keywords),
  };

  Ok(Task2Prompt {
    id: generated_id("ai-t2-", json),
    title: generated.title.trim().to_string(),
    question: generated.question.trim().to_string(),
    options: [to_option(a, "Option A"), to_option(b, "Option B")],
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{FeedbackItem, Severity};
  use std::time::Duration;

  fn settings(key: Option<&str>) -> LlmSettings {
    LlmSettings {
      api_key: key.map(String::from),
      model: "gpt-4o-mini".into(),
      base_url: "https://api.example.com/v1/".into(),
      timeout: Duration::from_secs(5),
    }
  }

  #[test]
  fn test_no_key_no_client() {
    assert!(LlmClient::from_settings(&settings(None)).unwrap().is_none());
  }

  #[test]
  fn test_client_trims_base_url() {
    let client = LlmClient::from_settings(&settings(Some("sk-test"))).unwrap().unwrap();
    assert_eq!(client.base_url, "https://api.example.com/v1");
    assert_eq!(client.model(), "gpt-4o-mini");
  }

  #[test]
  fn test_parse_task1_prompt() {
    let json = r#"{
      "title": "Broken heater",
      "scenario": "The heater in your apartment stopped working.",
      "tone": "Formal",
      "points": [
        {"text": "Describe the problem", "keywords": ["Heater", " cold "]},
        {"text": "Explain how long it has lasted", "keywords": ["week", "days"]},
        {"text": "Ask for a repair date", "keywords": ["repair", "fix"]}
      ]
    }"#;
    let prompt = parse_task1_prompt(json).unwrap();
    assert!(prompt.id.starts_with("ai-t1-"));
    assert_eq!(prompt.tone, Tone::Formal);
    assert_eq!(prompt.points.len(), 3);
    assert_eq!(prompt.points[0].keywords, vec!["heater", "cold"]);
    // Same content, same id
    assert_eq!(parse_task1_prompt(json).unwrap().id, prompt.id);
  }

  #[test]
  fn test_parse_task1_prompt_in_code_fence_with_unknown_tone() {
    let content = "```json\n{\"title\": \"T\", \"scenario\": \"S\", \"tone\": \"casual\", \"points\": [{\"text\": \"P\"}]}\n```";
    let prompt = parse_task1_prompt(content).unwrap();
    assert_eq!(prompt.tone, Tone::Formal);
    assert!(prompt.points[0].keywords.is_empty());
  }

  #[test]
  fn test_parse_task1_prompt_rejects_empty_points() {
    let json = r#"{"title": "T", "scenario": "S", "points": [{"text": "  "}]}"#;
    assert!(matches!(parse_task1_prompt(json), Err(LlmError::InvalidPrompt(_))));
    assert!(matches!(parse_task1_prompt("not json"), Err(LlmError::InvalidPrompt(_))));
  }

  #[test]
  fn test_parse_task2_prompt() {
    let json = r#"{
      "title": "Staff lunch",
      "question": "How should the company spend the team budget?",
      "options": [
        {"summary": "A monthly team lunch", "keywords": ["lunch"]},
        {"label": "Option B", "summary": "New ergonomic chairs", "keywords": ["chair"]}
      ]
    }"#;
    let prompt = parse_task2_prompt(json).unwrap();
    assert!(prompt.id.starts_with("ai-t2-"));
    assert_eq!(prompt.options[0].label, "Option A");
    assert_eq!(prompt.options[1].keywords, vec!["chair"]);
  }

  #[test]
  fn test_parse_task2_prompt_needs_two_options() {
    let json = r#"{"title": "T", "question": "Q?", "options": [{"summary": "only one"}]}"#;
    assert!(matches!(parse_task2_prompt(json), Err(LlmError::InvalidPrompt(_))));
  }

  #[test]
  fn test_coaching_request_lists_rule_results() {
    let rules = WritingFeedback {
      task: WritingTask::Task1,
      items: vec![
        FeedbackItem::pass("greeting", Severity::Important, "Opens with a salutation."),
        FeedbackItem::fail("closing", Severity::Important, "Add a sign-off."),
      ],
      score: 10,
      max_score: 12,
      word_count: 3,
      sentence_count: 1,
      paragraph_count: 1,
      level_summary: String::new(),
    };
    let message = coaching_request(WritingTask::Task1, "Dear Sam, hello.", &rules);
    assert!(message.starts_with("Task 1: Writing an Email"));
    assert!(message.contains("Checker score: 10/12"));
    assert!(message.contains("- [FAIL] closing: Add a sign-off."));
    assert!(message.ends_with("Dear Sam, hello."));
  }
}
