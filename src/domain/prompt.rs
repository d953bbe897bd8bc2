use serde::{Deserialize, Serialize};

/// Register an email is expected to be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
  #[default]
  Formal,
  SemiFormal,
  Informal,
}

impl Tone {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Formal => "formal",
      Self::SemiFormal => "semi_formal",
      Self::Informal => "informal",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "formal" => Some(Self::Formal),
      "semi_formal" | "semi-formal" | "semiformal" => Some(Self::SemiFormal),
      "informal" => Some(Self::Informal),
      _ => None,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Formal => "Formal",
      Self::SemiFormal => "Semi-formal",
      Self::Informal => "Informal",
    }
  }

  /// Whether contractions count against the writer
  pub fn avoids_contractions(&self) -> bool {
    !matches!(self, Self::Informal)
  }
}

/// One bullet point the email must address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPoint {
  pub text: String,
  /// Any of these (prefix-matched, case-insensitive) counts as covering the point
  #[serde(default)]
  pub keywords: Vec<String>,
}

/// Task 1 email prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task1Prompt {
  pub id: String,
  pub title: String,
  pub scenario: String,
  #[serde(default)]
  pub tone: Tone,
  pub points: Vec<PromptPoint>,
}

/// One of the two choices offered in a survey question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyOption {
  pub label: String,
  pub summary: String,
  #[serde(default)]
  pub keywords: Vec<String>,
}

/// Task 2 survey prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task2Prompt {
  pub id: String,
  pub title: String,
  pub question: String,
  pub options: [SurveyOption; 2],
}
