//! CSF (Task 1) and PRE (Task 2) writing guides.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static GUIDES: LazyLock<Vec<Guide>> =
  LazyLock::new(|| super::parse_embedded("guides", include_str!("data/guides.json")));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideSection {
  pub title: String,
  pub content: String,
  #[serde(default)]
  pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guide {
  /// Matches the task id ("task1", "task2")
  pub id: String,
  pub title: String,
  pub mnemonic: String,
  pub summary: String,
  pub sections: Vec<GuideSection>,
  #[serde(default)]
  pub tips: Vec<String>,
}

pub fn guides() -> &'static [Guide] {
  &GUIDES
}

pub fn guide(id: &str) -> Option<&'static Guide> {
  GUIDES.iter().find(|g| g.id == id)
}
