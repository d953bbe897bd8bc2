//! Writing prompt bank for both tasks.

use rand::prelude::IndexedRandom;
use std::sync::LazyLock;

use crate::domain::{Task1Prompt, Task2Prompt};

static TASK1_PROMPTS: LazyLock<Vec<Task1Prompt>> =
  LazyLock::new(|| super::parse_embedded("task1_prompts", include_str!("data/task1_prompts.json")));

static TASK2_PROMPTS: LazyLock<Vec<Task2Prompt>> =
  LazyLock::new(|| super::parse_embedded("task2_prompts", include_str!("data/task2_prompts.json")));

pub fn task1_prompts() -> &'static [Task1Prompt] {
  &TASK1_PROMPTS
}

pub fn task2_prompts() -> &'static [Task2Prompt] {
  &TASK2_PROMPTS
}

pub fn task1_prompt(id: &str) -> Option<&'static Task1Prompt> {
  TASK1_PROMPTS.iter().find(|p| p.id == id)
}

pub fn task2_prompt(id: &str) -> Option<&'static Task2Prompt> {
  TASK2_PROMPTS.iter().find(|p| p.id == id)
}

pub fn random_task1_prompt() -> Option<&'static Task1Prompt> {
  TASK1_PROMPTS.choose(&mut rand::rng())
}

pub fn random_task2_prompt() -> Option<&'static Task2Prompt> {
  TASK2_PROMPTS.choose(&mut rand::rng())
}
