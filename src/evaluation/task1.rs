//! Task 1: writing an email.

use super::common::{check_contractions, check_word_count, polish_checks};
use super::scoring::build_feedback;
use super::text::{
  contains_any_phrase, fragment_stream, mentions_keyword, split_sentences, split_words,
  starts_with_any_phrase, tokenize, TextStats,
};
use crate::domain::{FeedbackItem, Severity, Task1Prompt, WritingFeedback, WritingTask};

static GREETINGS: &[&str] = &[
  "dear",
  "hello",
  "hi",
  "hey",
  "good morning",
  "good afternoon",
  "good evening",
  "to whom it may concern",
  "greetings",
];

static PURPOSE_PHRASES: &[&str] = &[
  "i am writing",
  "i'm writing",
  "i would like to",
  "i'd like to",
  "i want to",
  "the reason",
  "this is regarding",
  "i am contacting",
  "i am reaching out",
  "i'm reaching out",
];

static SEQUENCE_CONNECTORS: &[&str] = &[
  "first",
  "firstly",
  "second",
  "secondly",
  "third",
  "thirdly",
  "finally",
  "lastly",
  "in addition",
  "additionally",
  "furthermore",
  "moreover",
  "also",
  "besides",
];

static CLOSINGS: &[&str] = &[
  "sincerely",
  "yours sincerely",
  "yours truly",
  "yours faithfully",
  "best regards",
  "kind regards",
  "warm regards",
  "regards",
  "best wishes",
  "best",
  "thanks",
  "thank you",
  "cheers",
  "take care",
];

/// Paragraphs (greeting and sign-off blocks included) required for a well-organised email
const MIN_PARAGRAPHS: usize = 3;

/// Lines searched (from the end) for a sign-off
const CLOSING_SEARCH_LINES: usize = 3;

/// Run every Task 1 check against an email, in a fixed order
pub fn evaluate_task1_email(text: &str, prompt: Option<&Task1Prompt>) -> Vec<FeedbackItem> {
  let stats = tokenize(text);
  evaluate_stats(&stats, prompt)
}

/// Evaluate an email and aggregate the result into a score
pub fn generate_task1_feedback(text: &str, prompt: Option<&Task1Prompt>) -> WritingFeedback {
  let stats = tokenize(text);
  let items = evaluate_stats(&stats, prompt);
  build_feedback(WritingTask::Task1, &stats, items)
}

fn evaluate_stats(stats: &TextStats, prompt: Option<&Task1Prompt>) -> Vec<FeedbackItem> {
  let stream = stats.word_stream();
  let tone = prompt.map(|p| p.tone).unwrap_or_default();
  let closing_index = find_closing_line(stats);

  let mut items = vec![
    check_word_count(stats),
    check_greeting(stats),
    check_purpose(stats),
    check_paragraphs(stats),
    FeedbackItem::check(
      "sequence_connectors",
      contains_any_phrase(&stream, SEQUENCE_CONNECTORS),
      Severity::Important,
      "Sequence connectors guide the reader through your points.",
      "Link your points with connectors such as \"First\", \"In addition\" or \"Finally\".",
    ),
    FeedbackItem::check(
      "closing",
      closing_index.is_some(),
      Severity::Important,
      "The email ends with a proper sign-off.",
      "End with a sign-off such as \"Sincerely\" or \"Best regards\".",
    ),
    FeedbackItem::check(
      "signature",
      closing_index.is_some_and(|i| i + 1 < stats.lines.len()),
      Severity::Polish,
      "Your name follows the sign-off.",
      "Sign your name on the line after the sign-off.",
    ),
  ];

  if tone.avoids_contractions() {
    items.push(check_contractions(stats));
  }

  if let Some(prompt) = prompt {
    for (n, point) in prompt.points.iter().enumerate() {
      let covered = point
        .keywords
        .iter()
        .any(|k| mentions_keyword(stats, &stream, k));
      items.push(FeedbackItem::check(
        format!("point_{}", n + 1),
        covered,
        Severity::Blocker,
        format!("Covers: {}", point.text),
        format!("Missing task point: {}", point.text),
      ));
    }
  }

  items.extend(polish_checks(stats));
  items
}

fn first_line(stats: &TextStats) -> Option<&str> {
  stats.lines.first().map(String::as_str)
}

fn text_after_first_line(text: &str) -> &str {
  let trimmed = text.trim_start();
  match trimmed.find('\n') {
    Some(pos) => &trimmed[pos + 1..],
    None => "",
  }
}

fn is_greeting_line(line: &str) -> bool {
  starts_with_any_phrase(line, GREETINGS)
}

fn check_greeting(stats: &TextStats) -> FeedbackItem {
  FeedbackItem::check(
    "greeting",
    first_line(stats).is_some_and(is_greeting_line),
    Severity::Important,
    "Opens with a salutation.",
    "Open with a salutation such as \"Dear Ms. Chen,\".",
  )
}

/// One of the first two sentences after the greeting should state why you are writing
fn check_purpose(stats: &TextStats) -> FeedbackItem {
  // A greeting on its own line is skipped; an inline greeting stays part of sentence one
  let body = match first_line(stats) {
    Some(line) if is_greeting_line(line) && is_short_line(line) => text_after_first_line(&stats.normalized),
    _ => stats.normalized.as_str(),
  };
  let opening = split_sentences(body)
    .iter()
    .take(2)
    .any(|s| contains_any_phrase(&fragment_stream(s), PURPOSE_PHRASES));

  FeedbackItem::check(
    "purpose",
    opening,
    Severity::Important,
    "States the purpose of the email up front.",
    "State your purpose in the first sentence, e.g. \"I am writing to ...\".",
  )
}

/// Greeting and sign-off lines are short ("Best regards," / "Dear Ms. Chen,"), not full sentences
fn is_short_line(line: &str) -> bool {
  split_words(line).len() <= 6
}

fn check_paragraphs(stats: &TextStats) -> FeedbackItem {
  let count = stats.paragraphs.len();
  FeedbackItem::check(
    "paragraphs",
    count >= MIN_PARAGRAPHS,
    Severity::Important,
    format!("{} paragraphs give the email a clear structure.", count),
    format!(
      "Only {} paragraph(s). Use at least {} separated by blank lines: purpose, details, and request or closing.",
      count, MIN_PARAGRAPHS
    ),
  )
}

/// Index (into `stats.lines`) of the sign-off line among the last few lines
fn find_closing_line(stats: &TextStats) -> Option<usize> {
  let start = stats.lines.len().saturating_sub(CLOSING_SEARCH_LINES);
  (start..stats.lines.len())
    .find(|&i| starts_with_any_phrase(&stats.lines[i], CLOSINGS) && is_short_line(&stats.lines[i]))
}
