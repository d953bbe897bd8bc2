//! Task 2: responding to survey questions.
//!
//! A survey response picks one of two options and defends it with the PRE
//! pattern (Point, Reason, Example), closing with a short conclusion.

use super::common::{check_contractions, check_word_count, polish_checks};
use super::scoring::build_feedback;
use super::text::{
  contains_any_phrase, count_phrases, fragment_stream, mentions_keyword, starts_with_any_phrase,
  tokenize, TextStats,
};
use crate::domain::{FeedbackItem, Severity, Task2Prompt, WritingFeedback, WritingTask};

static OPINION_PHRASES: &[&str] = &[
  "i prefer",
  "i would prefer",
  "i'd prefer",
  "i would choose",
  "i'd choose",
  "i would rather",
  "i'd rather",
  "i choose",
  "i support",
  "i believe",
  "in my opinion",
  "i think",
  "my choice",
  "i would pick",
  "i am in favour",
  "i am in favor",
];

static REASON_MARKERS: &[&str] = &[
  "because",
  "first",
  "firstly",
  "second",
  "secondly",
  "another reason",
  "in addition",
  "moreover",
  "furthermore",
  "also",
  "since",
];

static EXAMPLE_MARKERS: &[&str] = &[
  "for example",
  "for instance",
  "such as",
  "in my experience",
  "when i",
  "last year",
];

static CONCLUSION_MARKERS: &[&str] = &[
  "in conclusion",
  "to sum up",
  "overall",
  "for these reasons",
  "that is why",
  "that's why",
  "therefore",
  "all in all",
  "in short",
];

static EMAIL_OPENERS: &[&str] = &["dear", "hi", "hello", "hey"];

const MIN_REASON_MARKERS: usize = 2;
const MIN_PARAGRAPHS: usize = 3;

/// Evaluate a survey response and aggregate the result into a score
pub fn generate_task2_feedback(text: &str, prompt: Option<&Task2Prompt>) -> WritingFeedback {
  let stats = tokenize(text);
  let items = evaluate_task2_response(&stats, prompt);
  build_feedback(WritingTask::Task2, &stats, items)
}

/// Run every Task 2 check, in a fixed order
pub fn evaluate_task2_response(stats: &TextStats, prompt: Option<&Task2Prompt>) -> Vec<FeedbackItem> {
  let stream = stats.word_stream();

  let mut items = vec![
    check_word_count(stats),
    FeedbackItem::check(
      "opinion",
      contains_any_phrase(&stream, OPINION_PHRASES),
      Severity::Blocker,
      "Your position is stated clearly.",
      "State which option you choose, e.g. \"I would prefer Option A because ...\".",
    ),
  ];

  if let Some(prompt) = prompt {
    items.push(check_option_named(stats, &stream, prompt));
  }

  let reasons = count_phrases(&stream, REASON_MARKERS);
  items.push(FeedbackItem::check(
    "reasons",
    reasons >= MIN_REASON_MARKERS,
    Severity::Important,
    "Several reasons support your choice.",
    format!(
      "Give at least {} reasons (\"First, ...\", \"Another reason is ...\").",
      MIN_REASON_MARKERS
    ),
  ));

  items.push(FeedbackItem::check(
    "examples",
    contains_any_phrase(&stream, EXAMPLE_MARKERS),
    Severity::Important,
    "An example backs up your reasons.",
    "Support a reason with an example (\"For example, ...\").",
  ));

  items.push(FeedbackItem::check(
    "conclusion",
    has_conclusion(stats),
    Severity::Important,
    "Ends with a clear conclusion.",
    "Finish with a concluding sentence such as \"For these reasons, I prefer ...\".",
  ));

  items.push(FeedbackItem::check(
    "paragraphs",
    stats.paragraphs.len() >= MIN_PARAGRAPHS,
    Severity::Polish,
    "Paragraphs separate your position, reasons and conclusion.",
    format!(
      "Use at least {} paragraphs: position, reasons with examples, conclusion.",
      MIN_PARAGRAPHS
    ),
  ));

  let opens_like_email = stats
    .lines
    .first()
    .is_some_and(|l| starts_with_any_phrase(l, EMAIL_OPENERS));
  items.push(FeedbackItem::check(
    "no_salutation",
    !opens_like_email,
    Severity::Polish,
    "Opens directly with your answer.",
    "A survey response is not an email. Start with your position, not a greeting.",
  ));

  items.push(check_contractions(stats));
  items.extend(polish_checks(stats));
  items
}

fn check_option_named(stats: &TextStats, stream: &str, prompt: &Task2Prompt) -> FeedbackItem {
  let named = prompt.options.iter().any(|option| {
    mentions_keyword(stats, stream, &option.label)
      || option.keywords.iter().any(|k| mentions_keyword(stats, stream, k))
  });

  FeedbackItem::check(
    "option_named",
    named,
    Severity::Important,
    "You name the option you are choosing.",
    format!(
      "Name your choice explicitly: \"{}\" or \"{}\".",
      prompt.options[0].label, prompt.options[1].label
    ),
  )
}

/// The last paragraph (or the last sentence of a one-paragraph answer) must conclude
fn has_conclusion(stats: &TextStats) -> bool {
  let closing = if stats.paragraphs.len() > 1 {
    stats.paragraphs.last()
  } else {
    stats.sentences.last()
  };
  closing.is_some_and(|c| contains_any_phrase(&fragment_stream(c), CONCLUSION_MARKERS))
}
