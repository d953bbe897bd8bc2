//! Checks shared by Task 1 and Task 2.

use super::text::{find_contractions, most_repeated_word, TextStats};
use crate::config::{MAX_SENTENCE_WORDS, MAX_WORDS, MAX_WORD_REPEATS, MIN_WORDS};
use crate::domain::{FeedbackItem, Severity};

/// Word count must fall within the task limits. Too short costs more than too long.
pub fn check_word_count(stats: &TextStats) -> FeedbackItem {
  let count = stats.word_count();
  if count < MIN_WORDS {
    FeedbackItem::fail(
      "word_count",
      Severity::Blocker,
      format!(
        "Only {} words. Aim for {}-{}; short responses cannot show enough range.",
        count, MIN_WORDS, MAX_WORDS
      ),
    )
  } else if count > MAX_WORDS {
    FeedbackItem::fail(
      "word_count",
      Severity::Important,
      format!(
        "{} words is over the {}-word limit. Cut repetition and keep each point focused.",
        count, MAX_WORDS
      ),
    )
  } else {
    FeedbackItem::pass(
      "word_count",
      Severity::Blocker,
      format!("{} words, within the {}-{} range.", count, MIN_WORDS, MAX_WORDS),
    )
  }
}

/// Formal register: no contractions
pub fn check_contractions(stats: &TextStats) -> FeedbackItem {
  let found = find_contractions(&stats.normalized);
  if found.is_empty() {
    FeedbackItem::pass(
      "contractions",
      Severity::Polish,
      "No contractions. The register stays formal.",
    )
  } else {
    let shown: Vec<&str> = found.iter().take(3).map(String::as_str).collect();
    FeedbackItem::fail(
      "contractions",
      Severity::Polish,
      format!(
        "Avoid contractions in formal writing: {}. Write the full forms (e.g. \"do not\").",
        shown.join(", ")
      ),
    )
  }
}

/// Shared polish checks, appended after the task-specific ones
pub fn polish_checks(stats: &TextStats) -> Vec<FeedbackItem> {
  vec![
    check_sentence_length(stats),
    check_capitalization(stats),
    check_repetition(stats),
  ]
}

fn check_sentence_length(stats: &TextStats) -> FeedbackItem {
  let longest = stats
    .sentences
    .iter()
    .map(|s| super::text::split_words(s).len())
    .max()
    .unwrap_or(0);

  FeedbackItem::check(
    "sentence_length",
    longest <= MAX_SENTENCE_WORDS,
    Severity::Polish,
    "Sentence lengths are easy to follow.",
    format!(
      "One sentence runs to {} words. Split sentences longer than {} words.",
      longest, MAX_SENTENCE_WORDS
    ),
  )
}

fn check_capitalization(stats: &TextStats) -> FeedbackItem {
  let lowercase_start = stats.sentences.iter().find(|s| {
    s.chars()
      .find(|c| c.is_alphanumeric())
      .is_some_and(|c| c.is_lowercase())
  });
  let lowercase_i = has_lowercase_pronoun(&stats.normalized);

  let message = match (lowercase_start, lowercase_i) {
    (Some(sentence), _) => {
      let preview: String = sentence.chars().take(30).collect();
      format!("Start every sentence with a capital letter: \"{}\".", preview)
    }
    (None, true) => "Always capitalise the pronoun \"I\".".to_string(),
    (None, false) => String::new(),
  };

  FeedbackItem::check(
    "capitalization",
    lowercase_start.is_none() && !lowercase_i,
    Severity::Polish,
    "Capitalisation is consistent.",
    message,
  )
}

/// A standalone lowercase "i" ("i went", "i'm"). Dotted forms like "i.e." are abbreviations.
fn has_lowercase_pronoun(text: &str) -> bool {
  let chars: Vec<char> = text.chars().collect();
  chars.iter().enumerate().any(|(n, &c)| {
    c == 'i'
      && (n == 0 || !chars[n - 1].is_alphanumeric())
      && chars.get(n + 1).is_none_or(|next| !next.is_alphanumeric() && *next != '.')
  })
}

fn check_repetition(stats: &TextStats) -> FeedbackItem {
  match most_repeated_word(&stats.words, MAX_WORD_REPEATS) {
    Some((word, count)) => FeedbackItem::fail(
      "repetition",
      Severity::Polish,
      format!("\"{}\" appears {} times. Use synonyms to show vocabulary range.", word, count),
    ),
    None => FeedbackItem::pass("repetition", Severity::Polish, "Good variety of vocabulary."),
  }
}
