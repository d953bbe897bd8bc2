//! Text segmentation and phrase matching shared by the task evaluators.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Tables
// ============================================================================

/// Contraction patterns, matched case-insensitively against text with straight apostrophes
static CONTRACTION_PATTERNS: &[&str] = &[
  r"\b[a-z]+n't\b",
  r"\bi'm\b",
  r"\b(?:i|you|we|they|who|that|there|what)'(?:re|ve|ll|d)\b",
  r"\b(?:he|she|it)'(?:ll|d)\b",
  r"\b(?:he|she|it|that|there|here|what|who|where|how|let)'s\b",
];

static CONTRACTION_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  CONTRACTION_PATTERNS
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).expect("contraction pattern is a valid regex"))
    .collect()
});

/// Tokens (lowercase, without the final period) after which a period does not end a sentence
static ABBREVIATIONS: &[&str] = &[
  "mr", "mrs", "ms", "dr", "st", "jr", "sr", "prof", "e.g", "i.e", "a.m", "p.m", "vs", "approx",
];

/// Function words ignored by the repetition check
static STOP_WORDS: &[&str] = &[
  "about", "after", "also", "been", "before", "being", "could", "does", "each", "even", "from",
  "have", "here", "into", "just", "like", "more", "most", "much", "only", "other", "over",
  "really", "should", "some", "such", "than", "that", "their", "them", "then", "there",
  "these", "they", "this", "those", "very", "want", "were", "what", "when", "where", "which",
  "while", "will", "with", "would", "your", "yours", "dear", "because", "think",
];

// ============================================================================
// Segmentation
// ============================================================================

/// Segmented view of a submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStats {
  /// Normalized source text (NFC, straight apostrophes, `\n` line endings)
  pub normalized: String,
  /// Words in order of appearance
  pub words: Vec<String>,
  /// Sentences, trimmed, in order
  pub sentences: Vec<String>,
  /// Paragraphs (blocks separated by blank lines), trimmed
  pub paragraphs: Vec<String>,
  /// Non-empty lines, trimmed
  pub lines: Vec<String>,
}

impl TextStats {
  pub fn word_count(&self) -> usize {
    self.words.len()
  }

  /// Lowercase words joined by single spaces, padded on both sides.
  /// Searching for `" phrase "` in it gives whole-word phrase matching.
  pub fn word_stream(&self) -> String {
    let mut stream = String::from(" ");
    for word in &self.words {
      stream.push_str(&word.to_lowercase());
      stream.push(' ');
    }
    stream
  }
}

/// Normalize a submission before analysis
pub fn normalize(text: &str) -> String {
  text
    .nfc()
    .collect::<String>()
    .replace("\r\n", "\n")
    .replace('\r', "\n")
    .replace(['\u{2019}', '\u{2018}'], "'")
}

/// Split text into words, sentences, paragraphs and lines
pub fn tokenize(text: &str) -> TextStats {
  let normalized = normalize(text);
  let words = split_words(&normalized);
  let sentences = split_sentences(&normalized);
  let paragraphs = split_paragraphs(&normalized);
  let lines = normalized
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .map(String::from)
    .collect();

  TextStats {
    normalized,
    words,
    sentences,
    paragraphs,
    lines,
  }
}

/// Words are alphabetic runs; an apostrophe or hyphen is kept when it
/// joins two letters ("don't", "well-known"). Numbers are not words.
pub fn split_words(text: &str) -> Vec<String> {
  let chars: Vec<char> = text.chars().collect();
  let mut words = Vec::new();
  let mut current = String::new();

  for (i, &c) in chars.iter().enumerate() {
    if c.is_alphabetic() {
      current.push(c);
    } else if (c == '\'' || c == '-')
      && !current.is_empty()
      && chars.get(i + 1).is_some_and(|n| n.is_alphabetic())
    {
      current.push(c);
    } else if !current.is_empty() {
      words.push(std::mem::take(&mut current));
    }
  }
  if !current.is_empty() {
    words.push(current);
  }
  words
}

/// Sentences end at `!`, `?`, or a `.` followed by whitespace. Periods
/// inside numbers ("3.5") and after common abbreviations ("Mr.", "e.g.")
/// do not end a sentence. A line break ends one only after a short line
/// closing with `,` or `:` (a salutation or sign-off such as "Dear Sam,");
/// elsewhere it counts as a space. Fragments without any alphanumeric
/// character are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
  let chars: Vec<char> = text.chars().collect();
  let mut sentences = Vec::new();
  let mut current = String::new();
  let mut line = String::new();

  for (i, &c) in chars.iter().enumerate() {
    let ends = match c {
      '!' | '?' => true,
      '.' => {
        let next_is_break = chars.get(i + 1).is_none_or(|n| n.is_whitespace());
        next_is_break && !ends_with_abbreviation(&current)
      }
      '\n' => is_heading_line(&line),
      _ => false,
    };
    if c == '\n' {
      line.clear();
    } else {
      line.push(c);
    }

    if ends {
      push_sentence(&mut sentences, &mut current);
    } else if c == '\n' {
      current.push(' ');
    } else {
      current.push(c);
    }
  }
  push_sentence(&mut sentences, &mut current);
  sentences
}

/// Most words a salutation or sign-off line can have
const HEADING_LINE_WORDS: usize = 6;

fn is_heading_line(line: &str) -> bool {
  let line = line.trim();
  line.ends_with([',', ':']) && split_words(line).len() <= HEADING_LINE_WORDS
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
  let trimmed = current.trim();
  if trimmed.chars().any(char::is_alphanumeric) {
    sentences.push(trimmed.to_string());
  }
  current.clear();
}

fn ends_with_abbreviation(fragment: &str) -> bool {
  let last = fragment
    .rsplit(char::is_whitespace)
    .next()
    .unwrap_or("")
    .trim_start_matches(|c: char| !c.is_alphanumeric())
    .to_lowercase();
  ABBREVIATIONS.contains(&last.as_str())
}

/// Paragraphs are separated by one or more blank lines
pub fn split_paragraphs(text: &str) -> Vec<String> {
  let mut paragraphs = Vec::new();
  let mut current: Vec<&str> = Vec::new();

  for line in text.lines() {
    if line.trim().is_empty() {
      if !current.is_empty() {
        paragraphs.push(current.join("\n"));
        current.clear();
      }
    } else {
      current.push(line.trim());
    }
  }
  if !current.is_empty() {
    paragraphs.push(current.join("\n"));
  }

  paragraphs
    .into_iter()
    .filter(|p| p.chars().any(char::is_alphanumeric))
    .collect()
}

// ============================================================================
// Matching helpers
// ============================================================================

/// Lowercase word stream for an arbitrary fragment (see [`TextStats::word_stream`])
pub fn fragment_stream(fragment: &str) -> String {
  let mut stream = String::from(" ");
  for word in split_words(&normalize(fragment)) {
    stream.push_str(&word.to_lowercase());
    stream.push(' ');
  }
  stream
}

/// Whether the word stream contains any of the phrases as whole words
pub fn contains_any_phrase(stream: &str, phrases: &[&str]) -> bool {
  phrases.iter().any(|p| stream.contains(&format!(" {} ", p)))
}

/// Number of phrase occurrences (each phrase counted separately)
pub fn count_phrases(stream: &str, phrases: &[&str]) -> usize {
  phrases
    .iter()
    .map(|p| stream.matches(&format!(" {} ", p)).count())
    .sum()
}

/// Whether a fragment begins with any of the phrases (case-insensitive, whole words)
pub fn starts_with_any_phrase(fragment: &str, phrases: &[&str]) -> bool {
  let stream = fragment_stream(fragment);
  phrases.iter().any(|p| stream.starts_with(&format!(" {} ", p)))
}

/// Keyword match: a single-word keyword matches any word starting with it,
/// a multi-word keyword must appear as a phrase.
pub fn mentions_keyword(stats: &TextStats, stream: &str, keyword: &str) -> bool {
  let keyword = keyword.trim().to_lowercase();
  if keyword.is_empty() {
    return false;
  }
  if keyword.contains(char::is_whitespace) {
    let phrase = fragment_stream(&keyword);
    stream.contains(phrase.as_str())
  } else {
    stats
      .words
      .iter()
      .any(|w| w.to_lowercase().starts_with(&keyword))
  }
}

/// Byte ranges of contractions in already-normalized text, in order, non-overlapping
fn contraction_spans(normalized: &str) -> Vec<(usize, usize)> {
  let mut spans: Vec<(usize, usize)> = CONTRACTION_REGEXES
    .iter()
    .flat_map(|regex| regex.find_iter(normalized).map(|m| (m.start(), m.end())))
    .collect();
  spans.sort_unstable();
  spans.dedup_by(|next, prev| next.0 < prev.1);
  spans
}

/// Contractions found in the text, lowercase, in order, deduplicated
pub fn find_contractions(text: &str) -> Vec<String> {
  let normalized = normalize(text);
  let mut unique: Vec<String> = Vec::new();
  for (start, end) in contraction_spans(&normalized) {
    let word = normalized[start..end].to_lowercase();
    if !unique.contains(&word) {
      unique.push(word);
    }
  }
  unique
}

/// HTML for displaying a submission with its contractions wrapped in `<mark>`
pub fn highlight_contractions(text: &str) -> String {
  let normalized = normalize(text);
  let mut html = String::with_capacity(normalized.len() + 32);
  let mut last = 0;
  for (start, end) in contraction_spans(&normalized) {
    html.push_str(&html_escape::encode_text(&normalized[last..start]));
    html.push_str("<mark>");
    html.push_str(&html_escape::encode_text(&normalized[start..end]));
    html.push_str("</mark>");
    last = end;
  }
  html.push_str(&html_escape::encode_text(&normalized[last..]));
  html
}

/// The most repeated content word and its count, if any exceeds `limit`
pub fn most_repeated_word(words: &[String], limit: usize) -> Option<(String, usize)> {
  let mut counts: HashMap<String, usize> = HashMap::new();
  for word in words {
    let lower = word.to_lowercase();
    if lower.chars().count() < 4 || STOP_WORDS.contains(&lower.as_str()) {
      continue;
    }
    if lower.chars().all(|c| c.is_ascii_digit()) {
      continue;
    }
    *counts.entry(lower).or_insert(0) += 1;
  }

  counts
    .into_iter()
    .filter(|(_, count)| *count > limit)
    // Highest count first, then alphabetical for a stable message
    .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_split_words_keeps_inner_apostrophes_and_hyphens() {
    let words = split_words("I don't like well-known 'quotes' - really.");
    assert_eq!(words, vec!["I", "don't", "like", "well-known", "quotes", "really"]);
  }

  #[test]
  fn test_numbers_are_not_words() {
    let stats = tokenize("Meet at 5 pm on 12 May 2024");
    assert_eq!(stats.words, vec!["Meet", "at", "pm", "on", "May"]);
    assert_eq!(stats.word_count(), 5);
  }

  #[test]
  fn test_curly_apostrophe_normalized() {
    let stats = tokenize("I\u{2019}m writing");
    assert_eq!(stats.words, vec!["I'm", "writing"]);
  }

  #[test]
  fn test_sentences_split_on_punctuation_and_lines() {
    let sentences = split_sentences("Dear Sam,\nI am here. Are you? Yes!\nBest,\nAna");
    assert_eq!(
      sentences,
      vec!["Dear Sam,", "I am here", "Are you", "Yes", "Best,", "Ana"]
    );
  }

  #[test]
  fn test_line_break_inside_sentence_is_a_space() {
    assert_eq!(
      split_sentences("thanks for the invite\nsee you soon"),
      vec!["thanks for the invite see you soon"]
    );
    // A long line ending in a comma is ordinary wrapped prose
    assert_eq!(
      split_sentences("When the table arrived this morning it was cracked,\nso I sent it back.").len(),
      1
    );
  }

  #[test]
  fn test_abbreviations_and_decimals_do_not_split() {
    let sentences = split_sentences("Dear Mr. Li, the fee is 3.5 dollars, e.g. for parking. See you at 5 p.m. today.");
    assert_eq!(
      sentences,
      vec!["Dear Mr. Li, the fee is 3.5 dollars, e.g. for parking", "See you at 5 p.m. today"]
    );
  }

  #[test]
  fn test_text_without_punctuation_is_one_sentence() {
    assert_eq!(split_sentences("no punctuation at all").len(), 1);
  }

  #[test]
  fn test_paragraphs_split_on_blank_lines() {
    let text = "One.\nStill one.\n\n\nTwo.\r\n\r\nThree.";
    let stats = tokenize(text);
    assert_eq!(stats.paragraphs.len(), 3);
    assert_eq!(stats.paragraphs[0], "One.\nStill one.");
  }

  #[test]
  fn test_empty_text() {
    let stats = tokenize("   \n\n ");
    assert_eq!(stats.word_count(), 0);
    assert!(stats.sentences.is_empty());
    assert!(stats.paragraphs.is_empty());
    assert!(stats.lines.is_empty());
  }

  #[test]
  fn test_phrase_matching_is_whole_word() {
    let stats = tokenize("Firstly, the offer is great. Also the price.");
    let stream = stats.word_stream();
    assert!(contains_any_phrase(&stream, &["firstly"]));
    assert!(contains_any_phrase(&stream, &["the price"]));
    assert!(!contains_any_phrase(&stream, &["first"]));
    assert_eq!(count_phrases(&stream, &["the", "also"]), 3);
  }

  #[test]
  fn test_starts_with_phrase() {
    assert!(starts_with_any_phrase("Dear Mr. Li,", &["dear"]));
    assert!(starts_with_any_phrase("To whom it may concern:", &["to whom it may concern"]));
    assert!(!starts_with_any_phrase("Dearest friend", &["dear"]));
  }

  #[test]
  fn test_keyword_prefix_match() {
    let stats = tokenize("I would like a refund for the damaged chair.");
    let stream = stats.word_stream();
    assert!(mentions_keyword(&stats, &stream, "refund"));
    assert!(mentions_keyword(&stats, &stream, "damage"));
    assert!(mentions_keyword(&stats, &stream, "Damaged Chair"));
    assert!(!mentions_keyword(&stats, &stream, "table"));
    assert!(!mentions_keyword(&stats, &stream, "  "));
  }

  #[test]
  fn test_find_contractions() {
    let found = find_contractions("I'm sure it's fine, but we can't wait. It's late and you've gone.");
    assert_eq!(found, vec!["i'm", "it's", "can't", "you've"]);
  }

  #[test]
  fn test_possessives_are_not_contractions() {
    assert!(find_contractions("John's car and the company's policy").is_empty());
  }

  #[test]
  fn test_contractions_matched_in_any_case() {
    assert_eq!(find_contractions("DON'T stop. I'M here."), vec!["don't", "i'm"]);
  }

  #[test]
  fn test_highlight_escapes_and_marks() {
    let html = highlight_contractions("I can't <b>attend</b> & I'm sorry");
    assert_eq!(
      html,
      "I <mark>can't</mark> &lt;b&gt;attend&lt;/b&gt; &amp; <mark>I'm</mark> sorry"
    );
    assert_eq!(highlight_contractions("Plain text."), "Plain text.");
  }

  #[test]
  fn test_most_repeated_word() {
    let words = split_words("park park park park park park city city the the the the the the the");
    assert_eq!(most_repeated_word(&words, 5), Some(("park".to_string(), 6)));
    assert_eq!(most_repeated_word(&words, 6), None);
  }
}
