// ============================================================
// Layer 4 — Text Normalizer
// ============================================================
// Turns a raw review into the cleaned text the vectorizer sees.
// Training and serving both go through this exact function, so
// the vocabulary learned at fit time matches what requests
// produce at inference time.
//
// Cleaning steps (order matters):
//   1. Lowercase
//   2. Strip angle-bracket tags such as <br /> (lazy match,
//      never crosses a newline)
//   3. Drop every character that is not a-z or whitespace
//   4. Split on whitespace
//   5. Drop English stopwords
//   6. Re-join with single spaces
//
// The result contains only a-z runs separated by one space and
// no stopwords, so running it twice changes nothing.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let words: HashSet<&'static str> = include_str!("../../resources/stopwords_english.txt")
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .collect();
    tracing::debug!("Loaded {} English stopwords", words.len());
    words
});

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<.*?>").expect("hardcoded regex is valid"));

/// Clean one review. Total: any input, including "", yields a String.
pub fn normalize(text: &str) -> String {
    let lowered  = text.to_lowercase();
    let untagged = TAG_PATTERN.replace_all(&lowered, "");

    let letters: String = untagged
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();

    letters
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `word` is in the stopword list.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Value form of [`normalize`] for call sites that carry a preprocessor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn clean(&self, text: &str) -> String {
        normalize(text)
    }
}
