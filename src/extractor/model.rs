use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Main text and title recovered from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub title: Option<String>,
    pub text: String,
}

impl AsRef<str> for PageContent {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// A span of page text competing to be the main content.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRegion {
    pub text: String,
    pub score: f64,
}

impl CandidateRegion {
    /// Scores `text` as its length plus a bonus per sentence terminator.
    pub fn new(text: String) -> Self {
        let length = text.chars().count() as f64;
        let terminators = text
            .chars()
            .filter(|c| matches!(c, '.' | '!' | '?'))
            .count() as f64;
        Self {
            score: length + 10.0 * terminators,
            text,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Collapses every whitespace run (newlines included) into one space.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}
