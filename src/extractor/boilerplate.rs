//! Phrase-level cleanup applied after the main text has been chosen.

use regex::Regex;
use std::sync::LazyLock;

use crate::extractor::model::normalize_whitespace;

static BOILERPLATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // cookie / privacy notices
        r"(?i)\b(?:we|this (?:site|website)) uses? cookies\b[^.!?]*[.!?]?",
        r"(?i)\bby (?:continuing|using) (?:to (?:browse|use) )?this (?:site|website)[^.!?]*[.!?]?",
        r"(?i)\b(?:cookie|privacy) (?:policy|settings|preferences|notice)\b",
        // subscribe / newsletter / ads
        r"(?i)\b(?:subscribe|sign up) (?:to|for) (?:our|the) newsletter\b[^.!?]*[.!?]?",
        r"(?i)\bsubscribe now\b",
        r"(?i)\b(?:advertisement|sponsored content|skip ad)\b",
        // social follow / share prompts
        r"(?i)\bfollow us on (?:twitter|facebook|instagram|linkedin|youtube|tiktok|x)\b",
        r"(?i)\bshare (?:this|on) (?:article|post|story|page|twitter|facebook|linkedin|whatsapp|email|x)\b",
        // copyright lines
        r"(?i)(?:©|\(c\)|\bcopyright\b)\s*(?:\d{4}(?:\s*[-–]\s*\d{4})?)?.{0,80}?\ball rights reserved\b\.?",
        r"©\s*\d{4}(?:\s*[-–]\s*\d{4})?",
        r"(?i)\ball rights reserved\b\.?",
        // consent buttons
        r"(?i)\b(?:accept all(?: cookies)?|reject all|allow all|accept (?:&|and) close|agree and continue|manage (?:preferences|options)|agree (?:&|and) proceed)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Removes notice, prompt and copyright phrases, then collapses whitespace.
pub fn strip(text: &str) -> String {
    let cleaned = BOILERPLATE_PATTERNS
        .iter()
        .fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, " ").into_owned()
        });
    normalize_whitespace(&cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_cookie_and_consent() {
        let text = "Real content here. We use cookies to improve your experience. Accept all cookies Reject all";
        assert_eq!(strip(text), "Real content here.");
    }

    #[test]
    fn test_strips_social_and_newsletter() {
        let text = "Story body. Follow us on Twitter Share this article Subscribe to our newsletter for weekly updates. Ending.";
        assert_eq!(strip(text), "Story body. Ending.");
    }

    #[test]
    fn test_strips_copyright_line() {
        let text = "Paragraph text. © 2024 Example Media Inc. All rights reserved.";
        assert_eq!(strip(text), "Paragraph text.");
        assert_eq!(strip("Body. Copyright 2019-2023 Acme. All rights reserved."), "Body.");
    }

    #[test]
    fn test_leaves_ordinary_prose_alone() {
        let text = "The committee agreed to review the policy on cookies sold at the bake sale.";
        assert_eq!(strip(text), text);
    }
}
