use crate::entities::{ExtractionMethod, ExtractionResult};
use crate::extractor::language::detect_language;

pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated]";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Packages winning text into the result returned to callers.
#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler {
    max_chars: usize,
}

impl ResultAssembler {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Caps `content` at `max_chars` characters (marker appended when cut)
    /// and records the untruncated length.
    pub fn assemble(
        &self,
        content: String,
        title: Option<String>,
        url: &str,
        method: ExtractionMethod,
    ) -> ExtractionResult {
        let original_length = content.chars().count();
        let truncated = original_length > self.max_chars;

        let content = if truncated {
            let cut = content
                .char_indices()
                .nth(self.max_chars)
                .map(|(index, _)| index)
                .unwrap_or(content.len());
            let mut kept = content[..cut].to_string();
            kept.push_str(TRUNCATION_MARKER);
            kept
        } else {
            content
        };

        let title = title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        ExtractionResult {
            language: detect_language(&content),
            content,
            title,
            url: url.to_string(),
            original_length,
            truncated,
            extraction_method: method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_untouched() {
        let result = ResultAssembler::new(100).assemble(
            "hello".to_string(),
            Some("  Title ".to_string()),
            "https://example.com",
            ExtractionMethod::Direct,
        );
        assert_eq!(result.content, "hello");
        assert_eq!(result.title, "Title");
        assert_eq!(result.original_length, 5);
        assert!(!result.truncated);
        assert_eq!(result.extraction_method, ExtractionMethod::Direct);
    }

    #[test]
    fn test_exact_limit_is_not_truncated() {
        let result = ResultAssembler::new(10).assemble(
            "a".repeat(10),
            None,
            "https://example.com",
            ExtractionMethod::Fallback,
        );
        assert!(!result.truncated);
        assert_eq!(result.content.len(), 10);
        assert_eq!(result.title, UNKNOWN_TITLE);
    }

    #[test]
    fn test_truncates_on_char_boundaries() {
        let result = ResultAssembler::new(3).assemble(
            "héllo wörld".to_string(),
            Some(String::new()),
            "https://example.com",
            ExtractionMethod::Direct,
        );
        assert!(result.truncated);
        assert_eq!(result.original_length, 11);
        assert_eq!(result.content, format!("hél{TRUNCATION_MARKER}"));
        assert_eq!(result.title, UNKNOWN_TITLE);
    }

    #[test]
    fn test_large_content_capped_at_default_limit() {
        let content = "Sentence of text. ".repeat(7_000);
        let length = content.chars().count();
        let result = ResultAssembler::new(100_000).assemble(
            content,
            None,
            "https://example.com",
            ExtractionMethod::Direct,
        );
        assert!(result.truncated);
        assert_eq!(result.original_length, length);
        assert_eq!(
            result.content.chars().count(),
            100_000 + TRUNCATION_MARKER.chars().count()
        );
        assert!(result.content.ends_with(TRUNCATION_MARKER));
    }
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_truncated_iff_over_limit(content in ".{0,300}", limit in 1usize..200) {
            let result = ResultAssembler::new(limit).assemble(
                content.clone(),
                None,
                "https://example.com",
                ExtractionMethod::Direct,
            );
            let length = content.chars().count();
            prop_assert_eq!(result.original_length, length);
            prop_assert_eq!(result.truncated, length > limit);
            if result.truncated {
                let kept = result.content.strip_suffix(TRUNCATION_MARKER).unwrap();
                prop_assert_eq!(kept.chars().count(), limit);
            } else {
                prop_assert_eq!(result.content, content);
            }
        }
    }
}
