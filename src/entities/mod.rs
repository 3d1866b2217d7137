use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

/// --- Requests ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExtractionRequest {
    pub url: String,
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// --- Classification ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Video(String),
    GenericPage,
}

/// --- Failures ---

/// Failure classes of the direct extraction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Blocked,
    NotFound,
    RateLimited,
    ServerError,
    NetworkOrTimeout,
    NoMeaningfulContent,
    /// Anything else the page path refuses to handle (bad content type,
    /// undecodable body, oversized body, other 4xx).
    Unprocessable,
}

impl FailureKind {
    /// How many extra attempts the retry controller may spend on this kind.
    pub fn retry_allowance(self, max_retries: u32) -> u32 {
        match self {
            Self::NetworkOrTimeout | Self::ServerError => max_retries,
            Self::NoMeaningfulContent => max_retries.min(1),
            Self::Blocked | Self::NotFound | Self::RateLimited | Self::Unprocessable => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::NetworkOrTimeout => "network_or_timeout",
            Self::NoMeaningfulContent => "no_meaningful_content",
            Self::Unprocessable => "unprocessable",
        }
    }
}

/// --- Attempts ---

/// How a single strategy run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(String),
    Failure(String),
}

/// One strategy execution inside a cascade. Lives only as long as the request.
#[derive(Debug, Clone)]
pub struct ExtractionAttempt {
    pub strategy: &'static str,
    pub outcome: AttemptOutcome,
    pub duration_budget: Option<Duration>,
    pub elapsed: Duration,
}

impl ExtractionAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success(_))
    }
}

/// --- Results ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Direct,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub content: String,
    pub title: String,
    pub url: String,
    pub original_length: usize,
    pub truncated: bool,
    pub extraction_method: ExtractionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ExtractionResult {
            content: "text".to_string(),
            title: "Title".to_string(),
            url: "https://example.com".to_string(),
            original_length: 4,
            truncated: false,
            extraction_method: ExtractionMethod::Fallback,
            language: None,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["originalLength"], 4);
        assert_eq!(value["extractionMethod"], "fallback");
        assert_eq!(value["truncated"], false);
        assert!(value.get("language").is_none());
    }

    #[test]
    fn test_retry_allowance_by_kind() {
        assert_eq!(FailureKind::NetworkOrTimeout.retry_allowance(2), 2);
        assert_eq!(FailureKind::ServerError.retry_allowance(2), 2);
        assert_eq!(FailureKind::NoMeaningfulContent.retry_allowance(2), 1);
        assert_eq!(FailureKind::NoMeaningfulContent.retry_allowance(0), 0);
        assert_eq!(FailureKind::Blocked.retry_allowance(2), 0);
        assert_eq!(FailureKind::NotFound.retry_allowance(2), 0);
        assert_eq!(FailureKind::RateLimited.retry_allowance(2), 0);
    }
}
