//! End-to-end extraction for one URL.
//!
//! Video URLs go to the transcript cascade. Everything else goes through the
//! page fetcher and markup extractor under the retry policy, and escalates to
//! the fallback provider when the direct path gives up. Each call owns all of
//! its state; a `Pipeline` can be shared freely between concurrent requests.

pub mod assembler;
pub mod retry;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::PipelineSettings;
use crate::entities::{
    ExtractionMethod, ExtractionRequest, ExtractionResult, FailureKind, SourceKind,
};
use crate::extractor::{
    ContentExtractor, ExtractError, HeuristicExtractor, PageContent, extract_page,
};
use crate::fallback::{ExternalExtractor, FallbackProvider};
use crate::fetcher::{FetchError, PageFetcher, parse_web_url};
use crate::source;
use crate::transcript::TranscriptRetriever;

pub use assembler::{ResultAssembler, TRUNCATION_MARKER, UNKNOWN_TITLE};
pub use retry::{Classify, RetryPolicy, calculate_backoff_delay};

const DIRECT_STRATEGY: &str = "direct_page";

/// Errors surfaced to callers of the pipeline.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unsupported url scheme '{0}': only http and https are accepted")]
    UnsupportedScheme(String),

    #[error(
        "all extraction methods failed; the content may require script execution or be access-restricted"
    )]
    AllMethodsFailed { direct: FailureKind },
}

/// Failure of one direct page attempt.
#[derive(Error, Debug)]
pub enum PageFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl Classify for PageFailure {
    fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Fetch(error) => error.kind(),
            Self::Extract(ExtractError::NoMeaningfulContent { .. }) => {
                FailureKind::NoMeaningfulContent
            }
            Self::Extract(ExtractError::Parse(_)) => FailureKind::Unprocessable,
        }
    }
}

#[derive(Clone)]
pub struct Pipeline {
    settings: PipelineSettings,
    fetcher: PageFetcher,
    transcripts: TranscriptRetriever,
    extractor: Arc<dyn ContentExtractor>,
    fallback: Arc<dyn FallbackProvider>,
    assembler: ResultAssembler,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: PageFetcher::new(settings.page_timeout)?,
            transcripts: TranscriptRetriever::new(&settings)?,
            extractor: Arc::new(HeuristicExtractor),
            fallback: Arc::new(ExternalExtractor::from_settings(&settings)?),
            assembler: ResultAssembler::new(settings.max_content_chars),
            settings,
        })
    }

    /// Swaps the markup extractor, e.g. for [`crate::extractor::ReadabilityExtractor`].
    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackProvider>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    #[instrument(skip_all, fields(url = %request.url))]
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractionError> {
        let url = parse_web_url(&request.url).map_err(|e| match e {
            FetchError::UnsupportedScheme(scheme) => ExtractionError::UnsupportedScheme(scheme),
            other => ExtractionError::InvalidUrl(other.to_string()),
        })?;

        match source::classify(&url) {
            SourceKind::Video(video_id) => Ok(self.extract_video(&url, &video_id).await),
            SourceKind::GenericPage => self.extract_page(&url).await,
        }
    }

    async fn extract_video(&self, url: &Url, video_id: &str) -> ExtractionResult {
        let transcript = self.transcripts.retrieve(video_id).await;
        let title = self.transcripts.fetch_title(video_id).await;
        info!(
            video_id,
            strategy = transcript.strategy.unwrap_or("none"),
            attempts = transcript.attempts.len(),
            "video extraction finished"
        );

        self.assembler
            .assemble(transcript.text, title, url.as_str(), ExtractionMethod::Direct)
    }

    async fn extract_page(&self, url: &Url) -> Result<ExtractionResult, ExtractionError> {
        let policy = RetryPolicy {
            max_retries: self.settings.max_retries,
            base_delay: self.settings.backoff_base,
        };

        let retried = policy
            .run(DIRECT_STRATEGY, Some(self.settings.page_timeout), || {
                self.direct_attempt(url)
            })
            .await;
        debug!(attempts = retried.attempts.len(), "direct path finished");

        let direct_kind = match retried.result {
            Ok(content) => {
                return Ok(self.assembler.assemble(
                    content.text,
                    content.title,
                    url.as_str(),
                    ExtractionMethod::Direct,
                ));
            }
            Err(failure) => failure.failure_kind(),
        };

        warn!(
            kind = direct_kind.label(),
            "direct extraction failed, escalating to fallback provider"
        );
        match self.fallback.extract(url.as_str()).await {
            Ok(content) => Ok(self.assembler.assemble(
                content.text,
                content.title,
                url.as_str(),
                ExtractionMethod::Fallback,
            )),
            Err(e) => {
                warn!(error = %e, "fallback provider failed");
                Err(ExtractionError::AllMethodsFailed {
                    direct: direct_kind,
                })
            }
        }
    }

    async fn direct_attempt(&self, url: &Url) -> Result<PageContent, PageFailure> {
        let page = self.fetcher.fetch(url.as_str()).await?;
        Ok(extract_page(self.extractor.as_ref(), &page)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{FallbackContent, FallbackError, MockFallbackProvider};

    fn pipeline(fallback: MockFallbackProvider) -> Pipeline {
        Pipeline::new(PipelineSettings::default())
            .unwrap()
            .with_fallback(Arc::new(fallback))
    }

    #[tokio::test]
    async fn test_rejects_unsupported_scheme_before_network() {
        let mut fallback = MockFallbackProvider::new();
        fallback.expect_extract().never();

        let result = pipeline(fallback)
            .extract(&ExtractionRequest::new("ftp://example.com/file.txt"))
            .await;
        assert!(matches!(
            result,
            Err(ExtractionError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
    }

    #[tokio::test]
    async fn test_rejects_unparseable_url() {
        let mut fallback = MockFallbackProvider::new();
        fallback.expect_extract().never();

        let result = pipeline(fallback)
            .extract(&ExtractionRequest::new("definitely not a url"))
            .await;
        assert!(matches!(result, Err(ExtractionError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_escalates_to_fallback() {
        let mut fallback = MockFallbackProvider::new();
        fallback
            .expect_extract()
            .withf(|url| url == "http://127.0.0.1:9/article")
            .times(1)
            .returning(|_| {
                Ok(FallbackContent {
                    title: Some("From provider".to_string()),
                    text: "Provider text".to_string(),
                })
            });

        let settings = PipelineSettings {
            max_retries: 0,
            ..PipelineSettings::default()
        };
        let pipeline = Pipeline::new(settings)
            .unwrap()
            .with_fallback(Arc::new(fallback));

        let result = pipeline
            .extract(&ExtractionRequest::new("http://127.0.0.1:9/article"))
            .await
            .unwrap();
        assert_eq!(result.extraction_method, ExtractionMethod::Fallback);
        assert_eq!(result.title, "From provider");
        assert_eq!(result.content, "Provider text");
    }

    #[tokio::test]
    async fn test_all_methods_failed() {
        let mut fallback = MockFallbackProvider::new();
        fallback
            .expect_extract()
            .times(1)
            .returning(|_| Err(FallbackError::Empty));

        let settings = PipelineSettings {
            max_retries: 0,
            ..PipelineSettings::default()
        };
        let pipeline = Pipeline::new(settings)
            .unwrap()
            .with_fallback(Arc::new(fallback));

        let result = pipeline
            .extract(&ExtractionRequest::new("http://127.0.0.1:9/missing"))
            .await;
        assert!(matches!(
            result,
            Err(ExtractionError::AllMethodsFailed {
                direct: FailureKind::NetworkOrTimeout
            })
        ));
    }

    #[test]
    fn test_page_failure_classification() {
        let blocked = PageFailure::from(FetchError::Blocked);
        assert_eq!(blocked.failure_kind(), FailureKind::Blocked);

        let empty = PageFailure::from(ExtractError::NoMeaningfulContent { chars: 3 });
        assert_eq!(empty.failure_kind(), FailureKind::NoMeaningfulContent);
    }
}
