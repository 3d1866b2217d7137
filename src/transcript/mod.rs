//! Caption text for hosted videos.
//!
//! Strategies run one after another in [`TranscriptStrategy::CASCADE`] order
//! and the first one producing at least `min_chars` characters wins. A video
//! without captions is a normal outcome: the retriever then answers with
//! [`NO_TRANSCRIPT_SENTINEL`] instead of an error.

pub mod page;
pub mod timedtext;

use reqwest::{Client, header};
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::PipelineSettings;
use crate::entities::{AttemptOutcome, ExtractionAttempt};
use crate::fetcher::{FetchError, build_client};

pub const NO_TRANSCRIPT_SENTINEL: &str = "No transcript available for this video.";

#[derive(Error, Debug)]
pub enum StrategyFailure {
    #[error("transport: {0}")]
    Transport(#[from] FetchError),

    #[error("unexpected payload: {0}")]
    Payload(String),

    #[error("video page unavailable")]
    PageUnavailable,

    #[error("no captions found")]
    NothingFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptStrategy {
    TimedTextJson,
    TimedTextXml,
    CaptionTrackList,
    EmbeddedPageData,
    StructuredMetadata,
    MarkupPatterns,
}

impl TranscriptStrategy {
    pub const CASCADE: [Self; 6] = [
        Self::TimedTextJson,
        Self::TimedTextXml,
        Self::CaptionTrackList,
        Self::EmbeddedPageData,
        Self::StructuredMetadata,
        Self::MarkupPatterns,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::TimedTextJson => "timedtext_json",
            Self::TimedTextXml => "timedtext_xml",
            Self::CaptionTrackList => "caption_track_list",
            Self::EmbeddedPageData => "embedded_page_data",
            Self::StructuredMetadata => "structured_metadata",
            Self::MarkupPatterns => "markup_patterns",
        }
    }

    async fn run(self, ctx: &StrategyContext<'_>) -> Result<String, StrategyFailure> {
        match self {
            Self::TimedTextJson => timedtext::json_captions(ctx).await,
            Self::TimedTextXml => timedtext::xml_captions(ctx).await,
            Self::CaptionTrackList => timedtext::discovered_track(ctx).await,
            Self::EmbeddedPageData => page::embedded_page_data(ctx).await,
            Self::StructuredMetadata => page::structured_metadata(ctx).await,
            Self::MarkupPatterns => page::markup_patterns(ctx).await,
        }
    }
}

/// Outcome of one retrieval: caption text or the sentinel, plus the attempt log.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
    pub strategy: Option<&'static str>,
    pub attempts: Vec<ExtractionAttempt>,
}

impl Transcript {
    pub fn is_available(&self) -> bool {
        self.strategy.is_some()
    }
}

/// Request-scoped state shared by the strategies of one retrieval.
pub struct StrategyContext<'a> {
    pub(crate) retriever: &'a TranscriptRetriever,
    pub(crate) video_id: &'a str,
    watch_page: OnceCell<Option<String>>,
}

impl StrategyContext<'_> {
    /// The watch page, downloaded at most once per retrieval.
    pub(crate) async fn watch_page(&self) -> Result<&str, StrategyFailure> {
        let page = self
            .watch_page
            .get_or_init(|| async {
                let url = self.retriever.watch_url(self.video_id);
                match self.retriever.get_text(url).await {
                    Ok(body) => Some(body),
                    Err(e) => {
                        debug!(error = %e, "watch page fetch failed");
                        None
                    }
                }
            })
            .await;
        page.as_deref().ok_or(StrategyFailure::PageUnavailable)
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptRetriever {
    client: Client,
    base_url: Url,
    languages: Vec<String>,
    min_chars: usize,
    timeout: Duration,
}

#[derive(Deserialize)]
struct OEmbed {
    title: Option<String>,
}

impl TranscriptRetriever {
    pub fn new(settings: &PipelineSettings) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(settings.transcript_timeout)?,
            base_url: settings.video_platform_url.clone(),
            languages: settings.transcript_languages.clone(),
            min_chars: settings.min_transcript_chars,
            timeout: settings.transcript_timeout,
        })
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, video_id: &str) -> Transcript {
        let ctx = StrategyContext {
            retriever: self,
            video_id,
            watch_page: OnceCell::new(),
        };
        let mut attempts = Vec::with_capacity(TranscriptStrategy::CASCADE.len());

        for strategy in TranscriptStrategy::CASCADE {
            let started = Instant::now();
            let result = strategy.run(&ctx).await;
            let elapsed = started.elapsed();

            let outcome = match result {
                Ok(text) if text.chars().count() >= self.min_chars => {
                    info!(
                        strategy = strategy.name(),
                        chars = text.chars().count(),
                        "transcript found"
                    );
                    let success = AttemptOutcome::Success(text.clone());
                    attempts.push(self.attempt(strategy, success, elapsed));
                    return Transcript {
                        text,
                        strategy: Some(strategy.name()),
                        attempts,
                    };
                }
                Ok(text) => AttemptOutcome::Failure(format!(
                    "below threshold ({} characters)",
                    text.chars().count()
                )),
                Err(e) => AttemptOutcome::Failure(e.to_string()),
            };

            debug!(
                strategy = strategy.name(),
                outcome = ?outcome,
                "transcript strategy produced nothing"
            );
            attempts.push(self.attempt(strategy, outcome, elapsed));
        }

        warn!("no transcript strategy produced text");
        Transcript {
            text: NO_TRANSCRIPT_SENTINEL.to_string(),
            strategy: None,
            attempts,
        }
    }

    /// Video title from the platform's oEmbed endpoint; `None` on any failure.
    #[instrument(skip(self))]
    pub async fn fetch_title(&self, video_id: &str) -> Option<String> {
        let mut url = self.endpoint("/oembed");
        url.query_pairs_mut()
            .append_pair("url", self.watch_url(video_id).as_str())
            .append_pair("format", "json");

        let body = self
            .get_text(url)
            .await
            .inspect_err(|e| debug!(error = %e, "oembed lookup failed"))
            .ok()?;
        let oembed: OEmbed = serde_json::from_str(&body).ok()?;
        oembed
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
    }

    fn attempt(
        &self,
        strategy: TranscriptStrategy,
        outcome: AttemptOutcome,
        elapsed: Duration,
    ) -> ExtractionAttempt {
        ExtractionAttempt {
            strategy: strategy.name(),
            outcome,
            duration_budget: Some(self.timeout),
            elapsed,
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    pub(crate) fn watch_url(&self, video_id: &str) -> Url {
        let mut url = self.endpoint("/watch");
        url.query_pairs_mut().append_pair("v", video_id);
        url
    }

    /// Resolves caption URLs found in page data, which may be relative.
    pub(crate) fn resolve(&self, href: &str) -> Result<Url, StrategyFailure> {
        self.base_url
            .join(href)
            .map_err(|e| StrategyFailure::Payload(format!("bad caption url: {e}")))
    }

    pub(crate) async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "*/*")
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        response.text().await.map_err(FetchError::from_reqwest_error)
    }
}

/// Chooses a caption track: preferred languages in order (exact code, then
/// same base language), otherwise the first track offered.
pub(crate) fn pick_track<'t, T>(
    tracks: &'t [T],
    languages: &[String],
    code_of: impl Fn(&T) -> &str,
) -> Option<&'t T> {
    let base = |code: &str| code.split('-').next().unwrap_or(code).to_ascii_lowercase();

    languages
        .iter()
        .find_map(|lang| {
            tracks
                .iter()
                .find(|track| code_of(*track).eq_ignore_ascii_case(lang))
        })
        .or_else(|| {
            languages.iter().find_map(|lang| {
                tracks
                    .iter()
                    .find(|track| base(code_of(*track)) == base(lang.as_str()))
            })
        })
        .or_else(|| tracks.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_pick_track_prefers_exact_language_order() {
        let tracks = ["fr", "en-GB", "en"];
        let picked = pick_track(&tracks, &languages(&["en", "en-GB"]), |t| *t);
        assert_eq!(picked, Some(&"en"));
    }

    #[test]
    fn test_pick_track_matches_base_language() {
        let tracks = ["de", "en-US"];
        let picked = pick_track(&tracks, &languages(&["en"]), |t| *t);
        assert_eq!(picked, Some(&"en-US"));
    }

    #[test]
    fn test_pick_track_falls_back_to_first() {
        let tracks = ["ja", "ko"];
        let picked = pick_track(&tracks, &languages(&["en"]), |t| *t);
        assert_eq!(picked, Some(&"ja"));

        let empty: [&str; 0] = [];
        assert_eq!(pick_track(&empty, &languages(&["en"]), |t| *t), None);
    }

    #[test]
    fn test_endpoints_are_built_from_base() {
        let settings = PipelineSettings {
            video_platform_url: Url::parse("http://127.0.0.1:9999/ignored?x=1").unwrap(),
            ..PipelineSettings::default()
        };
        let retriever = TranscriptRetriever::new(&settings).unwrap();
        assert_eq!(
            retriever.watch_url("dQw4w9WgXcQ").as_str(),
            "http://127.0.0.1:9999/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(
            retriever.resolve("/api/timedtext?v=x").unwrap().as_str(),
            "http://127.0.0.1:9999/api/timedtext?v=x"
        );
    }
}
