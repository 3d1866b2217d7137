pub mod boilerplate;
pub mod candidates;
pub mod cleaner;
pub mod language;
pub mod model;
pub mod reader;

#[cfg(test)]
mod tests;

pub use model::{CandidateRegion, PageContent};
pub use reader::ReadabilityExtractor;

use scraper::Html;
use thiserror::Error;
use url::Url;

use crate::fetcher::types::{BodyKind, PageResponse};

/// Below this many characters a page is treated as having no usable text.
pub const MIN_CONTENT_CHARS: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no meaningful content ({chars} characters after cleanup)")]
    NoMeaningfulContent { chars: usize },

    #[error("markup could not be parsed: {0}")]
    Parse(String),
}

/// Turns page markup into main text. Implementations must be deterministic.
pub trait ContentExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, markup: &str, url: &Url) -> Result<PageContent, ExtractError>;
}

/// Prunes structural chrome, then promotes the best-scoring candidate region.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl ContentExtractor for HeuristicExtractor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn extract(&self, markup: &str, _url: &Url) -> Result<PageContent, ExtractError> {
        let mut document = Html::parse_document(markup);
        // Title first: the <h1> may sit in a header that pruning removes.
        let title = reader::extract_title(&document);

        cleaner::prune(&mut document);
        let main_text = candidates::select_main_text(&document);
        let text = boilerplate::strip(&main_text);

        require_meaningful(PageContent { title, text })
    }
}

/// Runs `extractor` over a fetched page; plain-text bodies skip markup parsing.
pub fn extract_page(
    extractor: &dyn ContentExtractor,
    page: &PageResponse,
) -> Result<PageContent, ExtractError> {
    match page.body_kind {
        BodyKind::Markup => extractor.extract(&page.body_utf8, &page.url_final),
        BodyKind::PlainText => require_meaningful(PageContent {
            title: None,
            text: boilerplate::strip(&page.body_utf8),
        }),
    }
}

fn require_meaningful(content: PageContent) -> Result<PageContent, ExtractError> {
    let chars = content.text.chars().count();
    if chars < MIN_CONTENT_CHARS {
        return Err(ExtractError::NoMeaningfulContent { chars });
    }
    Ok(content)
}
