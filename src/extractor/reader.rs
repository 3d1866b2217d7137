use readability::extractor;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::extractor::{
    ContentExtractor, ExtractError, boilerplate,
    model::{PageContent, normalize_whitespace},
};

static OG_TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[property='og:title']").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static H1_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());

/// og:title, then `<title>`, then the first non-empty `<h1>`.
pub fn extract_title(document: &Html) -> Option<String> {
    let og_title = document
        .select(&OG_TITLE_SELECTOR)
        .filter_map(|element| element.value().attr("content"))
        .map(normalize_whitespace)
        .find(|title| !title.is_empty());
    if og_title.is_some() {
        return og_title;
    }

    [&*TITLE_SELECTOR, &*H1_SELECTOR]
        .into_iter()
        .flat_map(|selector| document.select(selector))
        .map(|element| normalize_whitespace(&element.text().collect::<String>()))
        .find(|title| !title.is_empty())
}

/// Mozilla-style readability scoring from the `readability` crate.
///
/// Heavier than the heuristic scorer but better on link-dense layouts; it
/// plugs into the pipeline through [`ContentExtractor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityExtractor;

impl ContentExtractor for ReadabilityExtractor {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn extract(&self, markup: &str, url: &Url) -> Result<PageContent, ExtractError> {
        let product = extractor::extract(&mut markup.as_bytes(), url)
            .map_err(|e| ExtractError::Parse(e.to_string()))?;

        let text = boilerplate::strip(&product.text);
        let title = Some(normalize_whitespace(&product.title)).filter(|t| !t.is_empty());
        super::require_meaningful(PageContent { title, text })
    }
}
