//! Candidate-region scan and scoring over a pruned document.

use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use tracing::debug;

use crate::extractor::model::{CandidateRegion, normalize_whitespace};

pub const MIN_CANDIDATE_CHARS: usize = 200;
pub const MIN_PARAGRAPH_CHARS: usize = 20;
pub const MIN_AGGREGATE_CHARS: usize = 100;

const CONTAINER_HINTS: &[&str] = &["content", "post", "article", "entry", "text", "body"];

/// Container selectors in scan priority order. The document root and body
/// never compete: their text is a superset of every real container.
static CONTAINER_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    let hinted = |attr: &str| {
        CONTAINER_HINTS
            .iter()
            .map(|hint| format!("[{attr}*='{hint}']:not(html):not(body)"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    [
        "article, main, section, [role='main']".to_string(),
        hinted("class"),
        hinted("id"),
    ]
    .iter()
    .map(|css| Selector::parse(css).unwrap())
    .collect()
});

static PARAGRAPH_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

/// Picks the main text of a pruned document.
///
/// Containers are scored first; single paragraphs only compete when no
/// container reaches [`MIN_CANDIDATE_CHARS`]. Without any qualifying
/// candidate the paragraphs are stitched together, and failing that the
/// whole body text is used.
pub fn select_main_text(document: &Html) -> String {
    let scanned: Vec<(ElementRef<'_>, CandidateRegion)> = CONTAINER_SELECTORS
        .iter()
        .flat_map(|selector| document.select(selector))
        .map(|element| (element, CandidateRegion::new(element_text(element))))
        .collect();
    let containers = scanned
        .iter()
        .filter(|(element, region)| !is_thin_wrapper(*element, region, &scanned))
        .map(|(_, region)| region.clone());

    if let Some(best) = best_candidate(containers) {
        debug!(score = best.score, chars = best.char_len(), "container candidate promoted");
        return best.text;
    }

    let paragraphs = document
        .select(&PARAGRAPH_SELECTOR)
        .map(|element| CandidateRegion::new(element_text(element)));
    if let Some(best) = best_candidate(paragraphs) {
        debug!(score = best.score, chars = best.char_len(), "paragraph candidate promoted");
        return best.text;
    }

    let aggregated = aggregate_paragraphs(document);
    if aggregated.chars().count() >= MIN_AGGREGATE_CHARS {
        debug!("using aggregated paragraph text");
        return aggregated;
    }

    debug!("falling back to whole body text");
    document
        .select(&BODY_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_else(|| element_text(document.root_element()))
}

/// How specific a container is as a content root: articles over main
/// regions over sections over class/id matches.
fn specificity(element: ElementRef<'_>) -> u8 {
    let element = element.value();
    match element.name() {
        "article" => 3,
        "main" => 2,
        _ if element.attr("role") == Some("main") => 2,
        "section" => 1,
        _ => 0,
    }
}

/// A wrapper whose only extra text over a more specific qualifying container
/// inside it is below [`MIN_CANDIDATE_CHARS`] (bylines, bread crumbs, labels).
fn is_thin_wrapper(
    wrapper: ElementRef<'_>,
    region: &CandidateRegion,
    scanned: &[(ElementRef<'_>, CandidateRegion)],
) -> bool {
    let rank = specificity(wrapper);
    scanned.iter().any(|(inner, inner_region)| {
        inner.id() != wrapper.id()
            && specificity(*inner) > rank
            && inner_region.char_len() >= MIN_CANDIDATE_CHARS
            && inner.ancestors().any(|ancestor| ancestor.id() == wrapper.id())
            && region.char_len().saturating_sub(inner_region.char_len()) < MIN_CANDIDATE_CHARS
    })
}

/// Highest score wins; on ties the earlier (higher-priority) candidate stays.
fn best_candidate(candidates: impl Iterator<Item = CandidateRegion>) -> Option<CandidateRegion> {
    candidates
        .filter(|candidate| candidate.char_len() >= MIN_CANDIDATE_CHARS)
        .fold(None, |best: Option<CandidateRegion>, candidate| match best {
            Some(current) if current.score >= candidate.score => Some(current),
            _ => Some(candidate),
        })
}

fn aggregate_paragraphs(document: &Html) -> String {
    document
        .select(&PARAGRAPH_SELECTOR)
        .map(element_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tag-free text of `element` with whitespace collapsed. Block boundaries
/// become spaces so adjacent paragraphs do not run together.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => raw.push(' '),
            _ => {}
        }
    }
    normalize_whitespace(&raw)
}
