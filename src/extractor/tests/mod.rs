use chrono::Utc;
use reqwest::StatusCode;
use std::fs;
use url::Url;

use crate::extractor::{
    ContentExtractor, ExtractError, HeuristicExtractor, MIN_CONTENT_CHARS, extract_page,
    language::detect_language,
};
use crate::fetcher::types::{BodyKind, Charset, PageResponse};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn url() -> Url {
    Url::parse("https://example.com/article").unwrap()
}

#[test]
fn test_extract_article() {
    let content = HeuristicExtractor.extract(&fixture("article.html"), &url()).unwrap();

    assert_eq!(content.title.as_deref(), Some("Sample Article"));
    assert_eq!(
        content.text,
        "Sample Article This is the first paragraph of the article. It explains why river levels \
         rose across the valley during the spring thaw. This is the second paragraph of the article. \
         Engineers measured the flow at three gauging stations and compared it with last year. \
         Residents were advised to keep sandbags ready until the forecast improves."
    );
}

#[test]
fn test_extract_blog_post() {
    let content = HeuristicExtractor.extract(&fixture("blog.html"), &url()).unwrap();

    assert_eq!(
        content.title.as_deref(),
        Some("How to Build Better Software | Tech Blog")
    );
    assert!(content.text.starts_with("How to Build Better Software Building better software"));
    assert!(content.text.contains("Key Principles Keep changes small and reviewable."));
    assert!(!content.text.contains("Subscribe"));
    assert!(!content.text.contains("About"));
    assert_eq!(detect_language(&content.text), Some("en".to_string()));
}

#[test]
fn test_reject_empty_page() {
    let result = HeuristicExtractor.extract(&fixture("empty.html"), &url());
    assert!(matches!(
        result,
        Err(ExtractError::NoMeaningfulContent { chars }) if chars < MIN_CONTENT_CHARS
    ));
}

#[test]
fn test_only_article_text_is_promoted() {
    let body = "Solar output in the region doubled over the decade, driven by rooftop installs. \
                Grid operators now schedule maintenance around midday peaks. "
        .repeat(3);
    let markup = format!(
        r#"<html><body>
        <nav>Home News Contact</nav>
        <div>Short line.</div>
        <article>
          <p>{body}</p>
          <p>Follow us on Facebook</p>
        </article>
        <footer>All rights reserved.</footer>
        </body></html>"#
    );

    let content = HeuristicExtractor.extract(&markup, &url()).unwrap();
    assert_eq!(content.text, body.trim());
}

#[test]
fn test_body_class_hint_does_not_outrank_article() {
    let body = "Solar output in the region doubled over the decade, driven by rooftop installs. \
                Grid operators now schedule maintenance around midday peaks. "
        .repeat(3);
    for body_class in ["single-post", "post-template"] {
        let markup = format!(
            r#"<html><body class="{body_class}">
            <div class="byline">By Ann Lee</div>
            <article><p>{body}</p></article>
            </body></html>"#
        );

        let content = HeuristicExtractor.extract(&markup, &url()).unwrap();
        assert_eq!(content.text, body.trim());
    }
}

#[test]
fn test_article_inside_thin_wrapper_is_promoted() {
    let body = "Solar output in the region doubled over the decade, driven by rooftop installs. \
                Grid operators now schedule maintenance around midday peaks. "
        .repeat(3);
    let markup = format!(
        r#"<html><body>
        <div id="content" class="post-wrapper">
          <div class="byline">By Ann Lee, 3 May</div>
          <article><p>{body}</p></article>
        </div>
        </body></html>"#
    );

    let content = HeuristicExtractor.extract(&markup, &url()).unwrap();
    assert_eq!(content.text, body.trim());
}

#[test]
fn test_extraction_is_idempotent() {
    let markup = fixture("article.html");
    let first = HeuristicExtractor.extract(&markup, &url()).unwrap();
    let second = HeuristicExtractor.extract(&markup, &url()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_html() {
    let markup = format!(
        "<html><head><title>Broken</title><body><p>Unclosed tags<div>{}",
        "More content that keeps going without closing anything at all. ".repeat(4)
    );

    let content = HeuristicExtractor.extract(&markup, &url()).unwrap();
    assert_eq!(content.title.as_deref(), Some("Broken"));
    assert!(content.text.contains("Unclosed tags"));
}

#[test]
fn test_plain_text_pages_skip_markup_parsing() {
    let text = "Plain text notes about <b>markup</b> that should stay literal. ".repeat(3);
    let page = PageResponse {
        url_final: url(),
        status: StatusCode::OK,
        body_kind: BodyKind::PlainText,
        body_utf8: text.clone(),
        charset: Charset::Utf8,
        fetched_at: Utc::now(),
    };

    let content = extract_page(&HeuristicExtractor, &page).unwrap();
    assert_eq!(content.title, None);
    assert!(content.text.contains("<b>markup</b>"));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(markup in ".*") {
            let _ = HeuristicExtractor.extract(&markup, &url());
        }

        #[test]
        fn test_extract_is_deterministic(markup in ".*") {
            let first = HeuristicExtractor.extract(&markup, &url());
            let second = HeuristicExtractor.extract(&markup, &url());
            prop_assert_eq!(first, second);
        }
    }
}
