#![no_main]

use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use reqwest::StatusCode;
use url::Url;

use siphon::extractor::{HeuristicExtractor, extract_page};
use siphon::fetcher::{BodyKind, Charset, PageResponse};

fuzz_target!(|data: &[u8]| {
    // Convert raw bytes to string, handling invalid UTF-8 gracefully
    let html = String::from_utf8_lossy(data).to_string();

    for body_kind in [BodyKind::Markup, BodyKind::PlainText] {
        let response = PageResponse {
            url_final: Url::parse("https://example.com").unwrap(),
            status: StatusCode::OK,
            body_kind,
            body_utf8: html.clone(),
            charset: Charset::Utf8,
            fetched_at: Utc::now(),
        };

        // The extractor should never panic regardless of input
        let _ = extract_page(&HeuristicExtractor, &response);
    }
});
