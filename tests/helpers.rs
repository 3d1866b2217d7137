#![allow(dead_code)]

use std::time::Duration;
use url::Url;
use wiremock::MockServer;

use siphon::{config::PipelineSettings, pipeline::Pipeline};

pub const VIDEO_ID: &str = "dQw4w9WgXcQ";

/// Settings pointing every outbound dependency at local mock servers, with
/// millisecond backoff so retry tests stay fast.
pub fn test_settings(video_platform: &MockServer, provider: &MockServer) -> PipelineSettings {
    PipelineSettings {
        video_platform_url: Url::parse(&video_platform.uri()).unwrap(),
        fallback_api_url: Url::parse(&format!("{}/extract", provider.uri())).unwrap(),
        fallback_api_key: Some("test-key".to_string()),
        page_timeout: Duration::from_millis(500),
        fallback_timeout: Duration::from_secs(2),
        transcript_timeout: Duration::from_secs(2),
        backoff_base: Duration::from_millis(10),
        ..PipelineSettings::default()
    }
}

pub fn test_pipeline(video_platform: &MockServer, provider: &MockServer) -> Pipeline {
    Pipeline::new(test_settings(video_platform, provider)).unwrap()
}

/// An article page whose main text comfortably clears every extraction threshold.
pub fn article_page(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!(
        r#"<html><head><title>{title}</title></head><body>
        <nav><a href="/">Home</a><a href="/about">About</a></nav>
        <article>{body}</article>
        <footer>Copyright 2024 Example Inc. All rights reserved.</footer>
        </body></html>"#
    )
}

pub fn long_caption_text() -> String {
    "This is a spoken sentence from the video about building resilient systems. ".repeat(4)
}
