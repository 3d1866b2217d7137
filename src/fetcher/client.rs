use crate::config::DEFAULT_PAGE_TIMEOUT;
use crate::fetcher::{
    decode::{body_kind, process_response},
    errors::FetchError,
    types::PageResponse,
};
use once_cell::sync::Lazy;
use reqwest::{
    Client, ClientBuilder,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const MAX_REDIRECTS: usize = 10;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    build_client(DEFAULT_PAGE_TIMEOUT).expect("Failed to build HTTP client")
});

/// Header set of a desktop Chrome navigation request.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    for (name, value) in [
        (
            "sec-ch-ua",
            "\"Chromium\";v=\"124\", \"Google Chrome\";v=\"124\", \"Not-A.Brand\";v=\"99\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
    ] {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    ClientBuilder::new()
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .default_headers(browser_headers())
        .build()
        .map_err(|e| FetchError::Unknown(e.to_string()))
}

pub fn get_client() -> &'static Client {
    &HTTP_CLIENT
}

/// Parses `url` and refuses anything that is not http(s).
pub fn parse_web_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

/// Browser-like GET of a generic page.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        let parsed_url = parse_web_url(url)?;

        let mut response = self
            .client
            .get(parsed_url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let final_url = response.url().clone();
        let status = response.status();
        debug!(status = %status, final_url = %final_url, "page responded");

        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        let Some(kind) = body_kind(&content_type) else {
            return Err(FetchError::UnsupportedContentType(content_type));
        };

        // Content-Length may be missing, wrong, or describe the compressed body
        let mut body_bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(FetchError::from_reqwest_error)?
        {
            let received = (body_bytes.len() + chunk.len()) as u64;
            if received > MAX_BODY_SIZE {
                return Err(FetchError::BodyTooLarge(received));
            }
            body_bytes.extend_from_slice(&chunk);
        }

        process_response(final_url, status, &body_bytes, &content_type, kind)
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::with_client(get_client().clone())
    }
}

pub async fn fetch(url: &str) -> Result<PageResponse, FetchError> {
    PageFetcher::default().fetch(url).await
}
