//! Last-resort extraction through a third-party provider.
//!
//! The provider is called with the original URL and answers with JSON whose
//! `description` (or `body`) field carries the page text, either at the top
//! level or under `data`. Anything else counts as a failure.

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::PipelineSettings;
use crate::fetcher::{FetchError, build_client};

const API_KEY_HEADER: &str = "x-api-key";
const TEXT_FIELDS: &[&str] = &["description", "body"];

#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("fallback provider request failed: {0}")]
    Request(#[from] FetchError),

    #[error("fallback provider returned an unreadable payload: {0}")]
    Payload(String),

    #[error("fallback provider returned no usable text")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackContent {
    pub title: Option<String>,
    pub text: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FallbackProvider: Send + Sync {
    async fn extract(&self, url: &str) -> Result<FallbackContent, FallbackError>;
}

/// HTTP client for the configured extraction provider.
#[derive(Debug, Clone)]
pub struct ExternalExtractor {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl ExternalExtractor {
    pub fn new(
        endpoint: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint,
            api_key,
        })
    }

    pub fn from_settings(settings: &PipelineSettings) -> Result<Self, FetchError> {
        Self::new(
            settings.fallback_api_url.clone(),
            settings.fallback_api_key.clone(),
            settings.fallback_timeout,
        )
    }
}

#[async_trait]
impl FallbackProvider for ExternalExtractor {
    #[instrument(skip(self))]
    async fn extract(&self, url: &str) -> Result<FallbackContent, FallbackError> {
        let mut endpoint = self.endpoint.clone();
        endpoint.query_pairs_mut().append_pair("url", url);

        let mut request = self
            .client
            .get(endpoint)
            .header(header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status).into());
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| FallbackError::Payload(e.to_string()))?;
        let content = parse_payload(&payload)?;

        info!(chars = content.text.chars().count(), "fallback provider returned text");
        Ok(content)
    }
}

pub fn parse_payload(payload: &Value) -> Result<FallbackContent, FallbackError> {
    let data = payload
        .get("data")
        .filter(|data| data.is_object())
        .unwrap_or(payload);

    let text = TEXT_FIELDS
        .iter()
        .filter_map(|field| data.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .ok_or(FallbackError::Empty)?;

    let title = data
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string);

    debug!(has_title = title.is_some(), "parsed fallback payload");
    Ok(FallbackContent {
        title,
        text: text.to_string(),
    })
}
