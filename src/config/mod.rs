//! Configuration handling for the extraction service.
//!
//! `Config::from_env` reads the process environment with development defaults,
//! and `Config::pipeline_settings` turns it into the tunables the extraction
//! pipeline runs with. Tests usually skip the environment entirely and build a
//! `PipelineSettings` by hand pointing at mock servers.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use url::Url;

/// Environment variable names.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_FALLBACK_API_URL: &str = "FALLBACK_API_URL";
pub const ENV_FALLBACK_API_KEY: &str = "FALLBACK_API_KEY";
pub const ENV_TRANSCRIPT_LANGUAGES: &str = "TRANSCRIPT_LANGUAGES";
pub const ENV_VIDEO_PLATFORM_URL: &str = "VIDEO_PLATFORM_URL";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_FALLBACK_API_URL: &str = "https://api.microlink.io";
const DEFAULT_TRANSCRIPT_LANGUAGES: &str = "en,en-US,en-GB";
const DEFAULT_VIDEO_PLATFORM_URL: &str = "https://www.youtube.com";

pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_TRANSCRIPT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 100_000;
pub const DEFAULT_MIN_TRANSCRIPT_CHARS: usize = 100;

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    fallback_api_url: Url,
    fallback_api_key: Option<String>,
    transcript_languages: Vec<String>,
    video_platform_url: Url,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let fallback_api_url = parse_url_var(
            ENV_FALLBACK_API_URL,
            "fallback_api_url",
            DEFAULT_FALLBACK_API_URL,
        )?;
        let video_platform_url = parse_url_var(
            ENV_VIDEO_PLATFORM_URL,
            "video_platform_url",
            DEFAULT_VIDEO_PLATFORM_URL,
        )?;

        let fallback_api_key = env::var(ENV_FALLBACK_API_KEY)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let raw_languages = env::var(ENV_TRANSCRIPT_LANGUAGES)
            .unwrap_or_else(|_| DEFAULT_TRANSCRIPT_LANGUAGES.to_string());
        let transcript_languages = parse_languages(&raw_languages);
        if transcript_languages.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "transcript_languages",
                reason: "at least one language code is required".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            fallback_api_url,
            fallback_api_key,
            transcript_languages,
            video_platform_url,
        })
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Base URL of the third-party extraction provider.
    pub fn fallback_api_url(&self) -> &Url {
        &self.fallback_api_url
    }
    pub fn fallback_api_key(&self) -> Option<&str> {
        self.fallback_api_key.as_deref()
    }
    /// Caption languages in preference order.
    pub fn transcript_languages(&self) -> &[String] {
        &self.transcript_languages
    }
    pub fn video_platform_url(&self) -> &Url {
        &self.video_platform_url
    }

    /// Pipeline tunables with the production timeouts and limits.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            video_platform_url: self.video_platform_url.clone(),
            fallback_api_url: self.fallback_api_url.clone(),
            fallback_api_key: self.fallback_api_key.clone(),
            transcript_languages: self.transcript_languages.clone(),
            ..PipelineSettings::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let settings = PipelineSettings::default();
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            fallback_api_url: settings.fallback_api_url,
            fallback_api_key: None,
            transcript_languages: settings.transcript_languages,
            video_platform_url: settings.video_platform_url,
        }
    }
}

/// Everything the extraction pipeline needs to run one request.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub video_platform_url: Url,
    pub fallback_api_url: Url,
    pub fallback_api_key: Option<String>,
    pub transcript_languages: Vec<String>,
    pub page_timeout: Duration,
    pub fallback_timeout: Duration,
    pub transcript_timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub max_content_chars: usize,
    pub min_transcript_chars: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            video_platform_url: Url::parse(DEFAULT_VIDEO_PLATFORM_URL)
                .expect("default video platform url is valid"),
            fallback_api_url: Url::parse(DEFAULT_FALLBACK_API_URL)
                .expect("default fallback url is valid"),
            fallback_api_key: None,
            transcript_languages: parse_languages(DEFAULT_TRANSCRIPT_LANGUAGES),
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
            transcript_timeout: DEFAULT_TRANSCRIPT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            min_transcript_chars: DEFAULT_MIN_TRANSCRIPT_CHARS,
        }
    }
}

fn parse_url_var(key: &str, field: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })
}

fn parse_languages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect()
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
