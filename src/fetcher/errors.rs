use thiserror::Error;

use crate::entities::FailureKind;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("dns or connection failure: {0}")]
    Connect(String),

    #[error("tls error: {0}")]
    Tls(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("access blocked by the site (403)")]
    Blocked,

    #[error("page not found (404)")]
    NotFound,

    #[error("rate limited by the site (429)")]
    RateLimited,

    #[error("server error {0}")]
    ServerError(reqwest::StatusCode),

    #[error("http error {0}")]
    Http(reqwest::StatusCode),

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("charset error: {0}")]
    Charset(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    pub fn should_retry(&self) -> bool {
        self.kind().retry_allowance(1) > 0
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Blocked => FailureKind::Blocked,
            Self::NotFound => FailureKind::NotFound,
            Self::RateLimited => FailureKind::RateLimited,
            Self::ServerError(_) => FailureKind::ServerError,

            Self::Connect(_)
            | Self::ConnectTimeout
            | Self::RequestTimeout
            | Self::Io(_)
            | Self::Unknown(_) => FailureKind::NetworkOrTimeout,

            // A bad certificate or a redirect cycle will not fix itself between attempts.
            Self::Tls(_)
            | Self::RedirectLoop
            | Self::InvalidUrl(_)
            | Self::UnsupportedScheme(_)
            | Self::Http(_)
            | Self::BodyTooLarge(_)
            | Self::UnsupportedContentType(_)
            | Self::Charset(_) => FailureKind::Unprocessable,
        }
    }

    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            403 => Self::Blocked,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            _ if status.is_server_error() => Self::ServerError(status),
            _ => Self::Http(status),
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::from_status(status)
        } else if err.is_connect() || err.is_request() {
            Self::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Io(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}
