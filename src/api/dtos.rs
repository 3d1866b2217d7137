use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::ExtractionRequest;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractPayload {
    /// Absolute http(s) URL of the page or video to extract.
    pub url: String,
}

impl ExtractPayload {
    pub fn validate(&self) -> Result<ExtractionRequest, String> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err("URL is required".to_string());
        }
        if url.chars().count() > MAX_URL_LENGTH {
            return Err(format!("URL must be at most {MAX_URL_LENGTH} characters"));
        }
        Ok(ExtractionRequest::new(url))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
