use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::{
    api::dtos::{ErrorResponse, ExtractPayload},
    app_state::AppState,
    entities::ExtractionResult,
    pipeline::ExtractionError,
};

impl ExtractionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_) | Self::UnsupportedScheme(_) => StatusCode::BAD_REQUEST,
            Self::AllMethodsFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExtractionError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[utoipa::path(
    post,
    path = "/v1/extract",
    tag = "extraction",
    request_body = ExtractPayload,
    responses(
        (status = 200, description = "Extracted text", body = ExtractionResult),
        (status = 400, description = "Missing or malformed URL", body = ErrorResponse),
        (status = 500, description = "Every extraction method failed", body = ErrorResponse)
    )
)]
pub async fn extract(
    State(state): State<AppState>,
    payload: Result<Json<ExtractPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: rejection.body_text(),
                }),
            )
                .into_response();
        }
    };

    let request = match payload.validate() {
        Ok(request) => request,
        Err(error) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response();
        }
    };

    match state.pipeline.extract(&request).await {
        Ok(result) => {
            info!(
                url = %result.url,
                method = ?result.extraction_method,
                chars = result.original_length,
                truncated = result.truncated,
                "extraction succeeded"
            );
            Json(result).into_response()
        }
        Err(e) => {
            if e.status_code().is_server_error() {
                error!(url = %request.url, error = %e, "extraction failed");
            } else {
                warn!(url = %request.url, error = %e, "extraction rejected");
            }
            e.into_response()
        }
    }
}
