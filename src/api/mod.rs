pub mod dtos;
pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{app_state::AppState, entities, health};

#[derive(OpenApi)]
#[openapi(
    paths(handlers::extract, health::health_check),
    components(schemas(
        dtos::ExtractPayload,
        dtos::ErrorResponse,
        entities::ExtractionResult,
        entities::ExtractionMethod,
        health::HealthResponse
    )),
    tags(
        (name = "extraction", description = "Readable text from web pages and video transcripts"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/extract", post(handlers::extract))
        .route("/healthz", get(health::health_check))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}
