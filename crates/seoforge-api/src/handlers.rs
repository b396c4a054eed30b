//! Route handler functions for all API endpoints.
//!
//! Each handler extracts query parameters or a JSON body, calls into the
//! services on AppState, and returns JSON.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use seoforge_core::types::{GenerationResult, SavedResult, TrainingExample};
use seoforge_storage::{parse_int_param, SaveRequest, TrainingExampleRequest};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

/// Body of POST /content/generate.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    pub transcript: Option<String>,
}

/// Query parameters for GET /history. Kept as raw strings so that odd input
/// falls back to defaults instead of being rejected.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Query parameters for DELETE /training.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub schema_ready: bool,
}

/// Body of GET /ai/health when the endpoint cannot be reached at all.
#[derive(Debug, Serialize, Deserialize)]
pub struct AiHealthFailure {
    pub ok: bool,
    pub error: String,
}

// =============================================================================
// Content generation
// =============================================================================

/// POST /content/generate - draft content for a transcript.
pub async fn generate_content(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let Json(body) = body?;
    let transcript = body.transcript.unwrap_or_default();

    let outcome = state.generation.generate(&transcript).await?;
    info!(
        id = ?outcome.result.id,
        db_saved = outcome.result.db_saved,
        training_examples = outcome.context.training_examples,
        saved_results = outcome.context.saved_results,
        "Content generated"
    );

    Ok(Json(outcome.result))
}

// =============================================================================
// History and saving
// =============================================================================

/// GET /history - saved results, newest first.
pub async fn history(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<SavedResult>>, ApiError> {
    let Query(params) = params?;
    let limit = parse_int_param(params.limit.as_deref(), state.history.default_limit());
    let offset = parse_int_param(params.offset.as_deref(), 0);

    let rows = state.history.list_history(limit, offset)?;
    Ok(Json(rows))
}

/// POST /results - store a finalized result.
pub async fn save_result(
    State(state): State<AppState>,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SavedResult>, ApiError> {
    let Json(body) = body?;
    let saved = state.saves.save_result(body)?;
    Ok(Json(saved))
}

// =============================================================================
// Training examples
// =============================================================================

/// GET /training - every training example, newest first.
pub async fn list_training(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrainingExample>>, ApiError> {
    Ok(Json(state.training.list_examples()?))
}

/// POST /training - add a training example.
pub async fn create_training(
    State(state): State<AppState>,
    body: Result<Json<TrainingExampleRequest>, JsonRejection>,
) -> Result<Json<TrainingExample>, ApiError> {
    let Json(body) = body?;
    let example = state.training.create_example(body)?;
    Ok(Json(example))
}

/// DELETE /training?id= - remove a training example.
pub async fn delete_training(
    State(state): State<AppState>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Query(params) = params?;
    let success = state.training.delete_example(params.id.as_deref())?;
    Ok(Json(SuccessResponse { success }))
}

// =============================================================================
// Health
// =============================================================================

/// GET /ai/health - ping the AI endpoint and report what came back.
pub async fn ai_health(State(state): State<AppState>) -> Response {
    match state.generation.backend().probe().await {
        Ok(report) => {
            let status = if report.ok {
                StatusCode::OK
            } else {
                StatusCode::BAD_GATEWAY
            };
            (status, Json(report)).into_response()
        }
        Err(e) => {
            error!(error = %e, "AI health probe failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AiHealthFailure {
                    ok: false,
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health - service status.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        schema_ready: state.database.schema_ready(),
    })
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
