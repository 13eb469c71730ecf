use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use super::ApiError;
use crate::{extractors::AppJson, models::CreateSessionRequest, services::AppState};

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    tracing::info!(
        "Creating session for user_id={}, category_id={}",
        req.user_id,
        req.category_id
    );

    let bundle = state
        .sessions
        .create_session(&req.user_id, &req.category_id, req.mode.as_deref())
        .await
        .map_err(|e| {
            tracing::warn!("Failed to create session: {}", e);
            ApiError::from(e)
        })?;

    Ok((StatusCode::CREATED, Json(bundle)))
}
