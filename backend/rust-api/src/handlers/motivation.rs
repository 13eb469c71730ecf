use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use super::ApiError;
use crate::{extractors::AppQuery, models::MotivationQuery, services::AppState};

/// GET /api/v1/motivation?user_id=..&category_id=..&correct_ratio=..
pub async fn get_motivation(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<MotivationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query.validate()?;

    let message = state
        .motivation
        .message_for(&query.user_id, &query.category_id, query.correct_ratio)
        .await;
    Ok(Json(message))
}
