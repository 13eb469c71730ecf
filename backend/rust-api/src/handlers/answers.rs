use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use super::ApiError;
use crate::{extractors::AppJson, models::AnswerEvent, services::AppState};

/// POST /api/v1/answers. Responds as soon as the answer is scored; storage
/// happens in the background.
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    AppJson(event): AppJson<AnswerEvent>,
) -> Result<impl IntoResponse, ApiError> {
    event.validate()?;

    let reward = state.answers.submit_answer(event).await;
    Ok(Json(reward))
}
