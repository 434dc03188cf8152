//! Mood analysis route handlers.

use axum::extract::State;
use tracing::debug;

use crate::error::AppError;
use crate::mood::{MusicalParameters, MOOD_PROFILES};
use crate::types::{AnalyzeRequest, MoodInfo, MoodListResponse};

use super::extractors::ApiBody;
use super::routes::MsgPack;
use super::AppState;

/// POST /api/v1/mood/analyze
///
/// Empty text yields the default parameters rather than an error.
pub async fn analyze(
    State(state): State<AppState>,
    ApiBody(req): ApiBody<AnalyzeRequest>,
) -> Result<MsgPack<MusicalParameters>, AppError> {
    debug!(chars = req.text.len(), "Analyzing mood");

    let analyzer = state.analyzer.clone();
    let params = tokio::task::spawn_blocking(move || analyzer.analyze(&req.text))
        .await
        .map_err(|e| AppError::Internal(format!("Analysis task failed: {e}")))?;

    Ok(MsgPack(params))
}

/// GET /api/v1/mood/list
pub async fn list_moods(State(_state): State<AppState>) -> MsgPack<MoodListResponse> {
    MsgPack(MoodListResponse {
        moods: MOOD_PROFILES.iter().map(MoodInfo::from).collect(),
    })
}
