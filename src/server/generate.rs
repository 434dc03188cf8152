//! Generation and history route handlers.

use axum::{
    extract::{Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderName, HeaderValue,
    },
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::generator::GenerationInput;
use crate::types::{GenerateRequest, HistoryQuery, HistoryResponse};

use super::extractors::ApiBody;
use super::routes::MsgPack;
use super::AppState;

pub const GENERATION_METHOD_HEADER: &str = "x-generation-method";

impl TryFrom<GenerateRequest> for GenerationInput {
    type Error = AppError;

    fn try_from(req: GenerateRequest) -> Result<Self, Self::Error> {
        match (req.parameters, req.text) {
            (Some(params), _) => {
                params.validate().map_err(|e| {
                    AppError::BadRequest(format!("Invalid parameters: {e}"))
                })?;
                Ok(GenerationInput::Parameters(params))
            }
            (None, Some(text)) => Ok(GenerationInput::Text(text)),
            (None, None) => Err(AppError::BadRequest(
                "Either text or parameters must be provided".to_string(),
            )),
        }
    }
}

/// POST /api/v1/generate
///
/// Responds with the audio file itself.
pub async fn generate(
    State(state): State<AppState>,
    ApiBody(req): ApiBody<GenerateRequest>,
) -> Result<Response, AppError> {
    let input = GenerationInput::try_from(req)?;

    let generator = state.generator.clone();
    let track = tokio::task::spawn_blocking(move || generator.generate(input))
        .await
        .map_err(|e| AppError::Internal(format!("Generation task failed: {e}")))??;

    let filename = track
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("track");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::Internal(format!("Invalid file name: {e}")))?;

    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static(track.mime_type)),
        (CONTENT_DISPOSITION, disposition),
        (
            HeaderName::from_static(GENERATION_METHOD_HEADER),
            HeaderValue::from_static(track.method.as_str()),
        ),
    ];

    Ok((headers, track.bytes).into_response())
}

/// GET /api/v1/history?limit=N
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> MsgPack<HistoryResponse> {
    MsgPack(HistoryResponse {
        records: state.history.recent(query.limit),
    })
}
