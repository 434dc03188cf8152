//! Request body extractor.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::error_response;

/// Rejection type for [`ApiBody`]
#[derive(Debug)]
pub struct BodyRejection {
    message: String,
}

impl BodyRejection {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        error_response(StatusCode::BAD_REQUEST, "DESERIALIZATION_ERROR", self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    MsgPack,
    Json,
}

/// Missing content type is read as `MessagePack`
fn body_format(content_type: &str) -> Option<BodyFormat> {
    if content_type.is_empty() || content_type.contains("msgpack") {
        Some(BodyFormat::MsgPack)
    } else if content_type.starts_with("application/json") {
        Some(BodyFormat::Json)
    } else {
        None
    }
}

/// Request body in `MessagePack` (`application/msgpack`,
/// `application/x-msgpack`) or JSON.
pub struct ApiBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let format = body_format(&content_type).ok_or_else(|| {
            BodyRejection::new(format!(
                "Invalid content type: expected application/msgpack or application/json, got {content_type}"
            ))
        })?;

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| BodyRejection::new(format!("Failed to read request body: {e}")))?;

        match format {
            BodyFormat::MsgPack => rmp_serde::from_slice(&bytes)
                .map(ApiBody)
                .map_err(|e| BodyRejection::new(format!("Failed to deserialize MessagePack: {e}"))),
            BodyFormat::Json => serde_json::from_slice(&bytes)
                .map(ApiBody)
                .map_err(|e| BodyRejection::new(format!("Failed to deserialize JSON: {e}"))),
        }
    }
}
