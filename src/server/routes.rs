//! HTTP route handlers for service status.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::types::{
    AnalysisInfo, AudioInfo, ConfigResponse, GeneratorInfo, HealthResponse, HealthStatus,
    ServerInfo,
};

use super::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `MessagePack` response wrapper
pub struct MsgPack<T>(pub T);

impl<T: serde::Serialize> IntoResponse for MsgPack<T> {
    fn into_response(self) -> Response {
        match rmp_serde::to_vec_named(&self.0) {
            Ok(bytes) => (
                StatusCode::OK,
                [("content-type", "application/msgpack")],
                bytes,
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize response: {e}"),
            )
                .into_response(),
        }
    }
}

/// Health check endpoint
///
/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> Result<MsgPack<HealthResponse>, AppError> {
    let analyzer_ready = state.analyzer.is_ready();

    // First call may check the encoder and the neural command
    let generator = state.generator.clone();
    let (neural_available, encoder_available) = tokio::task::spawn_blocking(move || {
        (
            generator.neural_available(),
            generator.processor().encoder().is_available(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(format!("Health task failed: {e}")))?;

    let status = if analyzer_ready {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Ok(MsgPack(HealthResponse {
        status,
        version: VERSION.to_string(),
        analyzer_ready,
        neural_available,
        encoder_available,
        uptime_s: state.uptime_seconds(),
    }))
}

/// Configuration endpoint
///
/// GET /api/v1/config
pub async fn config(State(state): State<AppState>) -> Result<MsgPack<ConfigResponse>, AppError> {
    let config = &state.config;

    let generator = state.generator.clone();
    let info = tokio::task::spawn_blocking(move || generator.generation_info())
        .await
        .map_err(|e| AppError::Internal(format!("Config task failed: {e}")))?;

    let (sentiment_backend, embedding_backend) = state.analyzer.backend_names();

    Ok(MsgPack(ConfigResponse {
        analysis: AnalysisInfo {
            sentiment_backend: sentiment_backend.to_string(),
            embedding_backend: embedding_backend.to_string(),
            cuda_enabled: config.model.enable_cuda,
        },
        audio: AudioInfo {
            sample_rate: config.audio.sample_rate,
            duration_s: config.audio.duration_s,
            volume_factor: config.audio.volume_factor,
            normalization_enabled: config.audio.normalization_enabled,
            max_temp_files: config.audio.max_temp_files,
            bitrate_kbps: config.audio.bitrate_kbps,
        },
        generator: GeneratorInfo {
            neural_available: info.neural_available,
            backend_name: info.backend_name,
            output_format: info.output_format,
            history_capacity: config.generator.history_capacity,
        },
        server: ServerInfo {
            host: config.server.host.clone(),
            port: config.server.port,
        },
    }))
}
