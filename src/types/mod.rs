//! Request and response types for the HTTP API.

pub mod api;

use serde::{Deserialize, Serialize};

pub use api::*;

use crate::audio::OutputFormat;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// Mood reference embeddings are built
    pub analyzer_ready: bool,
    #[serde(default)]
    pub neural_available: bool,
    #[serde(default)]
    pub encoder_available: bool,
    pub uptime_s: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, but every analysis returns default parameters
    Degraded,
}

/// Configuration response (subset of config safe to expose)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub analysis: AnalysisInfo,
    pub audio: AudioInfo,
    pub generator: GeneratorInfo,
    pub server: ServerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInfo {
    pub sentiment_backend: String,
    pub embedding_backend: String,
    pub cuda_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub duration_s: f32,
    pub volume_factor: f32,
    pub normalization_enabled: bool,
    pub max_temp_files: usize,
    pub bitrate_kbps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub neural_available: bool,
    pub backend_name: String,
    pub output_format: OutputFormat,
    pub history_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub host: String,
    pub port: u16,
}
