//! HTTP server setup and routing.

mod extractors;
mod generate;
mod mood;
mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::audio::AudioPostProcessor;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::generator::MusicGenerator;
use crate::history::{HistorySink, RecentHistory};
use crate::mood::MoodAnalyzer;

pub use extractors::{ApiBody, BodyRejection};
pub use routes::MsgPack;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analyzer: Arc<MoodAnalyzer>,
    pub generator: Arc<MusicGenerator>,
    pub history: Arc<RecentHistory>,
    pub started_at: Instant,
}

impl AppState {
    /// Build analyzer, post-processor and generator from configuration
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let analyzer = Arc::new(MoodAnalyzer::from_config(&config.model));
        let processor = AudioPostProcessor::new(config.audio.clone())
            .map_err(|e| AppError::Internal(format!("Failed to prepare temp dir: {e}")))?;
        let generator = MusicGenerator::new(analyzer.clone(), processor, config.generator.clone());

        Ok(Self::with_generator(config, generator))
    }

    /// Wrap an existing generator; history is attached here
    pub fn with_generator(config: AppConfig, generator: MusicGenerator) -> Self {
        let history = Arc::new(RecentHistory::new(config.generator.history_capacity));
        let analyzer = generator.analyzer_handle();
        let generator = generator.with_history(history.clone() as Arc<dyn HistorySink>);

        Self {
            config: Arc::new(config),
            analyzer,
            generator: Arc::new(generator),
            history,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Creates the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(routes::health))
        .route("/config", get(routes::config))
        .route("/mood/analyze", post(mood::analyze))
        .route("/mood/list", get(mood::list_moods))
        .route("/generate", post(generate::generate))
        .route("/history", get(generate::history));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
