//! moodwave - Entry Point

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moodwave::{config::AppConfig, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("Starting moodwave");

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config from environment: {e}, using defaults");
        AppConfig::default()
    });

    info!(
        sample_rate = config.audio.sample_rate,
        duration_s = config.audio.duration_s,
        temp_dir = %config.audio.temp_dir.display(),
        cuda = config.model.enable_cuda,
        "Configuration loaded"
    );

    let addr = config
        .server
        .socket_addr()
        .context("Invalid server address")?;

    let state = server::AppState::new(config).context("Failed to initialize services")?;

    let (sentiment, embedding) = state.analyzer.backend_names();
    info!(sentiment, embedding, ready = state.analyzer.is_ready(), "Mood analyzer ready");

    // Detect the neural generator and check the encoder once, off the runtime
    let generator = state.generator.clone();
    let info = tokio::task::spawn_blocking(move || generator.generation_info())
        .await
        .context("Backend detection task failed")?;
    info!(
        backend = %info.backend_name,
        neural = info.neural_available,
        format = info.output_format.extension(),
        "Synthesis backend selected"
    );

    let app = server::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodwave=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
