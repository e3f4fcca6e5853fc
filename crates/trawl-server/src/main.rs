//! trawl-server - REST API server binary.

use std::net::SocketAddr;

use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trawl_server::factory::{build_pipeline, PipelineSettings};
use trawl_server::{create_server, AppState};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("trawl_server=debug".parse()?),
        )
        .init();

    // Get configuration from environment
    let host = std::env::var("TRAWL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("TRAWL_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    // Assemble the pipeline and its collaborators
    let settings = PipelineSettings::from_env();
    let (pipeline, documents) = build_pipeline(&settings)?;
    info!(
        snapshot = %settings.snapshot_path,
        indexed = pipeline.sparse_index().doc_count(),
        "Pipeline assembled"
    );

    let state = AppState::new(pipeline, documents);
    let app = create_server(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting trawl-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
