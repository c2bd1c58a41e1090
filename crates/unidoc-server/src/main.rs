//! unidoc-server - HTTP API binary.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unidoc_core::{Database, Extractor, ReportRenderer, UnidocCore};
use unidoc_server::{create_server, AppState, Config};

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
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("unidoc_server=debug".parse()?),
        )
        .init();

    let config = Config::load().context("Failed to load configuration")?;

    let db = Database::open(&config.database.path).with_context(|| {
        format!("Failed to open database at {}", config.database.path.display())
    })?;
    let catalog = config.catalog();
    info!(
        medications = catalog.medications.len(),
        investigations = catalog.investigations.len(),
        db = %config.database.path.display(),
        reports = %config.reports.output_dir.display(),
        "Loaded configuration"
    );

    let core = UnidocCore::new(
        db,
        Extractor::with_catalog(&catalog),
        ReportRenderer::new(config.reports.clone()),
    );
    let app = create_server(AppState::new(core));

    // Start server
    let addr: SocketAddr = config.server.addr().context("Invalid listen address")?;
    info!("Starting unidoc-server on {}", addr);

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
