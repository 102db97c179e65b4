//! mailsift-server - REST API server binary.

use std::net::SocketAddr;

use mailsift_core::SiftConfig;
use mailsift_server::{create_pipeline, create_server, create_server_with_auth, AppState};
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
                .add_directive("mailsift_server=debug".parse()?),
        )
        .init();

    // Configuration file wins over environment variables
    let config = match std::env::var("MAILSIFT_CONFIG") {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            SiftConfig::from_file(&path)?
        }
        Err(_) => SiftConfig::from_env(),
    };
    config.validate()?;

    let require_auth = std::env::var("MAILSIFT_REQUIRE_AUTH").is_ok();
    if require_auth
        && std::env::var("MAILSIFT_API_KEY")
            .unwrap_or_default()
            .is_empty()
    {
        return Err("MAILSIFT_REQUIRE_AUTH is set but MAILSIFT_API_KEY is empty".into());
    }

    let state = AppState::new(create_pipeline(&config)?);

    // Create server with or without auth
    let app = if require_auth {
        info!("Authentication enabled");
        create_server_with_auth(state)
    } else {
        info!("Authentication disabled");
        create_server(state)
    };

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Starting mailsift-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, draining requests...");
        })
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
