//! # shop-server
//!
//! Storefront backend: accounts, catalog, coupons and orders over MongoDB.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export JWT_SECRET=change-me
//! export MONGODB_URI=mongodb://localhost:27017
//! export MONGODB_DATABASE=shop
//!
//! # Run the server
//! shop-server
//! ```

use shop_api::{routes, AppConfig, AppState};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Print banner
    print_banner();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    info!("Environment: {}", config.environment);

    // Initialize application state
    let state = AppState::connect(config).await?;
    info!("Store backend: {}", state.repos.backend());
    info!("Session tokens valid for {}s", state.tokens.ttl().num_seconds());

    // Create router
    let app = routes::create_router(state.clone());

    // Start server
    info!("🛒 Shop backend starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🔑 Login: POST http://{}/api/auth/login", addr);
        info!("🏷  Coupons: GET http://{}/api/coupons", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}

fn print_banner() {
    println!(
        r#"
  🛒 Shop Backend 🛒
  ━━━━━━━━━━━━━━━━━━━━━━━
  Accounts, catalog, coupons, orders
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
