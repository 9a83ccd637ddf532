//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the Carelink REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main
//! `carelink-run` binary is the normal entry point and serves the same
//! router.

use std::path::PathBuf;

use api_rest::{bootstrap, router};
use carelink_core::constants::DEFAULT_STATE_DIR;
use carelink_core::CoreConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Carelink REST API server.
///
/// # Environment Variables
/// - `CARELINK_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CARELINK_STATE_DIR`: Directory for the persisted session marker
///   (default: "carelink_state")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the seed dataset fails to build,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CARELINK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let state_dir = std::env::var("CARELINK_STATE_DIR").unwrap_or_else(|_| DEFAULT_STATE_DIR.into());

    tracing::info!("-- Starting Carelink REST API on {}", addr);

    let cfg = CoreConfig::new(PathBuf::from(state_dir))?;
    let state = bootstrap(&cfg)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
