//! Main entry point for the Carelink portal server.
//!
//! Seeds the in-memory demo store, restores any persisted session marker
//! and serves the REST API (with OpenAPI/Swagger documentation) on the
//! configured address.

use std::path::PathBuf;

use api_rest::{bootstrap, router};
use carelink_core::constants::DEFAULT_STATE_DIR;
use carelink_core::CoreConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Starts the Carelink REST server.
///
/// # Environment Variables
/// - `CARELINK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CARELINK_STATE_DIR`: Directory for the persisted session marker
///   (default: "carelink_state")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carelink=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CARELINK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let state_dir = std::env::var("CARELINK_STATE_DIR").unwrap_or_else(|_| DEFAULT_STATE_DIR.into());

    tracing::info!("++ Starting Carelink REST on {}", addr);

    let cfg = CoreConfig::new(PathBuf::from(state_dir))?;
    let state = bootstrap(&cfg)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
