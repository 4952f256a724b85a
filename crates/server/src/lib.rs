//! # pressgen-server
//!
//! The HTTP API over the `pressgen` generation pipeline: generate articles,
//! browse and edit them, render images on demand, resolve videos, manage
//! authors and settings, and publish drafts to WordPress.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;

use crate::config::AppConfig;
use tracing::info;

/// Runs the server on the given listener until the task is dropped.
pub async fn run(listener: tokio::net::TcpListener, config: AppConfig) -> anyhow::Result<()> {
    let app_state = state::build_app_state(config).await?;
    let app = router::create_router(app_state);
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
