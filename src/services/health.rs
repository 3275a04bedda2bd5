// src/services/health.rs

//! Minimal HTTP listener for the hosting platform's liveness check.
//!
//! The platform only needs the port to accept connections; no application
//! routes are exposed.

use axum::Router;
use tokio::net::TcpListener;

use crate::error::Result;

/// Bind the listener and serve until the process exits.
pub async fn serve(port: u16) -> Result<()> {
    let app = Router::new();
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;

    log::info!("Listening on port {}.", port);
    axum::serve(listener, app).await?;

    Ok(())
}
