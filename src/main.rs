//! Livability engine server.
//!
//! Loads a reference dataset and serves the affordability and livability
//! endpoints.
//!
//! Environment:
//! - `LIVABILITY_DATA_DIR`: dataset directory (default `./data/sample`)
//! - `PORT`: listen port (default 3000)
//! - `RUST_LOG`: tracing filter

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;

use livability_engine::api::{AppState, create_router};
use livability_engine::config::TableLoader;

const DEFAULT_DATA_DIR: &str = "./data/sample";
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("livability_engine=info".parse()?),
        )
        .init();

    let data_dir =
        std::env::var("LIVABILITY_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let tables = TableLoader::load(&data_dir)
        .with_context(|| format!("Failed to load reference tables from {}", data_dir))?;

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let app = create_router(AppState::new(tables));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
