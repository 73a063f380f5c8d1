//! Server crate for the genre recommendation service.
//!
//! The server loads the catalog once, then serves two front doors over the
//! same shared state:
//! - a line protocol on TCP, one spawned session per connection
//! - an HTTP facade returning JSON
//!
//! Sessions asking for the same genre merge their results into the
//! [`CombinedStore`], which is the only mutable state shared between tasks.

pub mod config;
pub mod http;
pub mod listener;
pub mod protocol;
pub mod session;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use session::Session;
pub use state::AppState;
pub use store::{AverageRating, CombinedStore, Recommendation};

use anyhow::{Context, Result};
use catalog::Catalog;
use tokio::net::TcpListener;
use tracing::info;

/// Load the catalog, bind both listeners and serve until Ctrl-C.
///
/// Catalog load failures are logged and leave an empty or partial catalog;
/// failing to bind either port is fatal.
pub async fn run(config: ServerConfig) -> Result<()> {
    let (movies_path, ratings_path) = (config.movies_path.clone(), config.ratings_path.clone());
    let catalog = tokio::task::spawn_blocking(move || Catalog::load_from_files(&movies_path, &ratings_path))
        .await
        .context("Catalog loading panicked")?;
    let state = AppState::new(catalog);

    let tcp = TcpListener::bind(&config.tcp_addr)
        .await
        .with_context(|| format!("Failed to bind line protocol listener on {}", config.tcp_addr))?;
    let http = TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", config.http_addr))?;

    tokio::select! {
        result = listener::serve(tcp, state.clone()) => result,
        result = http::serve(http, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, no longer accepting connections");
            Ok(())
        }
    }
}
