//! Genre recommendation server.
//!
//! Loads the movie and rating tables, then serves the line protocol and the
//! HTTP facade until Ctrl-C.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use server::ServerConfig;
use server::config::{DEFAULT_HTTP_ADDR, DEFAULT_MOVIES_PATH, DEFAULT_RATINGS_PATH, DEFAULT_TCP_ADDR};

/// Genre recommendation server
#[derive(Parser)]
#[command(name = "genre-recs-server")]
#[command(about = "Serves genre-filtered movie recommendations over TCP and HTTP", long_about = None)]
struct Args {
    /// Movies CSV (movieId,title,genres)
    #[arg(long, default_value = DEFAULT_MOVIES_PATH)]
    movies: PathBuf,

    /// Ratings CSV (userId,movieId,rating[,timestamp])
    #[arg(long, default_value = DEFAULT_RATINGS_PATH)]
    ratings: PathBuf,

    /// Address for the line protocol listener
    #[arg(long, default_value = DEFAULT_TCP_ADDR)]
    tcp_addr: String,

    /// Address for the HTTP facade
    #[arg(long, default_value = DEFAULT_HTTP_ADDR)]
    http_addr: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            movies_path: args.movies,
            ratings_path: args.ratings,
            tcp_addr: args.tcp_addr,
            http_addr: args.http_addr,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,server=debug,catalog=debug")),
        )
        .init();

    let config = ServerConfig::from(Args::parse());
    info!("Starting genre recommendation server with {:?}", config);

    server::run(config).await
}
