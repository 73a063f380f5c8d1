mod client;
mod gateway;
mod retry;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::retry::RetryPolicy;

const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8080";

/// genre-recs - clients for the genre recommendation server
#[derive(Parser)]
#[command(name = "genre-recs")]
#[command(about = "Clients for the genre recommendation server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the line protocol and ask for recommendations interactively
    Client {
        /// Server address (host:port)
        #[arg(long, default_value = DEFAULT_SERVER_ADDR)]
        addr: String,

        /// Seconds to wait between connection attempts
        #[arg(long, default_value = "3")]
        retry_delay_secs: u64,

        /// Give up after this many attempts (retries forever if unset)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_attempts: Option<u32>,
    },

    /// Serve GET /recommend and forward it to the server's HTTP facade
    Gateway {
        /// Address to listen on
        #[arg(long, default_value = gateway::DEFAULT_LISTEN_ADDR)]
        listen: String,

        /// Base URL of the server's HTTP facade
        #[arg(long, default_value = gateway::DEFAULT_UPSTREAM)]
        upstream: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Client {
            addr,
            retry_delay_secs,
            max_attempts,
        } => {
            let policy = RetryPolicy::fixed(Duration::from_secs(retry_delay_secs))
                .with_max_attempts(max_attempts);
            client::run(&addr, policy).await?
        }
        Commands::Gateway { listen, upstream } => gateway::run(&listen, &upstream).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let cli = Cli::try_parse_from(["genre-recs", "client"]).unwrap();
        match cli.command {
            Commands::Client {
                addr,
                retry_delay_secs,
                max_attempts,
            } => {
                assert_eq!(addr, "127.0.0.1:8080");
                assert_eq!(retry_delay_secs, 3);
                assert_eq!(max_attempts, None);
            }
            Commands::Gateway { .. } => panic!("expected client"),
        }
    }

    #[test]
    fn test_zero_max_attempts_is_rejected() {
        assert!(Cli::try_parse_from(["genre-recs", "client", "--max-attempts", "0"]).is_err());
    }

    #[test]
    fn test_gateway_defaults() {
        let cli = Cli::try_parse_from(["genre-recs", "gateway"]).unwrap();
        match cli.command {
            Commands::Gateway { listen, upstream } => {
                assert_eq!(listen, "0.0.0.0:8081");
                assert_eq!(upstream, "http://127.0.0.1:8082");
            }
            Commands::Client { .. } => panic!("expected gateway"),
        }
    }
}
