//! Supascope - Supabase account dashboard server
//!
//! Main entry point for the supascope binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use supascope_server::{Server, ServerConfig};

/// Supascope - Supabase account dashboard server
#[derive(Parser)]
#[command(name = "supascope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Address to bind the server to (default: 127.0.0.1:8080)
    #[arg(long, env = "SUPASCOPE_BIND")]
    pub bind: Option<SocketAddr>,

    /// Directory for rotating log files (default: ./logs)
    #[arg(long, env = "SUPASCOPE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "supascope=debug,supascope_server=debug,supascope_oauth=debug,supascope_provider=debug,info"
    } else {
        "supascope=info,supascope_server=info,supascope_oauth=info,supascope_provider=info,warn"
    };

    let log_dir = cli.log_dir.unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "supascope.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "supascope=trace,supascope_server=trace,supascope_oauth=trace,supascope_provider=trace,info",
                )),
        )
        .init();

    let mut config = ServerConfig::from_env()?;
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
    }

    tracing::info!(addr = %config.bind_address, "supascope starting");
    Server::new(config).run().await?;

    Ok(())
}
