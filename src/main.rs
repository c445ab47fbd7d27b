//! Forward HTTP proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                    FORWARD PROXY                     │
//!                 │                                                      │
//!   Client        │  ┌──────────┐   ┌──────────┐   ┌─────────────────┐   │
//!   ──────────────┼─▶│   net    │──▶│   http   │──▶│  security       │   │
//!                 │  │ listener │   │  server  │   │  proxy_auth     │   │
//!                 │  └──────────┘   └──────────┘   └────────┬────────┘   │
//!                 │                                         │            │
//!                 │                 CONNECT ┌───────────────┴──┐ other   │
//!                 │                         ▼                  ▼         │
//!                 │                 ┌──────────────┐   ┌─────────────┐   │
//!                 │                 │ http::tunnel │   │http::forward│───┼──▶ Origin
//!                 │                 │  net::relay  │   └─────────────┘   │
//!                 │                 └──────┬───────┘                     │
//!                 └────────────────────────┼─────────────────────────────┘
//!                                          └──────── raw TCP ──────────────▶ Destination
//! ```

use clap::Parser;

use forward_proxy::cli::Cli;
use forward_proxy::lifecycle::startup;
use forward_proxy::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    observability::init_logging(&config.observability);

    tracing::info!("forward-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
