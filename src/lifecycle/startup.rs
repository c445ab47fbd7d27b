//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener from a validated configuration
//! - Run the server until a termination signal
//! - Give open connections a bounded window to finish
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, after every subsystem is built

use std::time::Duration;

use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::{Listener, ListenerError};

/// Error type for startup and serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the proxy until SIGINT/SIGTERM.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        connect_timeout_secs = config.timeouts.connect_secs,
        "Configuration loaded"
    );

    let server = HttpServer::new(&config);
    let connections = server.connections();
    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_watcher(shutdown);

    server.run(listener, server_shutdown).await?;

    if tokio::time::timeout(grace, connections.wait_for_idle())
        .await
        .is_err()
    {
        tracing::warn!(
            remaining = connections.active_count(),
            "Shutdown grace period elapsed with open connections"
        );
    }

    Ok(())
}
