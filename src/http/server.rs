//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Serve HTTP/1.1 on every accepted connection, with upgrades enabled
//! - Dispatch CONNECT to the tunnel handler, everything else to forwarding
//! - Wire up the trace layer
//! - Stop accepting on shutdown

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::Request,
    http::Method,
    response::Response,
    Router,
};
use hyper::{body::Incoming, server::conn::http1};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioIo},
};
use tokio::sync::broadcast;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::ProxyConfig;
use crate::http::{forward, tunnel};
use crate::net::{ConnectionTracker, Listener};
use crate::security::Authenticator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub client: Client<HttpConnector, Body>,
    pub connect_timeout: Duration,
    pub tunnels: ConnectionTracker,
}

impl AppState {
    pub fn new(config: &ProxyConfig) -> Self {
        let connect_timeout = Duration::from_secs(config.timeouts.connect_secs);

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));

        // Every forwarded request gets its own origin connection.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Self {
            authenticator: Arc::new(Authenticator::new(config.auth.clone())),
            client,
            connect_timeout,
            tunnels: ConnectionTracker::new("tunnel"),
        }
    }
}

/// HTTP server for the forward proxy.
pub struct HttpServer {
    state: AppState,
    connections: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            state: AppState::new(config),
            connections: ConnectionTracker::new("connection"),
        }
    }

    /// Build the Axum router serving forwarded requests.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(forward::forward_handler)
            .with_state(state)
    }

    /// Run the server, accepting connections until `shutdown` fires.
    ///
    /// Connections already accepted, and their tunnels, keep running.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let router = Self::build_router(self.state.clone());
        let state = self.state.clone();
        let service = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .service(tower::service_fn(move |request: Request<Incoming>| {
                dispatch(state.clone(), router.clone(), request)
            }));

        loop {
            let (stream, peer_addr) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        continue;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            };

            let guard = self.connections.track();
            let span = tracing::debug_span!(
                "connection",
                connection_id = %guard.id(),
                peer_addr = %peer_addr
            );
            let service = service.clone();

            tokio::spawn(
                async move {
                    let hyper_service =
                        hyper::service::service_fn(move |request: Request<Incoming>| {
                            service.clone().oneshot(request)
                        });

                    if let Err(e) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(TokioIo::new(stream), hyper_service)
                        .with_upgrades()
                        .await
                    {
                        tracing::debug!(error = %e, "Connection error");
                    }
                    drop(guard);
                }
                .instrument(span),
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Active client connections.
    pub fn connections(&self) -> ConnectionTracker {
        self.connections.clone()
    }

    /// Active tunnel sessions.
    pub fn tunnels(&self) -> ConnectionTracker {
        self.state.tunnels.clone()
    }
}

/// Route a request strictly by method: CONNECT tunnels, everything else is
/// forwarded. Both handlers authenticate first.
async fn dispatch(
    state: AppState,
    router: Router,
    request: Request<Incoming>,
) -> Result<Response, Infallible> {
    let request = request.map(Body::new);
    if request.method() == Method::CONNECT {
        Ok(tunnel::tunnel_handler(state, request).await)
    } else {
        router.oneshot(request).await
    }
}
