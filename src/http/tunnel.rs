//! CONNECT tunnel handling.
//!
//! # Flow
//! ```text
//! AUTH_PENDING ──fail──▶ 407 + challenge
//!     │
//! DIAL_PENDING ──fail──▶ 503, error text as body
//!     │
//! HIJACKED ─no upgrade─▶ 500
//!     │  200 sent, hyper hands over the raw connection
//! RELAYING (two tasks, see net::relay)
//!     │
//! CLOSED
//! ```

use std::io;
use std::time::Duration;

use axum::{
    body::Body,
    extract::Request,
    response::{IntoResponse, Response},
};
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::Instrument;

use crate::error::ProxyError;
use crate::http::server::AppState;
use crate::net::relay;

/// Handle a CONNECT request.
pub async fn tunnel_handler(state: AppState, mut request: Request) -> Response {
    if !state.authenticator.authorize(request.headers()) {
        tracing::debug!("Tunnel request not authenticated");
        return ProxyError::AuthFailure.into_response();
    }

    // The target is used exactly as the client sent it.
    let target = request
        .uri()
        .authority()
        .map(|authority| authority.to_string())
        .unwrap_or_default();

    let destination = match dial(&target, state.connect_timeout).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(%target, error = %e, "Tunnel dial failed");
            return e.into_response();
        }
    };

    let Some(on_upgrade) = request.extensions_mut().remove::<OnUpgrade>() else {
        tracing::error!(%target, "Connection does not support upgrades");
        return ProxyError::HijackUnsupported.into_response();
    };

    let session = state.tunnels.track();
    let span = tracing::debug_span!("tunnel", session_id = %session.id(), %target);
    tokio::spawn(
        async move {
            match on_upgrade.await {
                Ok(upgraded) => relay::splice(TokioIo::new(upgraded), destination, session).await,
                Err(e) => tracing::warn!(error = %e, "Upgrade failed"),
            }
        }
        .instrument(span),
    );

    tracing::debug!(%target, "Tunnel established");
    Response::new(Body::empty())
}

/// Open the destination connection of a tunnel.
async fn dial(target: &str, timeout: Duration) -> Result<TcpStream, ProxyError> {
    let connect = async {
        if target.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "missing address"));
        }
        match tokio::time::timeout(timeout, TcpStream::connect(target)).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "i/o timeout")),
        }
    };

    connect.await.map_err(|source| ProxyError::Dial {
        target: target.to_string(),
        source,
    })
}
