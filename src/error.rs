//! Request-scoped proxy failures and their client responses.

use std::error::Error as StdError;

use axum::{
    http::{header::PROXY_AUTHENTICATE, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::security::CHALLENGE;

/// A failure that ends one request with an error response.
///
/// Relay and body-stream failures happen after the status line is sent and
/// are never turned into a response; they only close connections.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing, malformed or wrong credentials. The reason is not exposed.
    #[error("Proxy Authentication Required")]
    AuthFailure,

    /// The tunnel destination could not be reached.
    #[error("dial tcp {target}: {source}")]
    Dial {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection cannot be detached from the HTTP layer.
    #[error("Hijacking not supported")]
    HijackUnsupported,

    /// The origin of a forwarded request could not be reached.
    #[error("{}", error_chain(.0))]
    Transport(#[from] hyper_util::client::legacy::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::AuthFailure => StatusCode::PROXY_AUTHENTICATION_REQUIRED,
            ProxyError::Dial { .. } | ProxyError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::HijackUnsupported => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = format!("{self}\n");
        match self {
            ProxyError::AuthFailure => {
                (status, [(PROXY_AUTHENTICATE, CHALLENGE)], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

/// Render an error followed by each of its sources.
fn error_chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
