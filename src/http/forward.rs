//! Plain HTTP forwarding.
//!
//! # Responsibilities
//! - Re-issue the client's request (method, absolute URI, headers, body)
//! - Relay the origin's headers, status and body without buffering
//! - Map transport failures to 503 with the error text
//!
//! # Design Decisions
//! - The proxy credential is stripped before the request leaves the proxy
//! - No retries; a failure is reported once
//! - Dropping the relayed body releases the origin connection

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::PROXY_AUTHORIZATION, HeaderMap},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;

use crate::error::ProxyError;
use crate::http::server::AppState;

/// Handle any non-CONNECT request.
pub async fn forward_handler(State(state): State<AppState>, request: Request) -> Response {
    if !state.authenticator.authorize(request.headers()) {
        tracing::debug!("Forward request not authenticated");
        return ProxyError::AuthFailure.into_response();
    }

    let method = request.method().clone();
    let uri = request.uri().clone();

    let (mut parts, body) = request.into_parts();
    // Every other header goes out exactly as received. The credential is
    // addressed to this proxy, so it is dropped rather than relayed.
    parts.headers.remove(PROXY_AUTHORIZATION);
    let outbound = Request::from_parts(parts, body);

    match state.client.request(outbound).await {
        Ok(response) => {
            tracing::debug!(%method, %uri, status = %response.status(), "Forwarded request");
            relay_response(response)
        }
        Err(e) => {
            let err = ProxyError::from(e);
            tracing::warn!(%method, %uri, error = %err, "Origin request failed");
            err.into_response()
        }
    }
}

/// Turn an origin response into the client response: headers, then status,
/// then the streamed body.
fn relay_response(response: hyper::Response<Incoming>) -> Response {
    let (parts, body) = response.into_parts();

    let mut relayed = Response::new(Body::new(body));
    copy_headers(relayed.headers_mut(), &parts.headers);
    *relayed.status_mut() = parts.status;
    relayed
}

/// Append every value of every header, keeping duplicates and their order.
pub fn copy_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use axum::http::{HeaderValue, StatusCode};

    #[test]
    fn copy_headers_keeps_all_values_in_order() {
        let mut src = HeaderMap::new();
        src.append("x-test", HeaderValue::from_static("a"));
        src.append("x-test", HeaderValue::from_static("b"));
        src.append("set-cookie", HeaderValue::from_static("one=1"));
        src.append("set-cookie", HeaderValue::from_static("one=1"));

        let mut dst = HeaderMap::new();
        dst.insert("x-existing", HeaderValue::from_static("kept"));
        copy_headers(&mut dst, &src);

        let x_test: Vec<_> = dst.get_all("x-test").iter().collect();
        assert_eq!(x_test, vec!["a", "b"]);
        assert_eq!(dst.get_all("set-cookie").iter().count(), 2);
        assert_eq!(dst.get("x-existing").unwrap(), "kept");
    }

    #[tokio::test]
    async fn rejects_unauthenticated() {
        let state = AppState::new(&ProxyConfig::default());
        let request = axum::http::Request::builder()
            .uri("http://127.0.0.1:1/")
            .body(Body::empty())
            .unwrap();

        let response = forward_handler(State(state), request).await;
        assert_eq!(response.status(), StatusCode::PROXY_AUTHENTICATION_REQUIRED);
    }

    #[tokio::test]
    async fn origin_form_request_is_transport_failure() {
        let state = AppState::new(&ProxyConfig::default());
        let request = axum::http::Request::builder()
            .uri("/relative")
            .header(PROXY_AUTHORIZATION, "Basic dXNlcjo=")
            .body(Body::empty())
            .unwrap();

        let response = forward_handler(State(state), request).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
