//! Proxy basic authentication.
//!
//! Every request, tunnel or forward, carries its credentials in
//! `Proxy-Authorization: Basic <base64(username:password)>`. The header is
//! checked against one credential fixed at startup.

use std::fmt;

use axum::http::{header::PROXY_AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Value of the `Proxy-Authenticate` header sent with every 407.
pub const CHALLENGE: &str = r#"Basic realm="Restricted""#;

const SCHEME: &str = "Basic";

/// The single username/password pair the proxy accepts.
///
/// An empty password is a valid credential, not "no password".
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::new("user", "")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validates `Proxy-Authorization` values against a [`Credential`].
#[derive(Debug, Clone)]
pub struct Authenticator {
    credential: Credential,
}

impl Authenticator {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// Check the first `Proxy-Authorization` header of a request.
    ///
    /// A value that is not visible ASCII counts as absent.
    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        let value = headers
            .get(PROXY_AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        self.check(value)
    }

    /// Check a raw header value. `None` means the header was not sent.
    ///
    /// The scheme is matched case-sensitively and neither token is trimmed.
    /// Callers only learn pass or fail.
    pub fn check(&self, header: Option<&str>) -> bool {
        let Some((scheme, encoded)) = header.and_then(|h| h.split_once(' ')) else {
            return false;
        };
        if scheme != SCHEME {
            return false;
        }

        let Ok(decoded) = STANDARD.decode(encoded) else {
            return false;
        };
        let Some(colon) = decoded.iter().position(|&b| b == b':') else {
            return false;
        };
        let (username, password) = (&decoded[..colon], &decoded[colon + 1..]);

        username == self.credential.username.as_bytes()
            && password == self.credential.password.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    fn default_auth() -> Authenticator {
        Authenticator::new(Credential::default())
    }

    #[test]
    fn accepts_empty_password() {
        let auth = default_auth();
        assert!(auth.check(Some(&basic("user:"))));
    }

    #[test]
    fn rejects_missing_header() {
        assert!(!default_auth().check(None));
        assert!(!default_auth().check(Some("")));
    }

    #[test]
    fn rejects_wrong_user_or_password() {
        let auth = default_auth();
        assert!(!auth.check(Some(&basic("user:x"))));
        assert!(!auth.check(Some(&basic("admin:"))));
        assert!(!auth.check(Some(&basic("User:"))));
        assert!(!auth.check(Some(&basic(":"))));
    }

    #[test]
    fn password_may_contain_colons() {
        let auth = Authenticator::new(Credential::new("alice", "a:b:c"));
        assert!(auth.check(Some(&basic("alice:a:b:c"))));
        assert!(!auth.check(Some(&basic("alice:a:b"))));
    }

    #[test]
    fn rejects_malformed_values() {
        let auth = default_auth();
        let encoded = STANDARD.encode("user:");

        // scheme is case-sensitive
        assert!(!auth.check(Some(&format!("basic {encoded}"))));
        assert!(!auth.check(Some(&format!("Bearer {encoded}"))));
        // no separator
        assert!(!auth.check(Some(&format!("Basic{encoded}"))));
        // no trimming
        assert!(!auth.check(Some(&format!(" Basic {encoded}"))));
        assert!(!auth.check(Some(&format!("Basic  {encoded}"))));
        assert!(!auth.check(Some(&format!("Basic {encoded} "))));
        // invalid base64
        assert!(!auth.check(Some("Basic not*base64")));
        assert!(!auth.check(Some("Basic dXNlcjo")));
        // missing colon
        assert!(!auth.check(Some(&basic("user"))));
    }

    #[test]
    fn authorize_reads_header_map() {
        let auth = default_auth();
        let mut headers = HeaderMap::new();
        assert!(!auth.authorize(&headers));

        headers.insert(
            PROXY_AUTHORIZATION,
            HeaderValue::from_str(&basic("user:")).unwrap(),
        );
        assert!(auth.authorize(&headers));
    }

    #[test]
    fn authorize_uses_first_header_value() {
        let auth = default_auth();
        let mut headers = HeaderMap::new();
        headers.append(PROXY_AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        headers.append(
            PROXY_AUTHORIZATION,
            HeaderValue::from_str(&basic("user:")).unwrap(),
        );
        assert!(!auth.authorize(&headers));
    }

    #[test]
    fn non_ascii_header_counts_as_absent() {
        let auth = default_auth();
        let mut headers = HeaderMap::new();
        headers.insert(
            PROXY_AUTHORIZATION,
            HeaderValue::from_bytes(b"Basic \xff\xfe").unwrap(),
        );
        assert!(!auth.authorize(&headers));
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", Credential::new("alice", "hunter2"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
