//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (CONNECT or forward):
//!     → proxy_auth.rs (Proxy-Authorization against the static credential)
//!     → pass: handler continues
//!     → fail: 407 + Proxy-Authenticate challenge
//! ```
//!
//! # Design Decisions
//! - Fail closed: any malformed header is treated as missing credentials
//! - Failure reasons are never surfaced to the client or the log
//! - The credential is immutable and shared without locking

pub mod proxy_auth;

pub use proxy_auth::{Authenticator, Credential, CHALLENGE};
