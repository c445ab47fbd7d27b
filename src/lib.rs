//! Forward HTTP proxy library.
//!
//! Plain HTTP requests are re-issued to their origin; CONNECT requests become
//! raw TCP tunnels. Every request must carry the configured credential in
//! `Proxy-Authorization`.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
