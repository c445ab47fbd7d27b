//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper HTTP/1 with upgrades, dispatch on method)
//!     → CONNECT:  tunnel.rs  (auth → dial → 200 → upgrade → net::relay)
//!     → other:    forward.rs (auth → client request → stream response)
//!     → Send to client
//! ```

pub mod forward;
pub mod server;
pub mod tunnel;

pub use server::{AppState, HttpServer};
