//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, no admission limit)
//!     → connection.rs (ids and active counters)
//!     → Hand off to HTTP layer
//!
//! Established CONNECT tunnel:
//!     → relay.rs (two copy tasks, client ⇄ destination)
//! ```
//!
//! # Design Decisions
//! - Every connection gets its own task; concurrency is unbounded
//! - Each connection is tracked for logging and shutdown drain
//! - Tunnel teardown is driven by close propagation, not joins

pub mod connection;
pub mod listener;
pub mod relay;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Listener, ListenerError};
