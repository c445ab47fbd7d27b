//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!       (connection_id, session_id, target, direction, bytes, error)
//!     → tower-http TraceLayer spans per request
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Credentials never appear in any event
//! - RUST_LOG overrides the configured level

pub mod logging;

pub use logging::init_logging;
