//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)            CLI flags
//!     → loader.rs (parse)           │
//!     → overrides ◀─────────────────┘
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → credential handed to the authenticator, the rest to the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults so the proxy runs without a config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
