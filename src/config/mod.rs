//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → ClientConfig (immutable)
//!     → Executor::from_config (connect timeout seeds a TimeoutController)
//!     → observability::logging::init (log level & format)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - The connect timeout is not validated; zero is passed through

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ClientConfig, LogFormat, ObservabilityConfig, TimeoutConfig};
