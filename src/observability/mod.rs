//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every execution produces:
//!     → a tracing span (request id, method, uri) with debug/warn events
//!     → metrics.rs (counter + latency histogram)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, pretty or JSON)
//!     → whatever metrics recorder the host application installs
//! ```

pub mod logging;
pub mod metrics;
