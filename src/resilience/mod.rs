//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request execution:
//!     → timeouts.rs (connect phase bounded by the controller's connect timeout)
//!     → timeouts.rs (request phase bounded by the per-request timeout)
//!     → On deadline: the phase's timeout kind is returned, never both
//! ```
//!
//! # Design Decisions
//! - Two independently armed timers, composed sequentially
//! - No retries and no backoff: a failed attempt is reported as-is

pub mod timeouts;

pub use timeouts::{Phase, TimeoutController, DEFAULT_CONNECT_TIMEOUT};
