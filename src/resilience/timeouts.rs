//! Timeout enforcement.
//!
//! # Responsibilities
//! - Hold the connect timeout shared by executors
//! - Bound the connect phase and the request phase with independent timers
//! - Map a fired timer to the timeout kind of its phase
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; a fired timer drops the phase future
//! - The connect timeout lives behind `ArcSwap` so reads never block
//! - No validation: zero is passed through and fails the connect phase at once

use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::error::RequestError;

/// Connect timeout used when nothing else was configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);

static GLOBAL: OnceLock<TimeoutController> = OnceLock::new();

/// Shared handle to a connect timeout.
///
/// Clones share the same value: a `set_connect_timeout` on any clone is seen
/// by every execution that starts afterwards on any executor holding a clone.
#[derive(Debug, Clone)]
pub struct TimeoutController {
    connect: Arc<ArcSwap<Duration>>,
}

impl TimeoutController {
    pub fn new(connect: Duration) -> Self {
        Self {
            connect: Arc::new(ArcSwap::from_pointee(connect)),
        }
    }

    /// The process-wide controller.
    pub fn global() -> &'static TimeoutController {
        GLOBAL.get_or_init(TimeoutController::default)
    }

    /// Replace the connect timeout. Executions already connecting keep the
    /// bound they armed.
    pub fn set_connect_timeout(&self, timeout: Duration) {
        self.connect.store(Arc::new(timeout));
        tracing::debug!(connect_timeout_ms = timeout.as_millis() as u64, "Connect timeout updated");
    }

    pub fn connect_timeout(&self) -> Duration {
        **self.connect.load()
    }
}

impl Default for TimeoutController {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

/// The two timed phases of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Name resolution and connection establishment.
    Connect,
    /// Everything after the connection is up: send, response head, body.
    Request,
}

impl Phase {
    fn elapsed(self, limit: Duration) -> RequestError {
        match self {
            Phase::Connect => RequestError::connect_timeout(limit),
            Phase::Request => RequestError::request_timeout(limit),
        }
    }
}

/// Run one phase under an optional deadline.
///
/// When the deadline fires first the phase future is dropped and the
/// timeout error of `phase` is returned.
pub(crate) async fn bounded<T, F>(
    phase: Phase,
    limit: Option<Duration>,
    fut: F,
) -> Result<T, RequestError>
where
    F: Future<Output = Result<T, RequestError>>,
{
    let Some(limit) = limit else {
        return fut.await;
    };

    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(phase = ?phase, limit_ms = limit.as_millis() as u64, "Phase deadline elapsed");
            Err(phase.elapsed(limit))
        }
    }
}
