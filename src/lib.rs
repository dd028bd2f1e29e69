//! Single-call HTTP request execution.
//!
//! Describe a request as a value, execute it once, get back either the whole
//! response or a classified error that says whether the connection could not
//! be established in time or the exchange did not finish in time.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use oneshot_http::{Payload, RequestSpec};
//!
//! # async fn demo() -> Result<(), oneshot_http::RequestError> {
//! oneshot_http::set_connect_timeout(Duration::from_millis(100));
//!
//! let res = RequestSpec::new("http://127.0.0.1:8080/")
//!     .method("POST")
//!     .body(Payload::json(serde_json::json!({"foo": "bar"})))
//!     .timeout(Duration::from_millis(500))
//!     .send()
//!     .await?;
//! assert_eq!(res.status_code, 201);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod observability;
pub mod resilience;

use std::time::Duration;

pub use config::ClientConfig;
pub use error::{ErrorKind, RequestError};
pub use http::{ByteSource, Executor, Payload, RequestSpec, ResponseResult};
pub use net::{Connector, HttpsConnector, TcpConnector, Target};
pub use resilience::{TimeoutController, DEFAULT_CONNECT_TIMEOUT};

/// Set the process-wide connect timeout used by `RequestSpec::send` and
/// `Executor::global`. Applies to executions started after this returns.
pub fn set_connect_timeout(timeout: Duration) {
    TimeoutController::global().set_connect_timeout(timeout);
}

/// The process-wide connect timeout.
pub fn connect_timeout() -> Duration {
    TimeoutController::global().connect_timeout()
}
