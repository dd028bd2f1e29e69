//! HTTP request execution subsystem.
//!
//! # Data Flow
//! ```text
//! RequestSpec (request.rs)
//!     → client.rs (resolve target, validate method & headers)
//!     → body.rs (encode payload, no I/O)
//!     → client.rs (connect phase, then request phase)
//!     → response.rs (buffer body, normalize)
//!     → ResponseResult | RequestError
//! ```

pub mod body;
pub mod client;
pub mod request;
pub mod response;

pub use body::{ByteSource, EncodedBody, Payload, Structured};
pub use client::Executor;
pub use request::RequestSpec;
pub use response::ResponseResult;
