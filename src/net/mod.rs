//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! RequestSpec.uri
//!     → target.rs (parse, host/port, Host authority, origin-form path)
//!     → connector.rs (resolve + connect, bounded by the connect timeout)
//!     → tls.rs (TLS handshake for https, same bound)
//!     → connection.rs (drive the HTTP/1.1 connection, abort when done)
//! ```

pub mod connection;
pub mod connector;
pub mod target;
pub mod tls;

pub use connection::ConnectionId;
pub use connector::{Connector, TcpConnector};
pub use target::Target;
pub use tls::{HttpsConnector, MaybeTlsStream};
