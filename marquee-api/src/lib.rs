//! Marquee API - endpoint tables and transports
//!
//! - [`Endpoint`]: a named group of operations invoked by method name
//! - [`ApiConnection`]: the connection handle endpoints are bound to
//! - [`RestTransport`]: reqwest-backed [`Transport`]
//! - [`session`]: WebSocket liveness monitor feeding the session signal

pub mod endpoint;
pub mod endpoints;
pub mod session;
pub mod transport;

pub use endpoint::{ApiConnection, Endpoint, ResponseEnvelope, RestEndpoint, Route};
pub use session::{spawn_session_monitor, ReconnectConfig, WsClient};
pub use transport::{ApiRequest, ClientCredentials, RestTransport, Transport, Verb};
