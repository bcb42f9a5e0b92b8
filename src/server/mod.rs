//! Transport boundary.
//!
//! The gateway never sees a socket. Transports adapt their requests to
//! [`GatewayRequest`] and write back the [`GatewayResponse`] they get from
//! [`Gateway::handle`](crate::dispatcher::Gateway::handle). [`ParsedRequest`] is the
//! in-memory adapter used by tests, the CLI and hosts built on [`http::Request`].

pub mod request;
pub mod response;

pub use request::{
    parse_cookies, parse_query_params, GatewayRequest, HeaderVec, ParsedRequest,
    MAX_INLINE_HEADERS,
};
pub use response::GatewayResponse;
