//! # Dispatcher Module
//!
//! Turns a matched route into a backend call and the call's result into a
//! response.
//!
//! ## Overview
//!
//! - [`DispatchUnit`] is the runtime form of one compiled route. Units are plain
//!   data; every route runs the same [`DispatchUnit::execute`].
//! - [`Backend`] is the capability to invoke a remote operation by its
//!   fully-qualified name. [`InProcessBackend`] runs registered closures and
//!   [`EchoBackend`] answers with its own arguments.
//! - [`Gateway`] is the dispatch boundary. It owns the route table, the backend
//!   and the codecs, and recovers every [`GatewayError`](crate::error::GatewayError)
//!   into an error response.
//!
//! ## Request Flow
//!
//! 1. The route table matches method and path elements to a unit (404 / 405)
//! 2. The `Accept` header is negotiated against the unit's formats (406)
//! 3. The body is decoded if the unit has body bindings (415 / 400)
//! 4. Arguments are bound in signature order (400)
//! 5. The backend is invoked (500 on fault)
//! 6. The result is serialized in the negotiated format
//!
//! ## Example
//!
//! ```rust
//! use rpcgate::codec::Codecs;
//! use rpcgate::dispatcher::{Gateway, InProcessBackend};
//! use rpcgate::router::RouteTable;
//! use rpcgate::server::ParsedRequest;
//! use rpcgate::spec::{ParamType, ParameterSource, RouteDef};
//! use rpcgate::http::Method;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let table = RouteTable::from_defs(vec![RouteDef::new(
//!     "get_item", Method::GET, "/item/{id}", "shop.Items.get",
//! )
//! .bind("id", ParameterSource::Url, "id", ParamType::I64, false)])
//! .unwrap();
//! let backend = InProcessBackend::new().with("shop.Items.get", |args| Ok(json!({ "id": args[0] })));
//! let gateway = Gateway::new(table, Arc::new(backend), Codecs::with_defaults()).unwrap();
//!
//! let res = gateway.handle(&ParsedRequest::new(Method::GET, "/item/7"));
//! assert_eq!(res.status, 200);
//! assert_eq!(res.json().unwrap(), json!({ "id": 7 }));
//! ```

mod backend;
mod core;
mod unit;

pub use backend::{Backend, BackendFault, EchoBackend, InProcessBackend, OperationFn};
pub use core::Gateway;
pub use unit::DispatchUnit;
