//! # rpcgate
//!
//! **rpcgate** is an HTTP-to-RPC gateway core: it matches HTTP requests against a
//! declarative route set, binds operation arguments from the request, invokes a
//! backend operation and writes the result in a content-negotiated format.
//!
//! ## Overview
//!
//! Routes are authored in a manifest that names, for each route, an HTTP method,
//! a path template and a backend operation defined in an interface-definition
//! file. The route compiler resolves each operation's signature, infers the
//! parameter bindings the manifest leaves out, validates the set and emits a
//! compiled table. At start-up the table is loaded into an immutable
//! [`RouteTable`](router::RouteTable) and served by a [`Gateway`](dispatcher::Gateway).
//!
//! ## Architecture
//!
//! - **[`spec`]** - Route data model and manifest loading (YAML, JSON, TOML)
//! - **[`idl`]** - Interface definitions and operation signatures
//! - **[`compiler`]** - Route compiler: default bindings and validation
//! - **[`generator`]** - Atomic emission of `routes.json` and the generated `routes.rs`
//! - **[`router`]** - Path templates and registration-order route matching
//! - **[`params`]** - Parameter extraction and typed conversion
//! - **[`negotiate`]** - `Accept` parsing and format selection
//! - **[`codec`]** - Serializer and deserializer capabilities
//! - **[`dispatcher`]** - Dispatch units, the backend capability and the gateway
//! - **[`server`]** - Request capability and the in-memory request adapter
//! - **[`error`]** - Runtime and compile-time error types
//! - **[`runtime_config`]** - Gateway configuration
//! - **[`logging`]** - Tracing subscriber set-up
//! - **[`cli`]** - The `rpcgate-gen` command line
//!
//! ### Build Time
//!
//! ```text
//! routes.yaml + *.idl.yaml → compiler::compile_file → Vec<RouteDef> → generator → routes.json / routes.rs
//! ```
//!
//! ### Request Time
//!
//! ```text
//! request → RouteTable::match_route → negotiate → decode body → bind → Backend::invoke → serialize
//! ```
//!
//! | Outcome | Status |
//! |---------|--------|
//! | no route matches the path | 404 |
//! | path matches routes of other methods only | 405 with `Allow` |
//! | missing or unconvertible parameter, malformed body | 400 |
//! | no acceptable format | 406 |
//! | no deserializer for the request content type | 415 |
//! | backend fault or result encoding failure | 500 |
//!
//! ## Quick Start
//!
//! ```no_run
//! use rpcgate::dispatcher::{Gateway, InProcessBackend};
//! use rpcgate::runtime_config::GatewayConfig;
//! use rpcgate::server::ParsedRequest;
//! use rpcgate::http::Method;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let _guard = rpcgate::logging::init_logging()?;
//!
//! let backend = InProcessBackend::new()
//!     .with("shop.Items.get", |args| Ok(json!({ "id": args[0], "name": "widget" })));
//! let gateway = Gateway::from_config(GatewayConfig::from_env(), Arc::new(backend))?;
//!
//! let response = gateway.handle(&ParsedRequest::new(Method::GET, "/item/42"));
//! println!("{} {}", response.status, String::from_utf8_lossy(&response.body));
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! The route table is built once during start-up and never mutated. A `Gateway`
//! is `Send + Sync`; share it behind an `Arc` and call
//! [`Gateway::handle`](dispatcher::Gateway::handle) from any number of threads.
//! Matching, binding and negotiation are pure; only the backend may block.

pub mod cli;
pub mod codec;
pub mod compiler;
pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod idl;
pub mod logging;
pub mod negotiate;
pub mod params;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod spec;
pub mod validator;

pub use http;

pub use dispatcher::{Backend, BackendFault, Gateway};
pub use error::{CompileError, GatewayError};
pub use router::RouteTable;
pub use spec::{ParamType, ParameterSource, RouteDef};
