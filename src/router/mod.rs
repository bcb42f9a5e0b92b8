//! # Router Module
//!
//! Path templates and the runtime route table.
//!
//! ## Overview
//!
//! A route's path is a [`PathTemplate`]: an ordered list of literal and
//! `{parameter}` segments with a fixed element count. The [`RouteTable`] buckets
//! routes by `(element count, method)`; matching a request looks up the bucket
//! for its path length and scans it in registration order.
//!
//! ## Matching Rules
//!
//! - Element counts must be equal; there is no prefix or wildcard matching
//! - Literal segments compare byte-for-byte (case-sensitive)
//! - Parameter segments match any element
//! - The first registered route that matches wins, regardless of how many
//!   literal segments a later route has
//! - If the path matches routes of other methods only, the result is
//!   `MethodNotAllowed` (405); otherwise `RouteNotFound` (404)
//!
//! ## Example
//!
//! ```rust
//! use rpcgate::router::{split_path, RouteTable};
//! use rpcgate::spec::{ParamType, ParameterSource, RouteDef};
//! use http::Method;
//!
//! let table = RouteTable::from_defs(vec![
//!     RouteDef::new("get_item", Method::GET, "/item/{id}", "shop.Items.get")
//!         .bind("id", ParameterSource::Url, "id", ParamType::I64, false),
//! ])
//! .unwrap();
//!
//! let segments = split_path("/item/42");
//! let m = table.match_route(&Method::GET, &segments).unwrap();
//! assert_eq!(m.unit.name(), "get_item");
//! assert_eq!(m.path_param("id"), Some("42"));
//! ```

mod core;
mod template;

pub use core::{ParamVec, RouteMatch, RouteTable, MAX_INLINE_PARAMS};
pub use template::{join_path, split_path, PathSegment, PathTemplate, PathTemplateError};
