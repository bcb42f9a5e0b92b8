//! # Route Compiler
//!
//! Build-time tool turning a route manifest and the operation signatures of its
//! interface definitions into compiled [`RouteDef`](crate::spec::RouteDef)s.
//!
//! ## Steps
//!
//! 1. Resolve each route's operation by its exact fully-qualified name
//! 2. Complete explicit bindings (`source` defaults to `url`, `key` to the
//!    parameter name) and give every unbound signature parameter a URL binding
//!    keyed by its own name
//! 3. Validate the route set
//! 4. Return one definition per route, bindings in signature order
//!
//! ## Validation
//!
//! | Kind | Problem |
//! |------|---------|
//! | `UnknownOperation` | no signature has the route's operation name |
//! | `SurplusBinding` | a binding names no signature parameter |
//! | `DuplicateBinding` | a parameter is bound twice |
//! | `UnknownMethod` | HTTP method outside [`SUPPORTED_METHODS`] |
//! | `InvalidPath` | path template does not parse |
//! | `UnknownPathParameter` | URL binding key is not a `{param}` of the template |
//! | `DuplicateRoute` | route name, or method and path, used twice |
//! | `InvalidName` | route name is not an identifier |
//! | `InvalidFormat` | a format is not a `type/subtype` media type |
//! | `DefaultFormatNotOffered` | `default_format` is not among `formats` |
//! | `DuplicateOperation`, `DuplicateParameter`, `UnknownType` | interface definitions are inconsistent |
//!
//! All issues are collected before failing, and a failing compilation returns
//! nothing: see [`crate::generator`] for how artifacts are written.

mod core;

pub use core::{compile, compile_file, load_signatures, SUPPORTED_METHODS};
