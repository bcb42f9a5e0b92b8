//! Route data model and document loading.
//!
//! Holds the types shared by the route compiler and the runtime: parameter
//! sources and types, bindings, the serialisable [`RouteDef`], and the
//! human-authored [`Manifest`]. Documents are read as YAML, JSON or TOML
//! depending on the file extension.

mod load;
mod types;

pub use load::*;
pub use types::*;
