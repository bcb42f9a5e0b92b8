//! # Parameter Binding Module
//!
//! Extracts operation arguments from a request and converts them to the types
//! declared by the operation signature.
//!
//! ## Sources
//!
//! | Source | Lookup |
//! |--------|--------|
//! | `url` | the `{param}` segment at a position computed when the route is built |
//! | `query` | query-string key; the last occurrence wins |
//! | `header` | header name, compared case-insensitively |
//! | `cookie` | cookie name; the value is URL-decoded |
//! | `body` | top-level field of the deserialized request body |
//!
//! ## Conversion
//!
//! Text values are converted with a fast numeric parse followed by a generic
//! fallback that reads the text as a JSON scalar. A value that survives neither
//! yields [`GatewayError::ParameterConversionFailed`](crate::error::GatewayError)
//! and the request is answered with `400 Bad Request`. Booleans accept only the
//! literals `true` and `false`.

mod binder;
mod convert;

pub use binder::{Extractor, ParameterBinder, RawValue};
pub use convert::{convert_text, convert_value};
