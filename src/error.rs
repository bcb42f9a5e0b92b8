//! Error taxonomy.
//!
//! [`GatewayError`] covers everything that can go wrong while serving one request;
//! it is recovered at the dispatch boundary and turned into an HTTP status, never
//! propagated past the request. [`CompileError`] is build-time only and aborts the
//! route compiler without producing output.

use crate::spec::{ParamType, ParameterSource};
use crate::validator::{format_issues, ValidationIssue};
use http::{Method, StatusCode};
use std::fmt;
use std::path::PathBuf;

/// Per-request failure, mapped to an HTTP status by [`GatewayError::status`].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// No route of any method has a path matching the request (404)
    RouteNotFound { method: Method, path: String },
    /// Routes match the path, but none for this method (405)
    MethodNotAllowed {
        method: Method,
        path: String,
        /// Methods whose routes do match the path, in registration order
        allowed: Vec<Method>,
    },
    /// A required binding found nothing at its source (400)
    ParameterMissing {
        name: String,
        source: ParameterSource,
        key: String,
    },
    /// A value was present but could not be converted to the declared type (400)
    ParameterConversionFailed { name: String, expected: ParamType },
    /// The request body could not be decoded by the deserializer for its content type (400)
    MalformedBody {
        content_type: String,
        message: String,
    },
    /// None of the route's formats is acceptable to the client (406)
    NotAcceptable { accept: String },
    /// No deserializer is registered for the request body's content type (415)
    UnsupportedMediaType { content_type: String },
    /// The backend operation failed (500)
    BackendFault { operation: String, message: String },
    /// The backend result could not be written in the negotiated format (500)
    ResponseEncoding { media_type: String, message: String },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::ParameterMissing { .. }
            | GatewayError::ParameterConversionFailed { .. }
            | GatewayError::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            GatewayError::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            GatewayError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            GatewayError::BackendFault { .. } | GatewayError::ResponseEncoding { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable identifier used in error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RouteNotFound { .. } => "route_not_found",
            GatewayError::MethodNotAllowed { .. } => "method_not_allowed",
            GatewayError::ParameterMissing { .. } => "parameter_missing",
            GatewayError::ParameterConversionFailed { .. } => "parameter_conversion_failed",
            GatewayError::MalformedBody { .. } => "malformed_body",
            GatewayError::NotAcceptable { .. } => "not_acceptable",
            GatewayError::UnsupportedMediaType { .. } => "unsupported_media_type",
            GatewayError::BackendFault { .. } => "backend_fault",
            GatewayError::ResponseEncoding { .. } => "response_encoding",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::RouteNotFound { method, path } => {
                write!(f, "no route for {method} {path}")
            }
            GatewayError::MethodNotAllowed {
                method,
                path,
                allowed,
            } => {
                let allowed: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
                write!(
                    f,
                    "method {method} not allowed for {path} (allowed: {})",
                    allowed.join(", ")
                )
            }
            GatewayError::ParameterMissing { name, source, key } => {
                write!(f, "missing parameter '{name}' ({source} '{key}')")
            }
            GatewayError::ParameterConversionFailed { name, expected } => {
                write!(f, "parameter '{name}' is not a valid {expected}")
            }
            GatewayError::MalformedBody {
                content_type,
                message,
            } => write!(f, "request body is not valid {content_type}: {message}"),
            GatewayError::NotAcceptable { accept } => {
                write!(f, "no acceptable representation for Accept: {accept}")
            }
            GatewayError::UnsupportedMediaType { content_type } => {
                write!(f, "unsupported request content type '{content_type}'")
            }
            GatewayError::BackendFault { operation, message } => {
                write!(f, "operation {operation} failed: {message}")
            }
            GatewayError::ResponseEncoding {
                media_type,
                message,
            } => write!(f, "failed to encode response as {media_type}: {message}"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Fatal route-compiler failure. Compilation produces no artifacts when this is returned.
#[derive(Debug)]
pub enum CompileError {
    /// A manifest or interface definition could not be read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A manifest or interface definition is not a well-formed document
    Parse { path: PathBuf, message: String },
    /// The documents parsed but describe an inconsistent route set
    Invalid(Vec<ValidationIssue>),
    /// Rendering or writing the output artifacts failed
    Emit { path: PathBuf, message: String },
}

impl CompileError {
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            CompileError::Invalid(issues) => issues,
            _ => &[],
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            CompileError::Parse { path, message } => {
                write!(f, "cannot parse {}: {message}", path.display())
            }
            CompileError::Invalid(issues) => {
                write!(
                    f,
                    "route manifest is invalid, {} issue(s) found:\n{}",
                    issues.len(),
                    format_issues(issues)
                )
            }
            CompileError::Emit { path, message } => {
                write!(f, "cannot write {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
