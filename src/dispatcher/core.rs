use super::backend::Backend;
use crate::codec::Codecs;
use crate::error::GatewayError;
use crate::router::RouteTable;
use crate::runtime_config::GatewayConfig;
use crate::server::{GatewayRequest, GatewayResponse};
use crate::spec::load_route_defs;
use anyhow::{anyhow, bail, Context};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The dispatch boundary.
///
/// Matches a request, runs the matched unit and turns every [`GatewayError`] into
/// an error response. Immutable once built, so one instance behind an `Arc` can
/// serve any number of threads.
#[derive(Clone)]
pub struct Gateway {
    table: Arc<RouteTable>,
    backend: Arc<dyn Backend>,
    codecs: Codecs,
    config: GatewayConfig,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("routes", &self.table.len())
            .field("codecs", &self.codecs)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Gateway with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`Gateway::with_config`].
    pub fn new(table: RouteTable, backend: Arc<dyn Backend>, codecs: Codecs) -> anyhow::Result<Self> {
        Self::with_config(table, backend, codecs, GatewayConfig::default())
    }

    /// # Errors
    ///
    /// Fails when a route offers a format, or the configuration names a fallback
    /// format, that has no registered serializer.
    pub fn with_config(
        table: RouteTable,
        backend: Arc<dyn Backend>,
        codecs: Codecs,
        config: GatewayConfig,
    ) -> anyhow::Result<Self> {
        for unit in table.routes() {
            if let Some(missing) = unit
                .formats()
                .iter()
                .find(|f| codecs.serializer(f).is_none())
            {
                bail!(
                    "route '{}' offers '{}' but no serializer is registered for it",
                    unit.name(),
                    missing
                );
            }
        }
        if codecs.serializer(&config.fallback_format).is_none() {
            bail!(
                "no serializer is registered for fallback format '{}'",
                config.fallback_format
            );
        }

        info!(
            routes_count = table.len(),
            fallback_format = %config.fallback_format,
            expose_errors = config.expose_errors,
            "Gateway ready"
        );
        Ok(Self {
            table: Arc::new(table),
            backend,
            codecs,
            config,
        })
    }

    /// Load the compiled route table named by `config.routes` and use the default codecs.
    pub fn from_config(config: GatewayConfig, backend: Arc<dyn Backend>) -> anyhow::Result<Self> {
        let path = config
            .routes
            .clone()
            .ok_or_else(|| anyhow!("no route table configured (set RPCGATE_ROUTES)"))?;
        let defs = load_route_defs(&path)?;
        let table = RouteTable::from_defs(defs)
            .with_context(|| format!("Invalid route table {}", path.display()))?;
        Self::with_config(table, backend, Codecs::with_defaults(), config)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Match and execute, without error recovery.
    pub fn try_handle(&self, request: &dyn GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let matched = self
            .table
            .match_route(request.method(), request.path_segments())?;
        matched
            .unit
            .execute(request, &self.codecs, self.backend.as_ref())
    }

    /// Serve one request. Never fails: errors become error responses.
    pub fn handle(&self, request: &dyn GatewayRequest) -> GatewayResponse {
        match self.try_handle(request) {
            Ok(response) => {
                debug!(
                    method = %request.method(),
                    segments = request.path_segments().len(),
                    status = response.status.as_u16(),
                    "Request served"
                );
                response
            }
            Err(err) => self.error_response(request, &err),
        }
    }

    /// Error body `{"error": kind, "message": text}` in the fallback format.
    pub fn error_response(&self, request: &dyn GatewayRequest, err: &GatewayError) -> GatewayResponse {
        let status = err.status();
        if err.is_client_error() {
            warn!(
                method = %request.method(),
                status = status.as_u16(),
                kind = err.kind(),
                error = %err,
                "Request rejected"
            );
        } else {
            error!(
                method = %request.method(),
                status = status.as_u16(),
                kind = err.kind(),
                error = %err,
                "Request failed"
            );
        }

        let message = self.config.expose_errors.then(|| err.to_string());
        let mut response = self.encode_error(status, err.kind(), message.as_deref());
        if let GatewayError::MethodNotAllowed { allowed, .. } = err {
            let allow: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
            response = response.with_header("Allow", &allow.join(", "));
        }
        response
    }

    fn encode_error(&self, status: http::StatusCode, kind: &str, message: Option<&str>) -> GatewayResponse {
        let body = match message {
            Some(message) => json!({ "error": kind, "message": message }),
            None => json!({ "error": kind }),
        };
        match self.codecs.serializer(&self.config.fallback_format) {
            Some(serializer) => match serializer.serialize(&body) {
                Ok(bytes) => GatewayResponse::new(status, serializer.content_type(), bytes),
                Err(e) => {
                    error!(error = %e, "Failed to encode error body, falling back to JSON");
                    GatewayResponse::json_error(status, kind, message)
                }
            },
            None => GatewayResponse::json_error(status, kind, message),
        }
    }
}
