use super::backend::Backend;
use crate::codec::{essence, Codecs};
use crate::error::GatewayError;
use crate::negotiate;
use crate::params::{Extractor, ParameterBinder};
use crate::router::PathTemplate;
use crate::server::{GatewayRequest, GatewayResponse};
use crate::spec::{ParameterSource, RouteDef};
use anyhow::{anyhow, Context};
use http::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Runtime form of one compiled route.
///
/// Holds everything needed to serve a matched request: the parsed template, one
/// [`Extractor`] per operation parameter in signature order, and the formats the
/// route can answer in.
#[derive(Debug, Clone)]
pub struct DispatchUnit {
    name: String,
    method: Method,
    template: PathTemplate,
    operation: String,
    extractors: Vec<Extractor>,
    formats: Vec<String>,
    default_format: String,
    reads_body: bool,
}

impl DispatchUnit {
    /// Build a unit from a compiled route definition.
    ///
    /// # Errors
    ///
    /// Fails if the template does not parse, a URL binding names no template
    /// parameter, or the route offers no formats.
    pub fn from_def(def: RouteDef) -> anyhow::Result<Self> {
        let template = PathTemplate::parse(&def.path)
            .with_context(|| format!("route '{}' has an invalid path", def.name))?;

        let extractors = def
            .bindings
            .iter()
            .map(|b| {
                Extractor::new(b, &template).ok_or_else(|| {
                    anyhow!(
                        "route '{}': url binding '{}' names no parameter of {}",
                        def.name,
                        b.binding.name,
                        template
                    )
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        if def.formats.is_empty() {
            return Err(anyhow!("route '{}' offers no formats", def.name));
        }

        for param in template.parameter_names() {
            let bound = extractors
                .iter()
                .any(|e| e.source == ParameterSource::Url && e.key == param);
            if !bound {
                warn!(
                    route = %def.name,
                    route_pattern = %template,
                    param = %param,
                    "Path parameter is not bound to any operation argument"
                );
            }
        }

        let reads_body = extractors.iter().any(|e| e.source == ParameterSource::Body);
        Ok(Self {
            name: def.name,
            method: def.method,
            template,
            operation: def.operation,
            extractors,
            formats: def.formats,
            default_format: def.default_format,
            reads_body,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn extractors(&self) -> &[Extractor] {
        &self.extractors
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn default_format(&self) -> &str {
        &self.default_format
    }

    pub fn reads_body(&self) -> bool {
        self.reads_body
    }

    /// Decode the request body with the deserializer for its content type.
    ///
    /// Only called for routes with body bindings; an empty body yields `None`.
    fn decode_body(
        &self,
        request: &dyn GatewayRequest,
        codecs: &Codecs,
    ) -> Result<Option<Value>, GatewayError> {
        let body = request.body();
        if body.is_empty() {
            return Ok(None);
        }
        let content_type = request.content_type().unwrap_or_default();
        let Some(deserializer) = codecs.deserializer(content_type) else {
            debug!(route = %self.name, content_type = %content_type, "No deserializer");
            return Err(GatewayError::UnsupportedMediaType {
                content_type: content_type.to_string(),
            });
        };
        deserializer
            .deserialize(body)
            .map(Some)
            .map_err(|e| GatewayError::MalformedBody {
                content_type: essence(content_type),
                message: e.message,
            })
    }

    /// Serve a request already matched to this unit.
    ///
    /// Negotiates the response format first, so a client that accepts none of
    /// the route's formats never reaches the backend. Then decodes the body if
    /// the route reads one, binds every argument in signature order, invokes the
    /// backend and serializes its result.
    pub fn execute(
        &self,
        request: &dyn GatewayRequest,
        codecs: &Codecs,
        backend: &dyn Backend,
    ) -> Result<GatewayResponse, GatewayError> {
        let format = negotiate::select(request.accept(), &self.formats, &self.default_format)?;

        let body = if self.reads_body {
            self.decode_body(request, codecs)?
        } else {
            None
        };

        let binder = ParameterBinder::new(request, body.as_ref());
        let args = self
            .extractors
            .iter()
            .map(|e| binder.argument(e))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            route = %self.name,
            operation = %self.operation,
            arg_count = args.len(),
            format = %format,
            "Arguments bound"
        );

        let result = backend
            .invoke(&self.operation, args)
            .map_err(|fault| GatewayError::BackendFault {
                operation: self.operation.clone(),
                message: fault.message,
            })?;

        let serializer = codecs
            .serializer(format)
            .ok_or_else(|| GatewayError::ResponseEncoding {
                media_type: format.to_string(),
                message: "no serializer registered".to_string(),
            })?;
        let bytes = serializer
            .serialize(&result)
            .map_err(|e| GatewayError::ResponseEncoding {
                media_type: format.to_string(),
                message: e.message,
            })?;

        Ok(GatewayResponse::new(
            StatusCode::OK,
            serializer.content_type(),
            bytes,
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::dispatcher::EchoBackend;
    use crate::server::ParsedRequest;
    use crate::spec::ParamType;
    use serde_json::json;

    fn unit() -> DispatchUnit {
        DispatchUnit::from_def(
            RouteDef::new("get_item", Method::GET, "/item/{id}", "shop.Items.get")
                .bind("id", ParameterSource::Url, "id", ParamType::I64, false)
                .bind("verbose", ParameterSource::Query, "v", ParamType::Bool, true),
        )
        .unwrap()
    }

    #[test]
    fn test_args_in_signature_order() {
        let req = ParsedRequest::new(Method::GET, "/item/1234?v=true");
        let res = unit()
            .execute(&req, &Codecs::with_defaults(), &EchoBackend)
            .unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json().unwrap()["args"], json!([1234, true]));
    }

    #[test]
    fn test_conversion_failure() {
        let req = ParsedRequest::new(Method::GET, "/item/abc");
        let err = unit()
            .execute(&req, &Codecs::with_defaults(), &EchoBackend)
            .unwrap_err();
        assert!(matches!(err, GatewayError::ParameterConversionFailed { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_unknown_url_binding_is_rejected() {
        let def = RouteDef::new("bad", Method::GET, "/item/{id}", "a.B.c").bind(
            "other",
            ParameterSource::Url,
            "other",
            ParamType::String,
            false,
        );
        assert!(DispatchUnit::from_def(def).is_err());
    }
}
