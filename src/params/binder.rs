use super::convert::{convert_text, convert_value};
use crate::error::GatewayError;
use crate::router::PathTemplate;
use crate::server::GatewayRequest;
use crate::spec::{ParamType, ParameterSource, TypedBinding};
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

/// Precomputed extraction step for one operation argument.
///
/// Built once per route at start-up. URL bindings carry the position of their
/// `{param}` in the template so that binding never scans the template.
#[derive(Debug, Clone, PartialEq)]
pub struct Extractor {
    pub name: String,
    pub source: ParameterSource,
    pub key: String,
    pub ty: ParamType,
    pub optional: bool,
    /// Template position, set for [`ParameterSource::Url`] only
    pub position: Option<usize>,
}

impl Extractor {
    /// Returns `None` for a URL binding whose key is not a parameter of `template`.
    pub fn new(binding: &TypedBinding, template: &PathTemplate) -> Option<Self> {
        let b = &binding.binding;
        let position = match b.source {
            ParameterSource::Url => Some(template.position_of(&b.key)?),
            _ => None,
        };
        Some(Self {
            name: b.name.clone(),
            source: b.source,
            key: b.key.clone(),
            ty: binding.ty.clone(),
            optional: b.optional,
            position,
        })
    }

    fn missing(&self) -> GatewayError {
        GatewayError::ParameterMissing {
            name: self.name.clone(),
            source: self.source,
            key: self.key.clone(),
        }
    }

    fn conversion_failed(&self) -> GatewayError {
        GatewayError::ParameterConversionFailed {
            name: self.name.clone(),
            expected: self.ty.clone(),
        }
    }
}

/// A value as found at its source, before conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue<'a> {
    /// Text from the URL, query string, a header or a cookie
    Text(Cow<'a, str>),
    /// A field of the deserialized body
    Structured(&'a Value),
}

/// Extracts and converts the arguments of one request.
pub struct ParameterBinder<'r> {
    request: &'r dyn GatewayRequest,
    body: Option<&'r Value>,
}

impl<'r> ParameterBinder<'r> {
    /// `body` is the deserialized request body, if the route reads one.
    pub fn new(request: &'r dyn GatewayRequest, body: Option<&'r Value>) -> Self {
        Self { request, body }
    }

    /// Find the raw value for an extractor; `None` when the source has nothing under the key.
    pub fn lookup(&self, extractor: &Extractor) -> Option<RawValue<'r>> {
        match extractor.source {
            ParameterSource::Url => extractor
                .position
                .and_then(|i| self.request.path_segments().get(i))
                .map(|s| RawValue::Text(Cow::Borrowed(s.as_str()))),
            ParameterSource::Query | ParameterSource::Header => self
                .request
                .lookup(extractor.source, &extractor.key)
                .map(|s| RawValue::Text(Cow::Borrowed(s))),
            ParameterSource::Cookie => self
                .request
                .lookup(ParameterSource::Cookie, &extractor.key)
                .map(|raw| {
                    RawValue::Text(urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw)))
                }),
            // an explicit `null` field counts as absent
            ParameterSource::Body => self
                .body
                .and_then(|body| body.get(&extractor.key))
                .filter(|v| !v.is_null())
                .map(RawValue::Structured),
        }
    }

    /// Convert a found value to the extractor's type.
    pub fn convert(&self, extractor: &Extractor, raw: &RawValue<'_>) -> Result<Value, GatewayError> {
        let converted = match raw {
            RawValue::Text(text) => convert_text(text, &extractor.ty),
            RawValue::Structured(value) => convert_value(value, &extractor.ty),
        };
        converted.ok_or_else(|| {
            debug!(
                param = %extractor.name,
                source = %extractor.source,
                expected = %extractor.ty,
                "Parameter conversion failed"
            );
            extractor.conversion_failed()
        })
    }

    /// Look up and convert, treating absence as a binder-level outcome.
    ///
    /// Returns `Ok(None)` when nothing was found; deciding whether that is an
    /// error is left to [`ParameterBinder::argument`].
    pub fn bind(&self, extractor: &Extractor) -> Result<Option<Value>, GatewayError> {
        match self.lookup(extractor) {
            Some(raw) => self.convert(extractor, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Produce the backend argument for an extractor.
    ///
    /// Absent optional values become `null`; absent required values are
    /// [`GatewayError::ParameterMissing`].
    pub fn argument(&self, extractor: &Extractor) -> Result<Value, GatewayError> {
        match self.bind(extractor)? {
            Some(value) => Ok(value),
            None if extractor.optional => Ok(Value::Null),
            None => {
                debug!(
                    param = %extractor.name,
                    source = %extractor.source,
                    key = %extractor.key,
                    "Required parameter missing"
                );
                Err(extractor.missing())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::server::ParsedRequest;
    use crate::spec::ParameterBinding;
    use http::Method;
    use serde_json::json;

    fn extractor(name: &str, source: ParameterSource, key: &str, ty: ParamType) -> Extractor {
        let template = PathTemplate::parse("/item/{id}").unwrap();
        let binding = TypedBinding {
            binding: ParameterBinding {
                name: name.into(),
                source,
                key: key.into(),
                optional: false,
            },
            ty,
        };
        Extractor::new(&binding, &template).unwrap()
    }

    #[test]
    fn test_url_position_is_precomputed() {
        let e = extractor("id", ParameterSource::Url, "id", ParamType::I64);
        assert_eq!(e.position, Some(1));

        let template = PathTemplate::parse("/item/{id}").unwrap();
        let binding = TypedBinding {
            binding: ParameterBinding {
                name: "x".into(),
                source: ParameterSource::Url,
                key: "x".into(),
                optional: false,
            },
            ty: ParamType::String,
        };
        assert!(Extractor::new(&binding, &template).is_none());
    }

    #[test]
    fn test_cookie_is_url_decoded() {
        let req = ParsedRequest::new(Method::GET, "/item/1").with_header("Cookie", "who=a%20b");
        let binder = ParameterBinder::new(&req, None);
        let e = extractor("who", ParameterSource::Cookie, "who", ParamType::String);
        assert_eq!(binder.argument(&e).unwrap(), json!("a b"));
    }

    #[test]
    fn test_missing_and_optional() {
        let req = ParsedRequest::new(Method::GET, "/item/1");
        let binder = ParameterBinder::new(&req, None);
        let mut e = extractor("limit", ParameterSource::Query, "limit", ParamType::U32);
        assert!(matches!(
            binder.argument(&e),
            Err(GatewayError::ParameterMissing { .. })
        ));
        e.optional = true;
        assert_eq!(binder.argument(&e).unwrap(), Value::Null);
    }

    #[test]
    fn test_body_field_absent_is_not_an_error_at_binder_level() {
        let req = ParsedRequest::new(Method::POST, "/item/1");
        let body = json!({"name": "rex"});
        let binder = ParameterBinder::new(&req, Some(&body));
        let e = extractor("age", ParameterSource::Body, "age", ParamType::I32);
        assert_eq!(binder.bind(&e).unwrap(), None);
        let e = extractor("name", ParameterSource::Body, "name", ParamType::String);
        assert_eq!(binder.bind(&e).unwrap(), Some(json!("rex")));
    }

    #[test]
    fn test_null_body_field_counts_as_absent() {
        let req = ParsedRequest::new(Method::POST, "/item/1");
        let body = json!({"age": null});
        let binder = ParameterBinder::new(&req, Some(&body));

        let mut e = extractor("age", ParameterSource::Body, "age", ParamType::I32);
        assert!(matches!(
            binder.argument(&e),
            Err(GatewayError::ParameterMissing { .. })
        ));
        e.optional = true;
        assert_eq!(binder.argument(&e).unwrap(), Value::Null);
    }
}
