//! Serializer and deserializer capabilities, keyed by MIME type.
//!
//! Routes name the formats they can produce; the gateway checks at start-up that
//! every one of them has a registered [`Serializer`]. Request bodies are decoded by
//! the [`Deserializer`] registered for their `Content-Type`. Formats beyond the
//! built-in JSON, form-urlencoded and plain-text codecs (XML, XSLT-driven HTML)
//! are plugged in through [`Codecs::register_serializer`].

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const JSON: &str = "application/json";
pub const FORM: &str = "application/x-www-form-urlencoded";
pub const TEXT: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecError {
    pub media_type: String,
    pub message: String,
}

impl CodecError {
    pub fn new(media_type: &str, message: impl Into<String>) -> Self {
        Self {
            media_type: media_type.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.media_type, self.message)
    }
}

impl std::error::Error for CodecError {}

/// Writes a backend result in one media type.
pub trait Serializer: Send + Sync {
    /// Value of the response `Content-Type` header.
    fn content_type(&self) -> &str;
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, CodecError>;
}

/// Decodes a request body into a structured value.
pub trait Deserializer: Send + Sync {
    fn deserialize(&self, body: &[u8]) -> Result<Value, CodecError>;
}

/// Lowercased MIME type without parameters: `Text/HTML; charset=x` → `text/html`.
pub fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Serializer for JsonCodec {
    fn content_type(&self) -> &str {
        JSON
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::new(JSON, e.to_string()))
    }
}

impl Deserializer for JsonCodec {
    fn deserialize(&self, body: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(body).map_err(|e| CodecError::new(JSON, e.to_string()))
    }
}

/// `application/x-www-form-urlencoded`. Decoded fields are strings; a repeated
/// key keeps its last value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCodec;

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Serializer for FormCodec {
    fn content_type(&self) -> &str {
        FORM
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let Value::Object(fields) = value else {
            return Err(CodecError::new(FORM, "only objects can be form-encoded"));
        };
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        for (key, field) in fields {
            match field {
                Value::Array(items) => {
                    for item in items {
                        out.append_pair(key, &scalar_text(item));
                    }
                }
                other => {
                    out.append_pair(key, &scalar_text(other));
                }
            }
        }
        Ok(out.finish().into_bytes())
    }
}

impl Deserializer for FormCodec {
    fn deserialize(&self, body: &[u8]) -> Result<Value, CodecError> {
        let fields: Map<String, Value> = url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        Ok(Value::Object(fields))
    }
}

/// `text/plain; charset=utf-8`. Strings are written raw, anything else as JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Serializer for TextCodec {
    fn content_type(&self) -> &str {
        "text/plain; charset=utf-8"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        Ok(match value {
            Value::String(s) => s.clone().into_bytes(),
            other => other.to_string().into_bytes(),
        })
    }
}

/// Registry of codecs keyed by MIME essence.
#[derive(Clone, Default)]
pub struct Codecs {
    serializers: HashMap<String, Arc<dyn Serializer>>,
    deserializers: HashMap<String, Arc<dyn Deserializer>>,
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializers: Vec<&String> = self.serializers.keys().collect();
        serializers.sort();
        let mut deserializers: Vec<&String> = self.deserializers.keys().collect();
        deserializers.sort();
        f.debug_struct("Codecs")
            .field("serializers", &serializers)
            .field("deserializers", &deserializers)
            .finish()
    }
}

impl Codecs {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON and form-urlencoded in both directions, plus a `text/plain` serializer.
    pub fn with_defaults() -> Self {
        let mut codecs = Self::new();
        codecs.register_serializer(JSON, Arc::new(JsonCodec));
        codecs.register_serializer(FORM, Arc::new(FormCodec));
        codecs.register_serializer(TEXT, Arc::new(TextCodec));
        codecs.register_deserializer(JSON, Arc::new(JsonCodec));
        codecs.register_deserializer(FORM, Arc::new(FormCodec));
        codecs
    }

    pub fn register_serializer(&mut self, media_type: &str, serializer: Arc<dyn Serializer>) {
        self.serializers.insert(essence(media_type), serializer);
    }

    pub fn register_deserializer(&mut self, media_type: &str, deserializer: Arc<dyn Deserializer>) {
        self.deserializers.insert(essence(media_type), deserializer);
    }

    pub fn serializer(&self, media_type: &str) -> Option<&Arc<dyn Serializer>> {
        self.serializers.get(&essence(media_type))
    }

    pub fn deserializer(&self, media_type: &str) -> Option<&Arc<dyn Deserializer>> {
        self.deserializers.get(&essence(media_type))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_ignores_case_and_parameters() {
        let codecs = Codecs::with_defaults();
        assert!(codecs.serializer("Application/JSON; charset=utf-8").is_some());
        assert!(codecs.deserializer("application/x-www-form-urlencoded").is_some());
        assert!(codecs.deserializer("text/plain").is_none());
        assert!(codecs.serializer("application/xml").is_none());
    }

    #[test]
    fn test_form_body_fields_are_strings() {
        let value = FormCodec.deserialize(b"flag=true&name=a+b&n=1&n=2").unwrap();
        assert_eq!(value, json!({"flag": "true", "name": "a b", "n": "2"}));
    }

    #[test]
    fn test_form_serializer_rejects_scalars() {
        assert!(FormCodec.serialize(&json!(3)).is_err());
        let bytes = FormCodec.serialize(&json!({"a": [1, 2], "b": "x y"})).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a=1&a=2&b=x+y");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = JsonCodec.deserialize(b"{nope").unwrap_err();
        assert_eq!(err.media_type, JSON);
    }

    #[test]
    fn test_text_writes_strings_raw() {
        assert_eq!(TextCodec.serialize(&json!("hi")).unwrap(), b"hi");
        assert_eq!(TextCodec.serialize(&json!({"a": 1})).unwrap(), br#"{"a":1}"#);
    }
}
