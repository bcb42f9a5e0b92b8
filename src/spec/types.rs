use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where a single operation argument is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSource {
    /// A `{param}` segment of the route's path template
    #[serde(alias = "path")]
    Url,
    /// A query string key
    Query,
    /// A request header (case-insensitive name)
    Header,
    /// A cookie from the `Cookie` header (value is URL-decoded)
    Cookie,
    /// A top-level field of the deserialized request body
    Body,
}

impl ParameterSource {
    /// Variant name as written in generated Rust code.
    pub fn variant_name(&self) -> &'static str {
        match self {
            ParameterSource::Url => "Url",
            ParameterSource::Query => "Query",
            ParameterSource::Header => "Header",
            ParameterSource::Cookie => "Cookie",
            ParameterSource::Body => "Body",
        }
    }
}

impl fmt::Display for ParameterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterSource::Url => "url",
            ParameterSource::Query => "query",
            ParameterSource::Header => "header",
            ParameterSource::Cookie => "cookie",
            ParameterSource::Body => "body",
        };
        f.write_str(s)
    }
}

/// Target type of a bound parameter, as declared by the operation signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamType {
    String,
    Bool,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    /// Any structured value, passed through untouched
    Json,
    /// Homogeneous list; comma-separated when read from text sources
    List(Box<ParamType>),
}

impl ParamType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ParamType::I32
                | ParamType::I64
                | ParamType::U32
                | ParamType::U64
                | ParamType::F32
                | ParamType::F64
        )
    }

    /// Rust expression constructing this type, used by the code generator.
    pub fn rust_expr(&self) -> String {
        match self {
            ParamType::String => "ParamType::String".to_string(),
            ParamType::Bool => "ParamType::Bool".to_string(),
            ParamType::I32 => "ParamType::I32".to_string(),
            ParamType::I64 => "ParamType::I64".to_string(),
            ParamType::U32 => "ParamType::U32".to_string(),
            ParamType::U64 => "ParamType::U64".to_string(),
            ParamType::F32 => "ParamType::F32".to_string(),
            ParamType::F64 => "ParamType::F64".to_string(),
            ParamType::Json => "ParamType::Json".to_string(),
            ParamType::List(inner) => format!("ParamType::List(Box::new({}))", inner.rust_expr()),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::String => f.write_str("string"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::I32 => f.write_str("i32"),
            ParamType::I64 => f.write_str("i64"),
            ParamType::U32 => f.write_str("u32"),
            ParamType::U64 => f.write_str("u64"),
            ParamType::F32 => f.write_str("f32"),
            ParamType::F64 => f.write_str("f64"),
            ParamType::Json => f.write_str("json"),
            ParamType::List(inner) => write!(f, "list<{inner}>"),
        }
    }
}

/// Returned when an interface definition names a type the binder cannot convert to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParamType(pub String);

impl fmt::Display for UnknownParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parameter type '{}'", self.0)
    }
}

impl std::error::Error for UnknownParamType {}

impl FromStr for ParamType {
    type Err = UnknownParamType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(inner) = trimmed
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            let inner: ParamType = inner.parse()?;
            if matches!(inner, ParamType::List(_)) {
                return Err(UnknownParamType(s.to_string()));
            }
            return Ok(ParamType::List(Box::new(inner)));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(ParamType::String),
            "bool" | "boolean" => Ok(ParamType::Bool),
            "i32" | "int" => Ok(ParamType::I32),
            "i64" | "long" => Ok(ParamType::I64),
            "u32" => Ok(ParamType::U32),
            "u64" => Ok(ParamType::U64),
            "f32" | "float" => Ok(ParamType::F32),
            "f64" | "double" => Ok(ParamType::F64),
            "json" | "any" | "object" => Ok(ParamType::Json),
            _ => Err(UnknownParamType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ParamType {
    type Error = UnknownParamType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParamType> for String {
    fn from(ty: ParamType) -> Self {
        ty.to_string()
    }
}

/// Where a single operation argument comes from. `key` defaults to `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBinding {
    pub name: String,
    pub source: ParameterSource,
    pub key: String,
    /// When set, an absent value is passed to the backend as `null`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// A binding completed with the type taken from the operation signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedBinding {
    #[serde(flatten)]
    pub binding: ParameterBinding,
    #[serde(rename = "type")]
    pub ty: ParamType,
}

/// Compiled, serialisable form of one route.
///
/// Produced by the route compiler and consumed at process start, either from
/// `routes.json` or from a generated `routes.rs` registration list. Bindings are
/// kept in the operation signature's parameter order, which is the argument order
/// of the backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDef {
    pub name: String,
    #[serde(with = "method_serde")]
    pub method: Method,
    pub path: String,
    pub operation: String,
    #[serde(default)]
    pub bindings: Vec<TypedBinding>,
    pub formats: Vec<String>,
    pub default_format: String,
}

pub const DEFAULT_FORMAT: &str = "application/json";

impl RouteDef {
    /// Start a route definition that serializes to JSON only.
    pub fn new(name: &str, method: Method, path: &str, operation: &str) -> Self {
        Self {
            name: name.to_string(),
            method,
            path: path.to_string(),
            operation: operation.to_string(),
            bindings: Vec::new(),
            formats: vec![DEFAULT_FORMAT.to_string()],
            default_format: DEFAULT_FORMAT.to_string(),
        }
    }

    /// Append a binding; call in signature order.
    pub fn bind(
        mut self,
        name: &str,
        source: ParameterSource,
        key: &str,
        ty: ParamType,
        optional: bool,
    ) -> Self {
        self.bindings.push(TypedBinding {
            binding: ParameterBinding {
                name: name.to_string(),
                source,
                key: key.to_string(),
                optional,
            },
            ty,
        });
        self
    }

    /// Replace the offered formats and the format used when the client states no preference.
    pub fn formats(mut self, formats: &[&str], default_format: &str) -> Self {
        self.formats = formats.iter().map(|f| f.to_string()).collect();
        self.default_format = default_format.to_string();
        self
    }
}

/// Route manifest: the human-authored compiler input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Interface-definition files, relative to the manifest's directory
    #[serde(default)]
    pub definitions: Vec<PathBuf>,
    #[serde(default)]
    pub routes: Vec<ManifestRoute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRoute {
    pub name: String,
    pub method: String,
    pub path: String,
    pub operation: String,
    #[serde(default)]
    pub params: Vec<ManifestParam>,
    #[serde(default)]
    pub formats: Vec<String>,
    #[serde(default)]
    pub default_format: Option<String>,
}

/// An explicit binding in the manifest; unset fields are completed by the compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestParam {
    pub name: String,
    #[serde(default)]
    pub source: Option<ParameterSource>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

mod method_serde {
    use http::Method;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(method: &Method, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Method, D::Error> {
        let raw = String::deserialize(d)?;
        Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(D::Error::custom)
    }
}
