use askama::Template;

use crate::spec::{RouteDef, TypedBinding};

/// One `.bind(..)` call in the generated registration list.
///
/// Every field holds finished Rust source text, so the template only places them.
#[derive(Debug, Clone)]
pub struct BindingEntry {
    pub name: String,
    pub source: &'static str,
    pub key: String,
    pub ty: String,
    pub optional: bool,
}

/// One `RouteDef::new(..)` chain in the generated registration list.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub name: String,
    pub method: String,
    pub path: String,
    pub operation: String,
    pub bindings: Vec<BindingEntry>,
    /// Comma-separated string literals
    pub formats: String,
    pub default_format: String,
    pub method_name: String,
    pub path_display: String,
    pub operation_display: String,
}

/// Template data for generating `routes.rs`
#[derive(Template)]
#[template(path = "routes.rs.txt", escape = "none")]
pub struct RoutesRsTemplateData {
    /// Manifest the routes were compiled from, for the header comment
    pub source: String,
    pub routes: Vec<RouteEntry>,
}

/// Rust string literal for `s`.
pub fn rust_literal(s: &str) -> String {
    format!("{s:?}")
}

/// Text safe to place in a `//` comment.
fn comment_text(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

impl From<&TypedBinding> for BindingEntry {
    fn from(b: &TypedBinding) -> Self {
        Self {
            name: rust_literal(&b.binding.name),
            source: b.binding.source.variant_name(),
            key: rust_literal(&b.binding.key),
            ty: b.ty.rust_expr(),
            optional: b.binding.optional,
        }
    }
}

impl From<&RouteDef> for RouteEntry {
    fn from(def: &RouteDef) -> Self {
        Self {
            name: rust_literal(&def.name),
            method: format!("Method::{}", def.method.as_str()),
            path: rust_literal(&def.path),
            operation: rust_literal(&def.operation),
            bindings: def.bindings.iter().map(BindingEntry::from).collect(),
            formats: def
                .formats
                .iter()
                .map(|f| rust_literal(f))
                .collect::<Vec<_>>()
                .join(", "),
            default_format: rust_literal(&def.default_format),
            method_name: def.method.as_str().to_string(),
            path_display: comment_text(&def.path),
            operation_display: comment_text(&def.operation),
        }
    }
}

/// Render the generated registration list for `routes`.
pub fn render_routes_rs(source: &str, routes: &[RouteDef]) -> Result<String, askama::Error> {
    RoutesRsTemplateData {
        source: comment_text(source),
        routes: routes.iter().map(RouteEntry::from).collect(),
    }
    .render()
}
