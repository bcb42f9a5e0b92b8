use super::types::{Manifest, RouteDef};
use crate::error::CompileError;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Serialization format of a manifest, interface definition or compiled table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension; anything unrecognised is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => DocumentFormat::Json,
            Some("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Parse a document from a string in the given format.
pub fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: DocumentFormat,
) -> Result<T, String> {
    match format {
        DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        DocumentFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

/// Read and parse a document, choosing the format from the extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, CompileError> {
    let content = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, DocumentFormat::from_path(path)).map_err(|message| {
        CompileError::Parse {
            path: path.to_path_buf(),
            message,
        }
    })
}

/// Load a route manifest.
pub fn load_manifest(path: &Path) -> Result<Manifest, CompileError> {
    let manifest: Manifest = load_document(path)?;
    debug!(
        manifest = %path.display(),
        routes = manifest.routes.len(),
        definitions = manifest.definitions.len(),
        "Route manifest loaded"
    );
    Ok(manifest)
}

/// Load a compiled route table (`routes.json`) written by the route compiler.
pub fn load_route_defs(path: &Path) -> anyhow::Result<Vec<RouteDef>> {
    use anyhow::Context;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route table {}", path.display()))?;
    let defs: Vec<RouteDef> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse route table {}", path.display()))?;
    Ok(defs)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::spec::ParameterSource;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/routes.JSON")),
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("routes.toml")),
            DocumentFormat::Toml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("routes.yml")),
            DocumentFormat::Yaml
        );
    }

    #[test]
    fn test_parse_toml_manifest() {
        let src = r#"
definitions = ["shop.yaml"]

[[routes]]
name = "get_item"
method = "GET"
path = "/item/{id}"
operation = "shop.Items.get"

[[routes.params]]
name = "verbose"
source = "query"
key = "v"
"#;
        let manifest: Manifest = parse_document(src, DocumentFormat::Toml).unwrap();
        assert_eq!(manifest.routes.len(), 1);
        let param = &manifest.routes[0].params[0];
        assert_eq!(param.source, Some(ParameterSource::Query));
        assert_eq!(param.key.as_deref(), Some("v"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = parse_document::<Manifest>("routes: [", DocumentFormat::Yaml);
        assert!(err.is_err());
    }
}
