//! Gateway runtime configuration.
//!
//! Read from a TOML file, then overridden by environment variables:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `RPCGATE_ROUTES` | `routes` | none |
//! | `RPCGATE_FALLBACK_FORMAT` | `fallback_format` | `application/json` |
//! | `RPCGATE_EXPOSE_ERRORS` | `expose_errors` | `true` |
//!
//! ```toml
//! routes = "target/rpcgate/routes.json"
//! fallback_format = "application/json"
//! expose_errors = false
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::spec::DEFAULT_FORMAT;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Compiled route table (`routes.json`) loaded at start-up
    pub routes: Option<PathBuf>,
    /// Media type error bodies are written in
    pub fallback_format: String,
    /// Include error messages in error bodies; when false only the error kind is sent
    pub expose_errors: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            routes: None,
            fallback_format: DEFAULT_FORMAT.to_string(),
            expose_errors: true,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl GatewayConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Read a TOML file and apply environment overrides on top.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read gateway config {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse gateway config {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    /// Apply `RPCGATE_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; `apply_env` with an injectable source.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(routes) = lookup("RPCGATE_ROUTES").filter(|v| !v.trim().is_empty()) {
            self.routes = Some(PathBuf::from(routes));
        }
        if let Some(format) = lookup("RPCGATE_FALLBACK_FORMAT").filter(|v| !v.trim().is_empty()) {
            self.fallback_format = format.trim().to_string();
        }
        if let Some(raw) = lookup("RPCGATE_EXPOSE_ERRORS") {
            match parse_flag(&raw) {
                Some(flag) => self.expose_errors = flag,
                None => warn!(value = %raw, "Ignoring invalid RPCGATE_EXPOSE_ERRORS"),
            }
        }
        debug!(
            routes = ?self.routes,
            fallback_format = %self.fallback_format,
            expose_errors = self.expose_errors,
            "Gateway configuration resolved"
        );
    }
}
