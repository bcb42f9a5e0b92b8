use crate::error::CompileError;
use crate::idl::{load_unit, OperationSignature, SignatureSet};
use crate::router::PathTemplate;
use crate::spec::{
    load_manifest, Manifest, ManifestRoute, ParameterBinding, ParameterSource, RouteDef,
    TypedBinding, DEFAULT_FORMAT,
};
use crate::validator::ValidationIssue;
use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Methods a manifest route may use.
pub const SUPPORTED_METHODS: &[&str] = &[
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "TRACE",
];

static MEDIA_TYPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*$")
        .expect("media type regex should be valid")
});

static ROUTE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$").expect("route name regex should be valid")
});

/// Read every interface-definition unit a manifest lists.
///
/// Unit paths are resolved relative to `base_dir`. Unreadable or unparsable units
/// abort immediately; inconsistencies between units are returned as issues.
pub fn load_signatures(
    manifest: &Manifest,
    base_dir: &Path,
    issues: &mut Vec<ValidationIssue>,
) -> Result<SignatureSet, CompileError> {
    let mut signatures = SignatureSet::new();
    for definition in &manifest.definitions {
        let path = base_dir.join(definition);
        let unit = load_unit(&path)?;
        signatures.add_unit(&path, &unit, issues);
    }
    debug!(
        units = manifest.definitions.len(),
        operations = signatures.len(),
        "Operation signatures loaded"
    );
    Ok(signatures)
}

/// Compile a manifest against a set of operation signatures.
///
/// Every route is checked and every issue collected before deciding; a single
/// issue anywhere fails the whole compilation and nothing is returned.
pub fn compile(manifest: &Manifest, signatures: &SignatureSet) -> Result<Vec<RouteDef>, CompileError> {
    let mut issues = Vec::new();
    let routes = compile_routes(manifest, signatures, &mut issues);
    finish(routes, issues)
}

/// Load a manifest file and its definitions, then compile.
pub fn compile_file(manifest_path: &Path) -> Result<Vec<RouteDef>, CompileError> {
    let manifest = load_manifest(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let mut issues = Vec::new();
    let signatures = load_signatures(&manifest, base_dir, &mut issues)?;
    let routes = compile_routes(&manifest, &signatures, &mut issues);
    finish(routes, issues)
}

fn finish(routes: Vec<RouteDef>, issues: Vec<ValidationIssue>) -> Result<Vec<RouteDef>, CompileError> {
    if issues.is_empty() {
        info!(routes_count = routes.len(), "Route manifest compiled");
        Ok(routes)
    } else {
        warn!(issues_count = issues.len(), "Route manifest rejected");
        Err(CompileError::Invalid(issues))
    }
}

fn compile_routes(
    manifest: &Manifest,
    signatures: &SignatureSet,
    issues: &mut Vec<ValidationIssue>,
) -> Vec<RouteDef> {
    let mut routes = Vec::with_capacity(manifest.routes.len());
    let mut names = HashSet::new();
    let mut shapes: HashSet<(String, String)> = HashSet::new();

    for route in &manifest.routes {
        let location = format!("routes.{}", route.name);

        if !ROUTE_NAME_REGEX.is_match(&route.name) {
            issues.push(ValidationIssue::new(
                &location,
                "InvalidName",
                format!("route name '{}' is not a valid identifier", route.name),
            ));
        }
        if !names.insert(route.name.as_str()) {
            issues.push(ValidationIssue::new(
                &location,
                "DuplicateRoute",
                "route name is used more than once",
            ));
        }
        if !shapes.insert((route.method.to_ascii_uppercase(), route.path.clone())) {
            issues.push(ValidationIssue::new(
                &location,
                "DuplicateRoute",
                format!(
                    "{} {} is already declared by an earlier route",
                    route.method, route.path
                ),
            ));
        }

        if let Some(def) = compile_route(route, signatures, &location, issues) {
            routes.push(def);
        }
    }
    routes
}

fn parse_method(route: &ManifestRoute, location: &str, issues: &mut Vec<ValidationIssue>) -> Option<Method> {
    let upper = route.method.to_ascii_uppercase();
    if !SUPPORTED_METHODS.contains(&upper.as_str()) {
        issues.push(ValidationIssue::new(
            location,
            "UnknownMethod",
            format!("'{}' is not a supported HTTP method", route.method),
        ));
        return None;
    }
    Method::from_bytes(upper.as_bytes()).ok()
}

fn compile_route(
    route: &ManifestRoute,
    signatures: &SignatureSet,
    location: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<RouteDef> {
    let method = parse_method(route, location, issues);

    let template = match PathTemplate::parse(&route.path) {
        Ok(t) => Some(t),
        Err(e) => {
            issues.push(ValidationIssue::new(location, "InvalidPath", e.to_string()));
            None
        }
    };

    let formats = resolve_formats(route, location, issues);

    let Some(signature) = signatures.get(&route.operation) else {
        issues.push(ValidationIssue::new(
            location,
            "UnknownOperation",
            format!("operation '{}' is not defined", route.operation),
        ));
        return None;
    };

    let bindings = resolve_bindings(route, signature, location, issues);
    let (method, template, (formats, default_format), bindings) =
        (method?, template?, formats?, bindings?);

    let mut ok = true;
    for b in &bindings {
        let binding = &b.binding;
        if binding.source == ParameterSource::Url && template.position_of(&binding.key).is_none() {
            issues.push(ValidationIssue::new(
                location,
                "UnknownPathParameter",
                format!(
                    "parameter '{}' is bound to url key '{}', which is not a parameter of {}",
                    binding.name, binding.key, template
                ),
            ));
            ok = false;
        }
    }
    for param in template.parameter_names() {
        let bound = bindings
            .iter()
            .any(|b| b.binding.source == ParameterSource::Url && b.binding.key == param);
        if !bound {
            warn!(
                route = %route.name,
                param = %param,
                "Path parameter is not passed to the operation"
            );
        }
    }
    if !ok {
        return None;
    }

    debug!(
        route = %route.name,
        method = %method,
        path = %route.path,
        operation = %signature.fully_qualified_name,
        bindings = bindings.len(),
        "Route compiled"
    );

    Some(RouteDef {
        name: route.name.clone(),
        method,
        path: route.path.clone(),
        operation: signature.fully_qualified_name.clone(),
        bindings,
        formats,
        default_format,
    })
}

/// Complete explicit bindings and add the defaults.
///
/// Explicit bindings default to `source = url` and `key = name`; signature
/// parameters without one get a URL binding keyed by their own name. The result
/// is in signature order.
fn resolve_bindings(
    route: &ManifestRoute,
    signature: &OperationSignature,
    location: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Vec<TypedBinding>> {
    let mut ok = true;
    let mut seen = HashSet::new();
    for param in &route.params {
        if !seen.insert(param.name.as_str()) {
            issues.push(ValidationIssue::new(
                location,
                "DuplicateBinding",
                format!("parameter '{}' is bound more than once", param.name),
            ));
            ok = false;
        }
        if signature.param(&param.name).is_none() {
            issues.push(ValidationIssue::new(
                location,
                "SurplusBinding",
                format!(
                    "operation '{}' has no parameter '{}'",
                    signature.fully_qualified_name, param.name
                ),
            ));
            ok = false;
        }
    }
    if !ok {
        return None;
    }

    let bindings = signature
        .parameters
        .iter()
        .map(|sig| {
            let explicit = route.params.iter().find(|p| p.name == sig.name);
            TypedBinding {
                binding: ParameterBinding {
                    name: sig.name.clone(),
                    source: explicit
                        .and_then(|p| p.source)
                        .unwrap_or(ParameterSource::Url),
                    key: explicit
                        .and_then(|p| p.key.clone())
                        .unwrap_or_else(|| sig.name.clone()),
                    optional: explicit.is_some_and(|p| p.optional),
                },
                ty: sig.ty.clone(),
            }
        })
        .collect();
    Some(bindings)
}

fn resolve_formats(
    route: &ManifestRoute,
    location: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<(Vec<String>, String)> {
    let formats: Vec<String> = if route.formats.is_empty() {
        vec![DEFAULT_FORMAT.to_string()]
    } else {
        route.formats.iter().map(|f| f.trim().to_ascii_lowercase()).collect()
    };

    let mut ok = true;
    for format in &formats {
        if !MEDIA_TYPE_REGEX.is_match(format) {
            issues.push(ValidationIssue::new(
                location,
                "InvalidFormat",
                format!("'{format}' is not a media type"),
            ));
            ok = false;
        }
    }

    let default_format = match &route.default_format {
        Some(d) => {
            let d = d.trim().to_ascii_lowercase();
            if !formats.contains(&d) {
                issues.push(ValidationIssue::new(
                    location,
                    "DefaultFormatNotOffered",
                    format!("default format '{d}' is not one of the route's formats"),
                ));
                ok = false;
            }
            d
        }
        None => formats.first().cloned().unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
    };

    ok.then_some((formats, default_format))
}
