#![allow(clippy::unwrap_used)]

use super::*;
use crate::spec::{ParamType, ParameterSource, RouteDef};
use http::Method;
use tempfile::tempdir;

fn routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("get_item", Method::GET, "/item/{id}", "shop.Items.get")
            .bind("id", ParameterSource::Url, "id", ParamType::I64, false)
            .bind(
                "tags",
                ParameterSource::Query,
                "t",
                ParamType::List(Box::new(ParamType::String)),
                true,
            )
            .formats(&["application/json", "text/plain"], "application/json"),
        RouteDef::new("root", Method::DELETE, "/", "shop.Items.clear"),
    ]
}

#[test]
fn test_rust_literal_escapes() {
    assert_eq!(rust_literal("a\"b"), r#""a\"b""#);
    assert_eq!(rust_literal("/x/{y}"), r#""/x/{y}""#);
}

#[test]
fn test_render_routes_rs() {
    let rendered = render_routes_rs("shop.yaml", &routes()).unwrap();
    assert!(rendered.contains("pub fn routes() -> Vec<RouteDef>"));
    assert!(rendered.contains(
        r#"RouteDef::new("get_item", Method::GET, "/item/{id}", "shop.Items.get")"#
    ));
    assert!(rendered.contains(
        r#".bind("tags", ParameterSource::Query, "t", ParamType::List(Box::new(ParamType::String)), true)"#
    ));
    assert!(rendered.contains(r#".formats(&["application/json", "text/plain"], "application/json")"#));
    assert!(rendered.contains("Method::DELETE"));
    assert!(rendered.contains("from shop.yaml"));
}

#[test]
fn test_json_only_by_default() {
    let artifacts = render_artifacts("m.yaml", &routes(), EmitOptions::default()).unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].file_name, ROUTES_JSON);
    let back: Vec<RouteDef> = serde_json::from_str(&artifacts[0].contents).unwrap();
    assert_eq!(back, routes());
}

#[test]
fn test_write_artifacts_leaves_no_temporaries() {
    let dir = tempdir().unwrap();
    let artifacts = render_artifacts("m.yaml", &routes(), EmitOptions { rust: true }).unwrap();
    let written = write_artifacts(dir.path(), &artifacts).unwrap();
    assert_eq!(written.len(), 2);

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, [ROUTES_JSON, ROUTES_RS]);
}

#[test]
fn test_failed_write_restores_replaced_artifacts() {
    let dir = tempdir().unwrap();
    let json = dir.path().join(ROUTES_JSON);
    std::fs::write(&json, "[]").unwrap();
    // A directory in the way makes the second rename fail.
    std::fs::create_dir(dir.path().join(ROUTES_RS)).unwrap();

    let artifacts = render_artifacts("m.yaml", &routes(), EmitOptions { rust: true }).unwrap();
    assert!(write_artifacts(dir.path(), &artifacts).is_err());

    assert_eq!(std::fs::read_to_string(&json).unwrap(), "[]");
    assert!(dir.path().join(ROUTES_RS).is_dir());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}
