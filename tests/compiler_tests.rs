#![allow(clippy::unwrap_used)]

mod common;

use common::fixtures::{write_shop, SHOP_IDL};
use common::temp_files::{dir_entries, write_file};
use http::Method;
use rpcgate::compiler::compile_file;
use rpcgate::error::CompileError;
use rpcgate::generator::{compile_to_dir, EmitOptions, ROUTES_JSON, ROUTES_RS};
use rpcgate::spec::{load_route_defs, ParamType, ParameterSource};
use tempfile::tempdir;

#[test]
fn test_shop_manifest_compiles_in_order() {
    let dir = tempdir().unwrap();
    let routes = compile_file(&write_shop(dir.path())).unwrap();

    let names: Vec<&str> = routes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        ["ping", "get_item", "list_items", "remove_item", "create_item"]
    );

    let get_item = &routes[1];
    assert_eq!(get_item.method, Method::GET);
    assert_eq!(get_item.operation, "shop.Items.get");
    assert_eq!(get_item.bindings.len(), 2);
    // `id` had no explicit binding and defaults to the url key of the same name.
    assert_eq!(get_item.bindings[0].binding.source, ParameterSource::Url);
    assert_eq!(get_item.bindings[0].binding.key, "id");
    assert_eq!(get_item.bindings[0].ty, ParamType::I64);
    assert_eq!(get_item.bindings[1].binding.key, "v");
    assert!(get_item.bindings[1].binding.optional);

    let list = &routes[2];
    assert_eq!(list.bindings[0].ty, ParamType::List(Box::new(ParamType::String)));

    let create = &routes[4];
    let sources: Vec<ParameterSource> = create.bindings.iter().map(|b| b.binding.source).collect();
    assert_eq!(
        sources,
        [
            ParameterSource::Body,
            ParameterSource::Body,
            ParameterSource::Header,
            ParameterSource::Cookie
        ]
    );
    assert_eq!(create.default_format, "application/json");
    assert_eq!(routes[0].formats, ["application/json", "text/plain"]);
}

#[test]
fn test_definitions_resolve_relative_to_manifest() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("idl");
    std::fs::create_dir_all(&nested).unwrap();
    write_file(&nested, "shop.idl.yaml", SHOP_IDL);
    let manifest = write_file(
        dir.path(),
        "routes.json",
        r#"{
            "definitions": ["idl/shop.idl.yaml"],
            "routes": [
                {"name": "ping", "method": "get", "path": "/ping", "operation": "shop.Health.ping"}
            ]
        }"#,
    );

    let routes = compile_file(&manifest).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].method, Method::GET);
    assert!(routes[0].bindings.is_empty());
}

#[test]
fn test_toml_manifest() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "shop.idl.yaml", SHOP_IDL);
    let manifest = write_file(
        dir.path(),
        "routes.toml",
        r#"
definitions = ["shop.idl.yaml"]

[[routes]]
name = "remove_item"
method = "DELETE"
path = "/item/{id}"
operation = "shop.Items.remove"
"#,
    );
    let routes = compile_file(&manifest).unwrap();
    assert_eq!(routes[0].method, Method::DELETE);
    assert_eq!(routes[0].bindings[0].binding.key, "id");
}

#[test]
fn test_operation_defined_twice_across_units() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.idl.yaml", SHOP_IDL);
    write_file(dir.path(), "b.idl.yaml", SHOP_IDL);
    let manifest = write_file(
        dir.path(),
        "routes.yaml",
        "definitions: [a.idl.yaml, b.idl.yaml]\nroutes: []\n",
    );

    let err = compile_file(&manifest).unwrap_err();
    let issues = err.issues();
    assert!(!issues.is_empty());
    assert!(issues.iter().all(|i| i.kind == "DuplicateOperation"));
    assert!(issues.iter().any(|i| i.location.contains("shop.Items.get")));
}

#[test]
fn test_missing_definition_file() {
    let dir = tempdir().unwrap();
    let manifest = write_file(
        dir.path(),
        "routes.yaml",
        "definitions: [nowhere.idl.yaml]\nroutes: []\n",
    );
    assert!(matches!(
        compile_file(&manifest).unwrap_err(),
        CompileError::Io { .. }
    ));
}

#[test]
fn test_unparsable_manifest() {
    let dir = tempdir().unwrap();
    let manifest = write_file(dir.path(), "routes.yaml", "routes: [ {name: \n");
    assert!(matches!(
        compile_file(&manifest).unwrap_err(),
        CompileError::Parse { .. }
    ));
}

#[test]
fn test_failed_compile_writes_nothing() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "shop.idl.yaml", SHOP_IDL);
    let manifest = write_file(
        dir.path(),
        "routes.yaml",
        r#"
definitions: [shop.idl.yaml]
routes:
  - { name: ping, method: GET, path: /, operation: shop.Health.ping }
  - { name: bad, method: GET, path: "/item/{id}", operation: shop.Items.get,
      params: [ { name: id, key: ident } ] }
"#,
    );
    let out = dir.path().join("out");

    let err = compile_to_dir(&manifest, &out, EmitOptions { rust: true }).unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].kind, "UnknownPathParameter");
    assert!(dir_entries(&out).is_empty());
}

#[test]
fn test_compile_to_dir_emits_loadable_table() {
    let dir = tempdir().unwrap();
    let manifest = write_shop(dir.path());
    let out = dir.path().join("out");

    let written = compile_to_dir(&manifest, &out, EmitOptions { rust: true }).unwrap();
    assert_eq!(written, [out.join(ROUTES_JSON), out.join(ROUTES_RS)]);
    assert_eq!(dir_entries(&out), [ROUTES_JSON, ROUTES_RS]);

    let loaded = load_route_defs(&out.join(ROUTES_JSON)).unwrap();
    assert_eq!(loaded, compile_file(&manifest).unwrap());

    let rust = std::fs::read_to_string(out.join(ROUTES_RS)).unwrap();
    assert!(rust.contains("\"shop.Items.create\""));
    assert!(rust.contains("ParameterSource::Cookie"));
    assert!(rust.contains("ParamType::List(Box::new(ParamType::String))"));
}

#[test]
fn test_recompile_replaces_artifacts() {
    let dir = tempdir().unwrap();
    let manifest = write_shop(dir.path());
    let out = dir.path().join("out");
    compile_to_dir(&manifest, &out, EmitOptions::default()).unwrap();

    write_file(
        dir.path(),
        "routes.yaml",
        "definitions: [shop.idl.yaml]\nroutes:\n  - { name: ping, method: GET, path: /, operation: shop.Health.ping }\n",
    );
    compile_to_dir(&manifest, &out, EmitOptions::default()).unwrap();

    assert_eq!(dir_entries(&out), [ROUTES_JSON]);
    assert_eq!(load_route_defs(&out.join(ROUTES_JSON)).unwrap().len(), 1);
}
