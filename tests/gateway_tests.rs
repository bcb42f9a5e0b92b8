#![allow(clippy::unwrap_used)]

mod common;

use common::fixtures::write_shop;
use http::{Method, StatusCode};
use rpcgate::codec::Codecs;
use rpcgate::compiler::compile_file;
use rpcgate::dispatcher::{BackendFault, EchoBackend, Gateway, InProcessBackend};
use rpcgate::generator::{compile_to_dir, EmitOptions, ROUTES_JSON};
use rpcgate::router::RouteTable;
use rpcgate::runtime_config::GatewayConfig;
use rpcgate::server::ParsedRequest;
use rpcgate::spec::RouteDef;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::tempdir;

fn shop_routes() -> Vec<RouteDef> {
    let dir = tempdir().unwrap();
    compile_file(&write_shop(dir.path())).unwrap()
}

fn echo_gateway() -> Gateway {
    let table = RouteTable::from_defs(shop_routes()).unwrap();
    Gateway::new(table, Arc::new(EchoBackend), Codecs::with_defaults()).unwrap()
}

fn args(res: &rpcgate::server::GatewayResponse) -> Value {
    res.json().unwrap()["args"].clone()
}

#[test]
fn test_root_route_dispatches() {
    let gw = echo_gateway();
    let res = gw.handle(&ParsedRequest::new(Method::GET, "/"));
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.content_type(), Some("application/json"));
    assert_eq!(
        res.json().unwrap(),
        json!({"operation": "shop.Health.ping", "args": []})
    );
}

#[test]
fn test_post_root_is_method_not_allowed() {
    let gw = echo_gateway();
    let res = gw.handle(&ParsedRequest::new(Method::POST, "/"));
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.header("allow"), Some("GET"));
    assert_eq!(res.json().unwrap()["error"], "method_not_allowed");
}

#[test]
fn test_unknown_length_is_not_found() {
    let gw = echo_gateway();
    let res = gw.handle(&ParsedRequest::new(Method::GET, "/x/y/z"));
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json().unwrap()["error"], "route_not_found");
}

#[test]
fn test_allow_lists_every_matching_method() {
    let gw = echo_gateway();
    let res = gw.handle(&ParsedRequest::new(Method::PUT, "/item/7"));
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.header("Allow"), Some("GET, DELETE"));
}

#[test]
fn test_url_integer_binding() {
    let gw = echo_gateway();
    let ok = gw.handle(&ParsedRequest::new(Method::GET, "/item/1234?v=true"));
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(args(&ok), json!([1234, true]));

    let bad = gw.handle(&ParsedRequest::new(Method::GET, "/item/abc"));
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.json().unwrap()["error"], "parameter_conversion_failed");
}

#[test]
fn test_earlier_parameter_route_shadows_literal() {
    let gw = echo_gateway();
    let res = gw.handle(&ParsedRequest::new(Method::GET, "/item/list"));
    // `/item/{id}` was registered first, so "list" is bound to the i64 `id`.
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json().unwrap()["error"], "parameter_conversion_failed");
}

#[test]
fn test_optional_query_binding_is_null() {
    let gw = echo_gateway();
    let res = gw.handle(&ParsedRequest::new(Method::GET, "/item/5"));
    assert_eq!(args(&res), json!([5, null]));
}

#[test]
fn test_boolean_literals_only() {
    let gw = echo_gateway();
    let res = gw.handle(&ParsedRequest::new(Method::GET, "/item/5?v=1"));
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_json_body_header_and_cookie() {
    let gw = echo_gateway();
    let req = ParsedRequest::new(Method::POST, "/items")
        .with_header("content-type", "application/json; charset=utf-8")
        .with_header("x-trace-id", "t-1")
        .with_header("Cookie", "sid=a%2Fb%20c")
        .with_body(r#"{"name": "lamp", "price": 12.5}"#);
    let res = gw.handle(&req);
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(args(&res), json!(["lamp", 12.5, "t-1", "a/b c"]));
}

#[test]
fn test_form_body_conversion() {
    let gw = echo_gateway();
    let req = ParsedRequest::new(Method::POST, "/items")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_header("X-Trace-Id", "t")
        .with_body("name=desk+lamp&price=3");
    let res = gw.handle(&req);
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(args(&res), json!(["desk lamp", 3.0, "t", null]));

    let bad = ParsedRequest::new(Method::POST, "/items")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_header("X-Trace-Id", "t")
        .with_body("name=x&price=cheap");
    assert_eq!(gw.handle(&bad).status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_missing_required_body_field() {
    let gw = echo_gateway();
    let req = ParsedRequest::new(Method::POST, "/items")
        .with_header("Content-Type", "application/json")
        .with_header("X-Trace-Id", "t")
        .with_body(r#"{"name": "lamp"}"#);
    let res = gw.handle(&req);
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json().unwrap()["error"], "parameter_missing");
}

#[test]
fn test_unsupported_and_malformed_bodies() {
    let gw = echo_gateway();
    let xml = ParsedRequest::new(Method::POST, "/items")
        .with_header("Content-Type", "application/xml")
        .with_body("<item/>");
    assert_eq!(gw.handle(&xml).status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let untyped = ParsedRequest::new(Method::POST, "/items").with_body("{}");
    assert_eq!(gw.handle(&untyped).status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let broken = ParsedRequest::new(Method::POST, "/items")
        .with_header("Content-Type", "application/json")
        .with_body("{");
    let res = gw.handle(&broken);
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json().unwrap()["error"], "malformed_body");
}

#[test]
fn test_content_negotiation() {
    let gw = echo_gateway();

    let text = gw.handle(
        &ParsedRequest::new(Method::GET, "/").with_header("Accept", "text/*, application/json;q=0.5"),
    );
    assert_eq!(text.status, StatusCode::OK);
    assert_eq!(text.content_type(), Some("text/plain; charset=utf-8"));

    let blank = gw.handle(&ParsedRequest::new(Method::GET, "/").with_header("Accept", "  "));
    assert_eq!(blank.content_type(), Some("application/json"));

    let refused = gw.handle(&ParsedRequest::new(Method::GET, "/").with_header("Accept", "not/supported"));
    assert_eq!(refused.status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(refused.json().unwrap()["error"], "not_acceptable");
}

#[test]
fn test_backend_fault_and_hidden_messages() {
    let backend = InProcessBackend::new()
        .with("shop.Health.ping", |_| Err(BackendFault::new("database on fire")));
    let config = GatewayConfig {
        expose_errors: false,
        ..GatewayConfig::default()
    };
    let gw = Gateway::with_config(
        RouteTable::from_defs(shop_routes()).unwrap(),
        Arc::new(backend),
        Codecs::with_defaults(),
        config,
    )
    .unwrap();

    let res = gw.handle(&ParsedRequest::new(Method::GET, "/"));
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json().unwrap(), json!({"error": "backend_fault"}));
}

#[test]
fn test_unserializable_format_is_rejected_at_startup() {
    let table = RouteTable::from_defs(shop_routes()).unwrap();
    let err = Gateway::new(table, Arc::new(EchoBackend), Codecs::new()).unwrap_err();
    assert!(err.to_string().contains("no serializer"));
}

#[test]
fn test_gateway_from_compiled_table() {
    let dir = tempdir().unwrap();
    let manifest = write_shop(dir.path());
    let out = dir.path().join("out");
    compile_to_dir(&manifest, &out, EmitOptions::default()).unwrap();

    let config = GatewayConfig {
        routes: Some(out.join(ROUTES_JSON)),
        ..GatewayConfig::default()
    };
    let backend = InProcessBackend::new()
        .with("shop.Items.remove", |args| Ok(json!({ "removed": args[0] })));
    let gw = Gateway::from_config(config, Arc::new(backend)).unwrap();
    assert_eq!(gw.table().len(), 5);

    let res = gw.handle(&ParsedRequest::new(Method::DELETE, "/item/9"));
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json().unwrap(), json!({"removed": 9}));

    // Registered in the table but not in the backend.
    let res = gw.handle(&ParsedRequest::new(Method::GET, "/"));
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_gateway_is_shareable_across_threads() {
    let gw = Arc::new(echo_gateway());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let gw = Arc::clone(&gw);
            std::thread::spawn(move || {
                let res = gw.handle(&ParsedRequest::new(Method::GET, &format!("/item/{i}")));
                args(&res)[0].as_i64().unwrap()
            })
        })
        .collect();
    let mut ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, [0, 1, 2, 3]);
}
