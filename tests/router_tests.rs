//! Tests for template matching over the bound route table.

use http::Method;
use serde_json::json;
use std::sync::Arc;
use trellis::body::BodyConverters;
use trellis::coerce::ValueType;
use trellis::router::Router;
use trellis::routes::{bind_routes, HandlerDef, HeaderCatalog, ParamSpec, Reply, RouteDef};

fn ok_handler(
    _ctx: &trellis::dispatcher::RequestContext,
    _args: &trellis::resolver::Args,
) -> trellis::routes::HandlerResult {
    Ok(Reply::Payload(json!({})))
}

fn demo_router() -> Router {
    let root = RouteDef::new("")
        .handle(HandlerDef::get("index", "", ok_handler))
        .mount(
            RouteDef::new("/items")
                .handle(HandlerDef::get("list_items", "", ok_handler))
                .handle(
                    HandlerDef::get("get_item", "/:id", ok_handler)
                        .param(ParamSpec::path("id", ValueType::Long)),
                )
                .handle(HandlerDef::post("create_item", "", ok_handler)),
        )
        .mount(
            RouteDef::new("/users/:user_id/posts").handle(
                HandlerDef::get("get_post", "/:post_id", ok_handler)
                    .param(ParamSpec::path("user_id", ValueType::Str))
                    .param(ParamSpec::path("post_id", ValueType::Str)),
            ),
        );

    let bound = bind_routes(
        &root,
        &HeaderCatalog::new(),
        &Arc::new(BodyConverters::new("application/json")),
    )
    .expect("bind");
    Router::new(bound.into_iter().map(|b| b.entry).collect())
}

#[test]
fn test_static_paths_match() {
    let router = demo_router();
    let m = router.route(&Method::GET, "/items").expect("match");
    assert_eq!(m.handler_name, "list_items");
    assert!(m.path_params.is_empty());

    let m = router.route(&Method::GET, "/").expect("match root");
    assert_eq!(m.handler_name, "index");
}

#[test]
fn test_path_params_are_extracted() {
    let router = demo_router();
    let m = router.route(&Method::GET, "/items/42").expect("match");
    assert_eq!(m.handler_name, "get_item");
    assert_eq!(m.path_params.len(), 1);
    assert_eq!(m.path_params[0].0.as_ref(), "id");
    assert_eq!(m.path_params[0].1, "42");
}

#[test]
fn test_multiple_path_params() {
    let router = demo_router();
    let m = router
        .route(&Method::GET, "/users/u1/posts/p9")
        .expect("match");
    assert_eq!(m.handler_name, "get_post");
    assert_eq!(m.path_params.len(), 2);
    assert_eq!(m.path_params[0].1, "u1");
    assert_eq!(m.path_params[1].1, "p9");
}

#[test]
fn test_method_discriminates() {
    let router = demo_router();
    assert_eq!(
        router
            .route(&Method::POST, "/items")
            .expect("match")
            .handler_name,
        "create_item"
    );
    assert!(router.route(&Method::DELETE, "/items").is_none());
}

#[test]
fn test_unknown_path_is_none() {
    let router = demo_router();
    assert!(router.route(&Method::GET, "/does/not/exist").is_none());
    assert!(router.route(&Method::GET, "/items/42/extra").is_none());
}
