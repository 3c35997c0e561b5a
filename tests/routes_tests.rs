//! Tests for the registration walk: path composition, response-header
//! inheritance and the startup-time configuration errors.

use serde_json::json;
use std::sync::Arc;
use trellis::body::BodyConverters;
use trellis::coerce::ValueType;
use trellis::error::ConfigError;
use trellis::routes::{
    bind_routes, HandlerDef, HeaderCatalog, HeaderGroup, ParamSpec, Reply, RouteDef,
};

fn converters() -> Arc<BodyConverters> {
    Arc::new(BodyConverters::new("application/json"))
}

fn ok_handler(
    _ctx: &trellis::dispatcher::RequestContext,
    _args: &trellis::resolver::Args,
) -> trellis::routes::HandlerResult {
    Ok(Reply::Payload(json!({})))
}

#[test]
fn test_nested_subroute_composes_parent_path() {
    let root = RouteDef::new("/api")
        .mount(RouteDef::new("/sub").handle(HandlerDef::get("sub_index", "", ok_handler)));

    let bound = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect("bind");
    assert_eq!(bound.len(), 1);
    assert_eq!(bound[0].entry.path_pattern, "/api/sub");
    assert_eq!(bound[0].entry.handler_name, "sub_index");
}

#[test]
fn test_handler_extension_appends_to_route_path() {
    let root = RouteDef::new("/items").handle(
        HandlerDef::get("get_item", "/:id", ok_handler)
            .param(ParamSpec::path("id", ValueType::Long)),
    );

    let bound = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect("bind");
    assert_eq!(bound[0].entry.path_pattern, "/items/:id");
}

#[test]
fn test_empty_route_and_extension_is_root() {
    let root = RouteDef::new("").handle(HandlerDef::get("index", "", ok_handler));
    let bound = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect("bind");
    assert_eq!(bound[0].entry.path_pattern, "/");
}

#[test]
fn test_duplicate_path_method_pair_is_fatal() {
    let root = RouteDef::new("/items")
        .handle(HandlerDef::get("first", "", ok_handler))
        .handle(HandlerDef::get("second", "", ok_handler));

    let err = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect_err("collision");
    match err {
        ConfigError::DuplicateRoute { method, path } => {
            assert_eq!(method, http::Method::GET);
            assert_eq!(path, "/items");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_same_path_different_methods_coexist() {
    let root = RouteDef::new("/items")
        .handle(HandlerDef::get("list_items", "", ok_handler))
        .handle(HandlerDef::post("create_item", "", ok_handler));

    let bound = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect("bind");
    assert_eq!(bound.len(), 2);
}

#[test]
fn test_subroutes_register_before_parent_handlers() {
    // Both the sub-route and the parent's own handler produce GET /a/b; the
    // sub-route wins the slot, so the collision is reported against the
    // parent's handler.
    let root = RouteDef::new("/a")
        .handle(HandlerDef::get("parent_b", "/b", ok_handler))
        .mount(RouteDef::new("/b").handle(HandlerDef::get("sub_index", "", ok_handler)));

    let err = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect_err("collision");
    assert!(matches!(err, ConfigError::DuplicateRoute { path, .. } if path == "/a/b"));
}

#[test]
fn test_child_header_overrides_parent() {
    let root = RouteDef::new("/parent")
        .response_header("X-Env", "parent")
        .response_header("X-Keep", "inherited")
        .mount(
            RouteDef::new("/child")
                .response_header("X-Env", "child")
                .handle(HandlerDef::get("child_index", "", ok_handler)),
        );

    let bound = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect("bind");
    let headers = &bound[0].entry.headers;
    assert!(headers.contains(&("X-Env".to_string(), "child".to_string())));
    assert!(headers.contains(&("X-Keep".to_string(), "inherited".to_string())));
    assert_eq!(headers.iter().filter(|(n, _)| n == "X-Env").count(), 1);
}

#[test]
fn test_handler_header_overrides_route() {
    let root = RouteDef::new("/r")
        .response_header("X-Env", "route")
        .handle(
            HandlerDef::get("h", "", ok_handler).response_header("X-Env", "handler"),
        );

    let bound = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect("bind");
    assert!(bound[0]
        .entry
        .headers
        .contains(&("X-Env".to_string(), "handler".to_string())));
}

#[test]
fn test_header_groups_propagate_through_catalog() {
    let mut catalog = HeaderCatalog::new();
    catalog.define(
        "api-defaults",
        HeaderGroup::new().entry("X-Api-Version", "1"),
    );
    let root = RouteDef::new("/r")
        .header_group("api-defaults")
        .handle(HandlerDef::get("h", "", ok_handler));

    let bound = bind_routes(&root, &catalog, &converters()).expect("bind");
    assert!(bound[0]
        .entry
        .headers
        .contains(&("X-Api-Version".to_string(), "1".to_string())));
}

#[test]
fn test_unknown_header_group_is_fatal() {
    let root = RouteDef::new("/r")
        .header_group("nope")
        .handle(HandlerDef::get("h", "", ok_handler));

    let err = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect_err("unknown");
    assert!(matches!(err, ConfigError::UnknownHeaderGroup { group } if group == "nope"));
}

#[test]
fn test_bool_path_param_is_rejected() {
    let root = RouteDef::new("/flags").handle(
        HandlerDef::get("get_flag", "/:on", ok_handler)
            .param(ParamSpec::path("on", ValueType::Bool)),
    );

    let err = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect_err("bool path");
    match err {
        ConfigError::UnsupportedPathParamType {
            handler,
            name,
            index,
            ..
        } => {
            assert_eq!(handler, "get_flag");
            assert_eq!(name, "on");
            assert_eq!(index, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_double_path_param_is_rejected() {
    let root = RouteDef::new("/nums").handle(
        HandlerDef::get("get_num", "/:x", ok_handler)
            .param(ParamSpec::path("x", ValueType::Double)),
    );
    assert!(matches!(
        bind_routes(&root, &HeaderCatalog::new(), &converters()),
        Err(ConfigError::UnsupportedPathParamType { .. })
    ));
}

#[test]
fn test_path_param_without_token_is_rejected() {
    let root = RouteDef::new("/items").handle(
        HandlerDef::get("get_item", "", ok_handler)
            .param(ParamSpec::path("id", ValueType::Long)),
    );

    let err = bind_routes(&root, &HeaderCatalog::new(), &converters()).expect_err("no token");
    assert!(matches!(
        err,
        ConfigError::MissingPathToken { name, path, .. } if name == "id" && path == "/items"
    ));
}

#[test]
fn test_non_string_query_param_is_rejected() {
    let root = RouteDef::new("/items").handle(
        HandlerDef::get("list_items", "", ok_handler)
            .param(ParamSpec::query("limit").with_type(ValueType::Long)),
    );
    assert!(matches!(
        bind_routes(&root, &HeaderCatalog::new(), &converters()),
        Err(ConfigError::UnsupportedQueryParamType { .. })
    ));
}

#[test]
fn test_unsupported_method_is_rejected() {
    let root = RouteDef::new("/t").handle(HandlerDef::new(
        http::Method::TRACE,
        "trace_it",
        "",
        ok_handler,
    ));
    assert!(matches!(
        bind_routes(&root, &HeaderCatalog::new(), &converters()),
        Err(ConfigError::UnsupportedMethod { .. })
    ));
}

#[test]
fn test_malformed_path_is_rejected() {
    let root = RouteDef::new("items").handle(HandlerDef::get("h", "", ok_handler));
    assert!(matches!(
        bind_routes(&root, &HeaderCatalog::new(), &converters()),
        Err(ConfigError::InvalidPath { .. })
    ));
}
