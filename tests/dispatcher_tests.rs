//! End-to-end dispatch tests: route match → parameter resolution → handler
//! coroutine → reply slot → response.

use http::Method;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use trellis::app::{App, AppBuilder};
use trellis::coerce::ValueType;
use trellis::config::AppConfig;
use trellis::dispatcher::{HandlerResponse, HeaderVec};
use trellis::error::HttpError;
use trellis::ids::RequestId;
use trellis::middleware::TracingMiddleware;
use trellis::routes::{HandlerDef, HeaderGroup, ParamSpec, Reply, RouteDef};

fn set_stack_size() {
    let size = std::env::var("TRELLIS_STACK_SIZE")
        .ok()
        .and_then(|v| {
            if let Some(hex) = v.strip_prefix("0x") {
                usize::from_str_radix(hex, 16).ok()
            } else {
                v.parse().ok()
            }
        })
        .unwrap_or(0x10000);
    may::config().set_stack_size(size);
}

fn dispatch(
    app: &App,
    method: Method,
    path: &str,
    query: &[(&str, &str)],
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> HandlerResponse {
    let mut route_match = app.router.route(&method, path).expect("route match");
    for (k, v) in query {
        route_match
            .query_params
            .push((Arc::from(*k), (*v).to_string()));
    }
    let mut header_vec = HeaderVec::new();
    for (k, v) in headers {
        header_vec.push((Arc::from(*k), (*v).to_string()));
    }
    app.dispatcher
        .dispatch(
            route_match,
            header_vec,
            body.map(str::to_string),
            RequestId::new(),
        )
        .expect("dispatch")
}

fn items_app(invoked: Arc<AtomicBool>) -> App {
    let items = RouteDef::new("/items")
        .response_header("X-Resource", "items")
        .header_group("api-defaults")
        .handle(
            HandlerDef::get("get_item", "/:id", move |_ctx, args| {
                invoked.store(true, Ordering::SeqCst);
                let id = args
                    .long("id")
                    .ok_or_else(|| HttpError::internal("id not resolved"))?;
                Ok(Reply::Payload(json!({ "id": id })))
            })
            .param(ParamSpec::path("id", ValueType::Long)),
        );

    AppBuilder::new(AppConfig::default())
        .define_header_group(
            "api-defaults",
            HeaderGroup::new().entry("X-Api-Version", "1"),
        )
        .middleware(Arc::new(TracingMiddleware))
        .mount(items)
        .build()
        .expect("build app")
}

#[test]
fn test_long_path_param_reaches_handler() {
    set_stack_size();
    let invoked = Arc::new(AtomicBool::new(false));
    let app = items_app(invoked.clone());

    let resp = dispatch(&app, Method::GET, "/items/42", &[], &[], None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({ "id": 42 }));
    assert!(invoked.load(Ordering::SeqCst));
}

#[test]
fn test_uncoercible_path_param_is_400_without_invoking_handler() {
    set_stack_size();
    let invoked = Arc::new(AtomicBool::new(false));
    let app = items_app(invoked.clone());

    let resp = dispatch(&app, Method::GET, "/items/abc", &[], &[], None);
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body["status"], json!(400));
    assert!(resp.body["message"]
        .as_str()
        .expect("message")
        .contains("id"));
    assert!(!invoked.load(Ordering::SeqCst));
}

#[test]
fn test_route_headers_are_attached_to_response() {
    set_stack_size();
    let app = items_app(Arc::new(AtomicBool::new(false)));

    let resp = dispatch(&app, Method::GET, "/items/7", &[], &[], None);
    assert_eq!(resp.get_header("X-Resource"), Some("items"));
    assert_eq!(resp.get_header("X-Api-Version"), Some("1"));
}

#[test]
fn test_missing_required_query_param_is_400() {
    set_stack_size();
    let invoked = Arc::new(AtomicBool::new(false));
    let invoked_in_handler = invoked.clone();
    let root = RouteDef::new("/search").handle(
        HandlerDef::get("search", "", move |_ctx, args| {
            invoked_in_handler.store(true, Ordering::SeqCst);
            Ok(Reply::Payload(json!({ "q": args.str("q") })))
        })
        .param(ParamSpec::query("q")),
    );
    let app = AppBuilder::new(AppConfig::default())
        .mount(root)
        .build()
        .expect("build app");

    let resp = dispatch(&app, Method::GET, "/search", &[], &[], None);
    assert_eq!(resp.status, 400);
    let message = resp.body["message"].as_str().expect("message");
    assert!(message.contains("`q`"));
    assert!(message.contains("#0"));
    assert!(!invoked.load(Ordering::SeqCst));

    let resp = dispatch(&app, Method::GET, "/search", &[("q", "cats")], &[], None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({ "q": "cats" }));
}

#[test]
fn test_nullable_and_optional_params_tolerate_absence() {
    set_stack_size();
    let root = RouteDef::new("/list").handle(
        HandlerDef::get("list", "", |_ctx, args| {
            Ok(Reply::Payload(json!({
                "filter": args.str("filter"),
                "page": args.str("page"),
            })))
        })
        .param(ParamSpec::query("filter").nullable())
        .param(ParamSpec::query("page").optional()),
    );
    let app = AppBuilder::new(AppConfig::default())
        .mount(root)
        .build()
        .expect("build app");

    let resp = dispatch(&app, Method::GET, "/list", &[], &[], None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({ "filter": null, "page": null }));
}

#[test]
fn test_body_param_decodes_json() {
    set_stack_size();
    let root = RouteDef::new("/items").handle(
        HandlerDef::post("create_item", "", |_ctx, args| {
            let payload = args
                .json("payload")
                .cloned()
                .ok_or_else(|| HttpError::internal("payload not resolved"))?;
            Ok(Reply::Payload(json!({ "created": payload })))
        })
        .param(ParamSpec::body("payload")),
    );
    let app = AppBuilder::new(AppConfig::default())
        .mount(root)
        .build()
        .expect("build app");

    let resp = dispatch(
        &app,
        Method::POST,
        "/items",
        &[],
        &[("content-type", "application/json")],
        Some(r#"{"name":"new"}"#),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({ "created": { "name": "new" } }));

    let resp = dispatch(
        &app,
        Method::POST,
        "/items",
        &[],
        &[("content-type", "application/json")],
        Some("{not json"),
    );
    assert_eq!(resp.status, 400);

    let resp = dispatch(
        &app,
        Method::POST,
        "/items",
        &[],
        &[("content-type", "application/msgpack")],
        Some("anything"),
    );
    assert_eq!(resp.status, 415);

    // A missing required body short-circuits before the handler.
    let resp = dispatch(&app, Method::POST, "/items", &[], &[], None);
    assert_eq!(resp.status, 400);
}

#[test]
fn test_content_type_header_param_resolves_essence() {
    set_stack_size();
    let root = RouteDef::new("/echo").handle(
        HandlerDef::post("echo_type", "", |_ctx, args| {
            Ok(Reply::Payload(json!({ "content_type": args.str("content_type") })))
        })
        .param(ParamSpec::header("Content-Type").with_name("content_type")),
    );
    let app = AppBuilder::new(AppConfig::default())
        .mount(root)
        .build()
        .expect("build app");

    let resp = dispatch(
        &app,
        Method::POST,
        "/echo",
        &[],
        &[("content-type", "application/json; charset=utf-8")],
        None,
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({ "content_type": "application/json" }));
}

#[test]
fn test_early_send_wins_over_returned_payload() {
    set_stack_size();
    let root = RouteDef::new("/first").handle(HandlerDef::get("first_wins", "", |ctx, _args| {
        ctx.send(json!({ "winner": "sent" }));
        Ok(Reply::Payload(json!({ "winner": "returned" })))
    }));
    let app = AppBuilder::new(AppConfig::default())
        .mount(root)
        .build()
        .expect("build app");

    let resp = dispatch(&app, Method::GET, "/first", &[], &[], None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({ "winner": "sent" }));
}

#[test]
fn test_silent_handler_yields_empty_body() {
    set_stack_size();
    let root = RouteDef::new("/quiet")
        .handle(HandlerDef::get("quiet", "", |_ctx, _args| Ok(Reply::Sent)));
    let app = AppBuilder::new(AppConfig::default())
        .mount(root)
        .build()
        .expect("build app");

    let resp = dispatch(&app, Method::GET, "/quiet", &[], &[], None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!(""));
}

#[test]
fn test_handler_error_maps_to_structured_body() {
    set_stack_size();
    let root = RouteDef::new("/teapot").handle(HandlerDef::get("teapot", "", |_ctx, _args| {
        Err(HttpError::new(418, "I'm a teapot"))
    }));
    let app = AppBuilder::new(AppConfig::default())
        .mount(root)
        .build()
        .expect("build app");

    let resp = dispatch(&app, Method::GET, "/teapot", &[], &[], None);
    assert_eq!(resp.status, 418);
    assert_eq!(resp.body, json!({ "status": 418, "message": "I'm a teapot" }));
}

#[test]
fn test_panic_handler_returns_500_without_detail() {
    set_stack_size();
    let root = RouteDef::new("/panic").handle(HandlerDef::get("panic", "", |_ctx, _args| {
        panic!("boom - watch me recover");
    }));
    let app = AppBuilder::new(AppConfig::default())
        .mount(root)
        .build()
        .expect("build app");

    let resp = dispatch(&app, Method::GET, "/panic", &[], &[], None);
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body["message"], json!("internal server error"));
}
