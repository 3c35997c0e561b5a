use serde_json::json;
use trellis::app::AppBuilder;
use trellis::coerce::ValueType;
use trellis::config::{init_tracing, AppConfig};
use trellis::error::HttpError;
use trellis::middleware::TracingMiddleware;
use trellis::routes::{HandlerDef, HeaderGroup, ParamSpec, Reply, RouteDef};
use std::sync::Arc;
use tracing::info;

fn items_routes() -> RouteDef {
    RouteDef::new("/items")
        .response_header("X-Resource", "items")
        .header_group("api-defaults")
        .handle(
            HandlerDef::get("list_items", "", |_ctx, args| {
                let filter = args.str("q").unwrap_or("");
                Ok(Reply::Payload(json!({ "items": [], "filter": filter })))
            })
            .param(ParamSpec::query("q").nullable()),
        )
        .handle(
            HandlerDef::get("get_item", "/:id", |_ctx, args| {
                let id = args
                    .long("id")
                    .ok_or_else(|| HttpError::internal("id not resolved"))?;
                Ok(Reply::Payload(json!({ "id": id, "name": format!("item-{id}") })))
            })
            .param(ParamSpec::path("id", ValueType::Long)),
        )
        .handle(
            HandlerDef::post("create_item", "", |_ctx, args| {
                let payload = args
                    .json("payload")
                    .cloned()
                    .ok_or_else(|| HttpError::internal("payload not resolved"))?;
                Ok(Reply::Payload(json!({ "created": payload })))
            })
            .param(ParamSpec::body("payload")),
        )
        .mount(
            RouteDef::new("/:id/notes")
                .response_header("X-Resource", "notes")
                .handle(
                    HandlerDef::get("list_item_notes", "", |_ctx, args| {
                        let id = args
                            .long("id")
                            .ok_or_else(|| HttpError::internal("id not resolved"))?;
                        Ok(Reply::Payload(json!({ "item": id, "notes": [] })))
                    })
                    .param(ParamSpec::path("id", ValueType::Long)),
                ),
        )
}

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/config.yaml".to_string());
    let config = AppConfig::load_or_default(&config_path);
    init_tracing(&config.log);

    let app = AppBuilder::new(config)
        .define_header_group(
            "api-defaults",
            HeaderGroup::new()
                .entry("X-Api-Version", "1")
                .entry("Cache-Control", "no-store"),
        )
        .middleware(Arc::new(TracingMiddleware))
        .with_metrics()
        .mount(items_routes())
        .build()?;

    let addr = app.config.server.addr();
    let handle = app.start()?;
    info!(addr = %addr, "server listening");

    handle
        .join()
        .map_err(|e| anyhow::anyhow!("server failed: {e:?}"))?;
    Ok(())
}
