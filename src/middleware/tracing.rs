use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::dispatcher::{HandlerResponse, RequestContext};

/// Logs one structured event per completed request.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(&self, ctx: &RequestContext, res: &mut HandlerResponse, latency: Duration) {
        info!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            handler_name = %ctx.handler_name,
            status = res.status,
            latency_ms = latency.as_millis() as u64,
            "request completed"
        );
    }
}
