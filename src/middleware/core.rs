use std::time::Duration;

use crate::dispatcher::{HandlerResponse, RequestContext};

pub trait Middleware: Send + Sync {
    /// Runs before dispatch. Returning `Some` short-circuits the request
    /// with that response; the handler is never invoked.
    fn before(&self, _ctx: &RequestContext) -> Option<HandlerResponse> {
        None
    }

    /// Runs after the response is available, in registration order.
    fn after(&self, _ctx: &RequestContext, _res: &mut HandlerResponse, _latency: Duration) {}
}
