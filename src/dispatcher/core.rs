use crate::body::content_type_essence;
use crate::error::HttpError;
use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::reply::{ReplyReceiver, ReplySlot};
use crate::router::{ParamVec, RouteMatch};
use http::Method;
use may::sync::mpsc;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Maximum inline headers before heap allocation. Most requests carry ≤16.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the dispatch hot path. Header names
/// are `Arc<str>` — they repeat across requests, and cloning an `Arc` is an
/// atomic increment rather than a string copy.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request-scoped state handed to resolvers and handlers.
///
/// Everything here is read-only for the life of the request except the
/// reply slot, which accepts at most one payload.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request ID for log correlation.
    pub request_id: RequestId,
    pub method: Method,
    /// The matched route's path template.
    pub path: String,
    pub handler_name: String,
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    /// Request headers with lowercase names.
    pub headers: HeaderVec,
    /// Raw request body text; decoding is the body converters' concern.
    pub body: Option<String>,
    /// The request's single-slot result handoff.
    pub reply: ReplySlot,
}

impl RequestContext {
    /// Get a path parameter by name. Last write wins when duplicate names
    /// appear at different path depths.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name. Last write wins for duplicates.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The request's media-type essence, parameters stripped.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("content-type").map(content_type_essence)
    }

    /// Hand off a result payload. A no-op if one was already sent.
    pub fn send(&self, value: Value) {
        self.reply.send(value);
    }

    /// Force-complete the reply slot with the empty-body sentinel.
    pub fn finish(&self) {
        self.reply.finish();
    }
}

/// Response data sent back from a handler coroutine.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response with no extra headers.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, HeaderVec::new(), body)
    }

    /// The structured error body for a classified request error.
    #[must_use]
    pub fn from_error(err: &HttpError) -> Self {
        Self::json(err.status(), err.to_body())
    }

    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// One request in flight to a runner coroutine.
pub struct Invocation {
    pub ctx: RequestContext,
    /// Drain side of the context's reply slot.
    pub receiver: ReplyReceiver,
    /// Channel the runner replies on, exactly once per invocation.
    pub respond: mpsc::Sender<HandlerResponse>,
}

/// Channel sender that feeds one handler's runner coroutine.
pub type HandlerSender = mpsc::Sender<Invocation>;

/// Routes matched requests to their runner coroutines and applies the
/// middleware chain around them.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, HandlerSender>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the runner channel for a handler name. Replacing an existing
    /// entry drops the old sender, which closes its channel and lets the old
    /// coroutine exit.
    pub fn add_route(&mut self, handler_name: &str, sender: HandlerSender) {
        if self.handlers.remove(handler_name).is_some() {
            debug!(handler_name, "replaced existing handler registration");
        }
        info!(
            handler_name,
            total_handlers = self.handlers.len() + 1,
            "handler registered"
        );
        self.handlers.insert(handler_name.to_string(), sender);
    }

    #[must_use]
    pub fn has_handler(&self, handler_name: &str) -> bool {
        self.handlers.contains_key(handler_name)
    }

    /// Middleware runs in registration order, `before` on the way in and
    /// `after` on the way out.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Dispatch a matched request to its handler coroutine and wait for the
    /// response.
    ///
    /// Returns `None` when no handler is registered for the route or the
    /// runner coroutine is gone — the caller turns both into a 500.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        headers: HeaderVec,
        body: Option<String>,
        request_id: RequestId,
    ) -> Option<HandlerResponse> {
        let tx = match self.handlers.get(&route_match.handler_name) {
            Some(tx) => tx,
            None => {
                error!(
                    handler_name = %route_match.handler_name,
                    "no runner registered for matched route"
                );
                return None;
            }
        };

        let (slot, receiver) = crate::reply::reply_slot();
        let (respond_tx, respond_rx) = mpsc::channel();
        let ctx = RequestContext {
            request_id,
            method: route_match.route.method.clone(),
            path: route_match.route.path_pattern.clone(),
            handler_name: route_match.handler_name,
            path_params: route_match.path_params,
            query_params: route_match.query_params,
            headers,
            body,
            reply: slot,
        };

        let mut early_resp: Option<HandlerResponse> = None;
        for mw in &self.middlewares {
            if early_resp.is_none() {
                early_resp = mw.before(&ctx);
            } else {
                mw.before(&ctx);
            }
        }

        let (mut resp, latency) = if let Some(r) = early_resp {
            (r, Duration::ZERO)
        } else {
            debug!(
                request_id = %ctx.request_id,
                handler_name = %ctx.handler_name,
                method = %ctx.method,
                path = %ctx.path,
                "request dispatched to runner"
            );
            let start = Instant::now();
            let invocation = Invocation {
                ctx: ctx.clone(),
                receiver,
                respond: respond_tx,
            };
            if tx.send(invocation).is_err() {
                error!(
                    request_id = %ctx.request_id,
                    handler_name = %ctx.handler_name,
                    "runner channel closed"
                );
                return None;
            }
            match respond_rx.recv() {
                Ok(response) => (response, start.elapsed()),
                Err(_) => {
                    error!(
                        request_id = %ctx.request_id,
                        handler_name = %ctx.handler_name,
                        "runner dropped the response channel"
                    );
                    return None;
                }
            }
        };

        for mw in &self.middlewares {
            mw.after(&ctx, &mut resp, latency);
        }

        Some(resp)
    }
}
