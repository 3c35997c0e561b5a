use super::request::{parse_request, ParsedRequest};
use super::response::{write_error_response, write_handler_response};
use crate::dispatcher::Dispatcher;
use crate::error::HttpError;
use crate::ids::RequestId;
use crate::middleware::MetricsMiddleware;
use crate::router::Router;
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;

/// The HTTP service: parses requests, matches them against the router and
/// hands them to the dispatcher. Router and dispatcher are built once at
/// startup and shared read-only — no locks on the request path.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: Option<Arc<MetricsMiddleware>>,
    /// `Content-Type` written for JSON bodies without an explicit override,
    /// e.g. `application/json; charset=utf-8`.
    pub json_content_type: String,
}

impl AppService {
    #[must_use]
    pub fn new(router: Arc<Router>, dispatcher: Arc<Dispatcher>, json_content_type: &str) -> Self {
        Self {
            router,
            dispatcher,
            metrics: None,
            json_content_type: json_content_type.to_string(),
        }
    }

    pub fn set_metrics(&mut self, metrics: Arc<MetricsMiddleware>) {
        self.metrics = Some(metrics);
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    res.status_code(200, "OK");
    res.header("Content-Type: application/json");
    res.body_vec(serde_json::json!({ "status": "ok" }).to_string().into_bytes());
    Ok(())
}

/// Metrics endpoint returning Prometheus text format statistics.
pub fn metrics_endpoint(res: &mut Response, metrics: &MetricsMiddleware) -> io::Result<()> {
    let body = format!(
        "# HELP trellis_requests_total Total number of handled requests\n\
         # TYPE trellis_requests_total counter\n\
         trellis_requests_total {}\n\
         # HELP trellis_request_errors_total Requests answered with 4xx/5xx\n\
         # TYPE trellis_request_errors_total counter\n\
         trellis_request_errors_total {}\n\
         # HELP trellis_request_latency_seconds Average request latency in seconds\n\
         # TYPE trellis_request_latency_seconds gauge\n\
         trellis_request_latency_seconds {}\n",
        metrics.request_count(),
        metrics.error_count(),
        metrics.average_latency().as_secs_f64(),
    );
    res.status_code(200, "OK");
    res.header("Content-Type: text/plain; version=0.0.4");
    res.body_vec(body.into_bytes());
    Ok(())
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            headers,
            query_params,
            body,
        } = parse_request(req);

        if method == "GET" && path == "/health" {
            return health_endpoint(res);
        }
        if method == "GET" && path == "/metrics" {
            if let Some(metrics) = &self.metrics {
                return metrics_endpoint(res, metrics);
            }
            write_error_response(res, &HttpError::not_found("metrics not configured"));
            return Ok(());
        }

        let parsed_method = match method.parse::<http::Method>() {
            Ok(m) => m,
            Err(_) => {
                write_error_response(
                    res,
                    &HttpError::bad_request(format!("unrecognized method `{method}`")),
                );
                return Ok(());
            }
        };

        let Some(mut route_match) = self.router.route(&parsed_method, &path) else {
            write_error_response(
                res,
                &HttpError::not_found(format!("no route for {method} {path}")),
            );
            return Ok(());
        };
        route_match.query_params = query_params;

        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.as_ref() == "x-request-id")
                .map(|(_, v)| v.as_str()),
        );

        match self
            .dispatcher
            .dispatch(route_match, headers, body, request_id)
        {
            Some(handler_response) => {
                write_handler_response(
                    res,
                    handler_response.status,
                    &handler_response.body,
                    &handler_response.headers,
                    &self.json_content_type,
                );
            }
            None => {
                write_error_response(
                    res,
                    &HttpError::internal("handler failed or not registered"),
                );
            }
        }
        Ok(())
    }
}
