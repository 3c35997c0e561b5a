//! The application context: everything the request path needs, built once
//! at startup and passed explicitly — there is no process-wide registry.

use crate::body::{BodyConverter, BodyConverters};
use crate::config::AppConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ConfigError;
use crate::middleware::{MetricsMiddleware, Middleware};
use crate::router::Router;
use crate::routes::{bind_into, BoundRoute, HeaderCatalog, HeaderGroup, RouteDef};
use crate::server::{AppService, HttpServer, ServerHandle};
use std::collections::HashSet;
use std::io;
use std::sync::Arc;

/// Builder for an [`App`]: mount route trees, define header groups, install
/// body converters and middleware, then [`build`](AppBuilder::build).
pub struct AppBuilder {
    config: AppConfig,
    catalog: HeaderCatalog,
    converters: BodyConverters,
    middlewares: Vec<Arc<dyn Middleware>>,
    metrics: Option<Arc<MetricsMiddleware>>,
    defs: Vec<RouteDef>,
}

impl AppBuilder {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let converters = BodyConverters::new(&config.http.default_content_type);
        Self {
            config,
            catalog: HeaderCatalog::new(),
            converters,
            middlewares: Vec::new(),
            metrics: None,
            defs: Vec::new(),
        }
    }

    /// Define a named response-header group referenceable from route and
    /// handler definitions.
    #[must_use]
    pub fn define_header_group(mut self, name: &str, group: HeaderGroup) -> Self {
        self.catalog.define(name, group);
        self
    }

    /// Install or replace the body converter for a content type.
    #[must_use]
    pub fn body_converter(mut self, content_type: &str, converter: Arc<dyn BodyConverter>) -> Self {
        self.converters.register(content_type, converter);
        self
    }

    #[must_use]
    pub fn middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(mw);
        self
    }

    /// Enable request metrics collection and the `/metrics` endpoint.
    #[must_use]
    pub fn with_metrics(mut self) -> Self {
        let metrics = Arc::new(MetricsMiddleware::new());
        self.middlewares.push(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    /// Mount a route definition tree at the application root.
    #[must_use]
    pub fn mount(mut self, def: RouteDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Walk and bind every mounted tree, compile the router and spawn one
    /// runner coroutine per handler.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] — duplicate (path, method) pairs across all
    /// mounted trees included — aborts the build, and with it startup.
    pub fn build(self) -> Result<App, ConfigError> {
        let converters = Arc::new(self.converters);
        let mut bound: Vec<BoundRoute> = Vec::new();
        let mut seen = HashSet::new();
        for def in &self.defs {
            bind_into(
                def,
                &self.catalog,
                &converters,
                &mut bound,
                &mut seen,
                "",
                &[],
            )?;
        }

        let entries = bound.iter().map(|b| b.entry.clone()).collect();
        let router = Router::new(entries);

        let mut dispatcher = Dispatcher::new();
        for mw in self.middlewares {
            dispatcher.add_middleware(mw);
        }
        for route in bound {
            let handler_name = route.entry.handler_name.clone();
            // SAFETY: runners are spawned during single-threaded startup,
            // before any request reaches the dispatcher.
            let sender = unsafe { route.runner.spawn() };
            dispatcher.add_route(&handler_name, sender);
        }

        Ok(App {
            router: Arc::new(router),
            dispatcher: Arc::new(dispatcher),
            metrics: self.metrics,
            config: self.config,
        })
    }
}

/// A fully registered application: immutable routing table, spawned
/// runners, configuration.
pub struct App {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    pub config: AppConfig,
    metrics: Option<Arc<MetricsMiddleware>>,
}

impl App {
    /// The HTTP service for this application.
    #[must_use]
    pub fn service(&self) -> AppService {
        let mut service = AppService::new(
            self.router.clone(),
            self.dispatcher.clone(),
            &self.config.http.response_content_type(),
        );
        if let Some(metrics) = &self.metrics {
            service.set_metrics(metrics.clone());
        }
        service
    }

    /// Start serving on the configured address.
    ///
    /// # Errors
    ///
    /// Returns an error when the port cannot be bound.
    pub fn start(&self) -> io::Result<ServerHandle> {
        HttpServer(self.service()).start(self.config.server.addr())
    }

    /// Start serving on an explicit address, ignoring the configured one.
    ///
    /// # Errors
    ///
    /// Returns an error when the port cannot be bound.
    pub fn start_on(&self, addr: &str) -> io::Result<ServerHandle> {
        HttpServer(self.service()).start(addr)
    }
}
