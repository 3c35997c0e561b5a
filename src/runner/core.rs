use crate::body::BodyConverters;
use crate::coerce::{ParamKind, ParamValue, ValueType};
use crate::dispatcher::{HandlerResponse, HandlerSender, Invocation, RequestContext};
use crate::error::{ConfigError, HttpError};
use crate::resolver::{Args, ParamIdentity, ParamResolver};
use crate::routes::{HandlerDef, ParamSource, Reply, RouteEntry};
use crate::runtime_config::RuntimeConfig;
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

type HandlerFn = dyn Fn(&RequestContext, &Args) -> Result<Reply, HttpError> + Send + Sync;

const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// One handler function bound to one (path, method) pair, owning the
/// per-parameter resolver list.
pub struct RouteRunner {
    entry: Arc<RouteEntry>,
    resolvers: Vec<ParamResolver>,
    handler: Arc<HandlerFn>,
}

impl std::fmt::Debug for RouteRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRunner")
            .field("entry", &self.entry)
            .field("resolvers", &self.resolvers.len())
            .field("handler", &"<fn>")
            .finish()
    }
}

impl RouteRunner {
    /// Build the runner for a handler definition: validate the method, then
    /// synthesize one resolver per declared parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unsupported HTTP method, a parameter
    /// whose declared type is not valid for its role, or a path parameter
    /// with no matching `:name` segment in the full path.
    pub fn bind(
        entry: Arc<RouteEntry>,
        def: &HandlerDef,
        converters: Arc<BodyConverters>,
    ) -> Result<Self, ConfigError> {
        if !SUPPORTED_METHODS.contains(&def.method) {
            return Err(ConfigError::UnsupportedMethod {
                handler: def.name.clone(),
                method: def.method.clone(),
            });
        }

        let mut resolvers = Vec::with_capacity(def.params.len());
        for (index, spec) in def.params.iter().enumerate() {
            let identity = ParamIdentity {
                name: spec.name.clone(),
                index,
                declared: spec.declared,
                location: match spec.source {
                    ParamSource::Path(_) => "path",
                    ParamSource::Query(_) => "query",
                    ParamSource::Header(_) => "header",
                    ParamSource::Body => "body",
                },
            };

            let extract: Box<
                dyn Fn(&RequestContext) -> Result<Option<ParamValue>, HttpError> + Send + Sync,
            > = match &spec.source {
                ParamSource::Path(key) => {
                    // Path values are coerced strictly to the declared kind;
                    // only string, int and long are representable in a path
                    // segment.
                    let kind = ParamKind::matching(&spec.declared)
                        .filter(|&k| {
                            matches!(k, ParamKind::Str | ParamKind::Int | ParamKind::Long)
                        })
                        .ok_or_else(|| ConfigError::UnsupportedPathParamType {
                            handler: def.name.clone(),
                            name: spec.name.clone(),
                            index,
                            declared: spec.declared,
                        })?;
                    let token = format!(":{key}");
                    if !entry.path_pattern.split('/').any(|seg| seg == token) {
                        return Err(ConfigError::MissingPathToken {
                            handler: def.name.clone(),
                            name: key.clone(),
                            path: entry.path_pattern.clone(),
                        });
                    }
                    let key = key.clone();
                    Box::new(move |ctx: &RequestContext| match ctx.get_path_param(&key) {
                        None => Ok(None),
                        Some(raw) => kind
                            .convert(&Value::String(raw.to_string()))
                            .map(Some)
                            .ok_or_else(|| {
                                HttpError::bad_request(format!(
                                    "path parameter `{key}`: expected {}, got `{raw}`",
                                    kind.value_type()
                                ))
                            }),
                    })
                }
                ParamSource::Query(key) => {
                    if spec.declared.ty != ValueType::Str {
                        return Err(ConfigError::UnsupportedQueryParamType {
                            handler: def.name.clone(),
                            name: spec.name.clone(),
                            index,
                            declared: spec.declared,
                        });
                    }
                    let key = key.clone();
                    Box::new(move |ctx: &RequestContext| {
                        Ok(ctx
                            .get_query_param(&key)
                            .map(|s| ParamValue::Str(s.to_string())))
                    })
                }
                ParamSource::Header(name) => {
                    if spec.declared.ty != ValueType::Str {
                        return Err(ConfigError::UnsupportedHeaderParamType {
                            handler: def.name.clone(),
                            name: spec.name.clone(),
                            index,
                            declared: spec.declared,
                        });
                    }
                    let name = name.clone();
                    if name.eq_ignore_ascii_case("content-type") {
                        Box::new(move |ctx: &RequestContext| {
                            Ok(ctx
                                .content_type()
                                .map(|essence| ParamValue::Str(essence.to_string())))
                        })
                    } else {
                        Box::new(move |ctx: &RequestContext| {
                            Ok(ctx
                                .get_header(&name)
                                .map(|s| ParamValue::Str(s.to_string())))
                        })
                    }
                }
                ParamSource::Body => {
                    if spec.declared.ty != ValueType::Json {
                        return Err(ConfigError::UnsupportedBodyParamType {
                            handler: def.name.clone(),
                            name: spec.name.clone(),
                            index,
                            declared: spec.declared,
                        });
                    }
                    let converters = converters.clone();
                    Box::new(move |ctx: &RequestContext| match &ctx.body {
                        None => Ok(None),
                        Some(raw) => {
                            let converter = converters.converter_for(ctx.content_type())?;
                            converter.decode(raw).map(|v| Some(ParamValue::Json(v)))
                        }
                    })
                }
            };

            let resolver =
                ParamResolver::new(identity, spec.declared.nullable, spec.optional, extract)
                    .on_missing(Box::new(|identity: &ParamIdentity| {
                        HttpError::bad_request(format!("missing required {identity}"))
                    }));
            resolvers.push(resolver);
        }

        Ok(Self {
            entry,
            resolvers,
            handler: def.handler.clone(),
        })
    }

    #[must_use]
    pub fn entry(&self) -> &Arc<RouteEntry> {
        &self.entry
    }

    /// Resolve all parameters in declaration order, each independently from
    /// the immutable context. The first failure aborts resolution.
    fn resolve_args(&self, ctx: &RequestContext) -> Result<Args, HttpError> {
        let mut args = Args::with_capacity(self.resolvers.len());
        for resolver in &self.resolvers {
            let value = resolver.resolve(ctx)?;
            args.push(Arc::from(resolver.identity().name.as_str()), value);
        }
        Ok(args)
    }

    /// Process one invocation: resolve, invoke, drain the reply slot,
    /// respond. Replies exactly once.
    fn run(&self, invocation: Invocation) {
        let Invocation {
            ctx,
            receiver,
            respond,
        } = invocation;

        let args = match self.resolve_args(&ctx) {
            Ok(args) => args,
            Err(err) => {
                // The handler is never invoked when a resolver fails its
                // contract.
                warn!(
                    request_id = %ctx.request_id,
                    handler_name = %ctx.handler_name,
                    status = err.status(),
                    error = %err,
                    "parameter resolution failed"
                );
                let _ = respond.send(HandlerResponse::from_error(&err));
                return;
            }
        };

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            (self.handler)(&ctx, &args)
        }));

        let response = match outcome {
            Ok(Ok(reply)) => {
                if let Reply::Payload(value) = reply {
                    ctx.send(value);
                }
                // The handler has run to completion; force-completing here
                // is what keeps the drain below from waiting forever.
                ctx.finish();
                let body = receiver.receive();
                HandlerResponse::new(200, self.entry.header_vec(), body)
            }
            Ok(Err(err)) => {
                warn!(
                    request_id = %ctx.request_id,
                    handler_name = %ctx.handler_name,
                    status = err.status(),
                    error = %err,
                    "handler returned an error"
                );
                HandlerResponse::from_error(&err)
            }
            Err(panic) => {
                error!(
                    request_id = %ctx.request_id,
                    handler_name = %ctx.handler_name,
                    panic_message = ?panic,
                    "handler panicked"
                );
                HandlerResponse::from_error(&HttpError::internal("internal server error"))
            }
        };

        let _ = respond.send(response);
    }

    /// Spawn the runner's coroutine and return the channel that feeds it.
    ///
    /// # Safety
    ///
    /// `may::coroutine::Builder::spawn` is unsafe in the `may` runtime; the
    /// caller must ensure the runtime is initialized before requests flow.
    /// The runner itself replies exactly once per invocation, including on
    /// panic, so the dispatcher's blocking wait always completes.
    #[must_use]
    pub unsafe fn spawn(self) -> HandlerSender {
        let (tx, rx) = mpsc::channel::<Invocation>();
        let stack_size = RuntimeConfig::from_env().stack_size;
        let handler_name = self.entry.handler_name.clone();

        // SAFETY: `may::coroutine::Builder::spawn` is unsafe by the may
        // runtime's contract; the runner loop owns all captured state and
        // communicates only through its channels.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(
                        handler_name = %self.entry.handler_name,
                        stack_size,
                        "runner coroutine start"
                    );
                    for invocation in rx.iter() {
                        self.run(invocation);
                    }
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %handler_name,
                error = %e,
                stack_size,
                "failed to spawn runner coroutine"
            );
        }
        tx
    }
}
