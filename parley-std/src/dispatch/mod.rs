//! # Dispatcher
//!
//! Turns one line of input into an [`Outcome`].
//!
//! Dispatch happens in two steps:
//!
//! 1. [`Dispatcher::prepare`] tokenizes, resolves and binds synchronously,
//!    producing either a bound context on loan from the pool or an early
//!    outcome (`NotFound`, `NoMatchingOverload`, `Cancelled`).
//! 2. [`Dispatcher::run`] drives the bound context through the pipeline.
//!
//! [`Dispatcher::execute`] does both inline, so concurrent callers run
//! concurrently. [`QueueDispatcher`] runs step 2 on a single background
//! consumer for strict FIFO order across all producers.
//!
//! # Failure Containment
//!
//! Errors and panics raised by a handler or a middleware stage never escape
//! [`Dispatcher::run`]. They are logged with the resolved path and become
//! [`Outcome::Failed`]; the context is released either way. An error returned
//! after the request's token fired becomes [`Outcome::Cancelled`] instead.

mod queue;

pub use queue::{DispatchError, QueueDispatcher, Ticket};

use crate::{
    binders::BinderRegistry,
    pipeline::{Pipeline, PipelineBuilder},
    pool::{ContextPool, PooledContext},
    ranking::{Resolution, resolve},
    store::Store,
};
use futures::FutureExt;
use parley_core::{
    Command, ContextState, DynMiddleware, InvokeError, Middleware, Outcome, ScopeFactory,
    TokenizeError, Tokenizer, TokenizerMode,
};
use std::{any::Any, fmt, panic::AssertUnwindSafe, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// The result of [`Dispatcher::prepare`].
#[derive(Debug)]
pub enum Prepared {
    /// A bound context ready for the pipeline.
    Ready(PooledContext),
    /// Resolution ended early; nothing needs to run.
    Done(Outcome),
}

struct Inner {
    store: Arc<Store>,
    binders: BinderRegistry,
    pipeline: Pipeline,
    pool: Arc<ContextPool>,
    mode: TokenizerMode,
    scopes: Option<Arc<dyn ScopeFactory>>,
}

/// Resolves and runs commands. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Start configuring a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// The command store, for reloads and lookups.
    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    /// The binder registry.
    pub fn binders(&self) -> &BinderRegistry {
        &self.inner.binders
    }

    /// The context pool.
    pub fn pool(&self) -> &Arc<ContextPool> {
        &self.inner.pool
    }

    /// Tokenize, resolve and bind `input`.
    ///
    /// Returns the lexical error of malformed input. Every other result is a
    /// context ready to run or a finished [`Outcome`].
    pub fn prepare(
        &self,
        input: impl Into<Arc<str>>,
        cancel: &CancellationToken,
    ) -> Result<Prepared, TokenizeError> {
        if cancel.is_cancelled() {
            return Ok(Prepared::Done(Outcome::Cancelled));
        }

        let input = input.into();
        let tokens = Tokenizer::new(input.clone(), self.inner.mode)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| debug!(position = err.position(), error = %err, "input rejected"))?;

        let snapshot = self.inner.store.snapshot();
        let (command, path, arguments) =
            match resolve(snapshot.root(), &self.inner.binders, &tokens) {
                Resolution::Bound {
                    command,
                    path,
                    arguments,
                } => (command, path, arguments),
                Resolution::NotFound => {
                    debug!(tokens = tokens.len(), "no command found");
                    return Ok(Prepared::Done(Outcome::NotFound));
                }
                Resolution::NoMatchingOverload { path, candidates } => {
                    debug!(path = %path, candidates, "no overload accepted the arguments");
                    return Ok(Prepared::Done(Outcome::NoMatchingOverload { path, candidates }));
                }
            };

        if cancel.is_cancelled() {
            return Ok(Prepared::Done(Outcome::Cancelled));
        }

        let mut ctx = self.inner.pool.acquire();
        ctx.set_input(input);
        if let Some(scopes) = &self.inner.scopes {
            ctx.set_services(scopes.create_scope());
        }
        ctx.bind(command, path, arguments);
        Ok(Prepared::Ready(ctx))
    }

    /// Drive a prepared request through the pipeline.
    pub async fn run(&self, prepared: Prepared, cancel: &CancellationToken) -> Outcome {
        let mut ctx = match prepared {
            Prepared::Ready(ctx) => ctx,
            Prepared::Done(outcome) => return outcome,
        };

        ctx.begin();
        let path = ctx.path().clone();
        let result = AssertUnwindSafe(self.inner.pipeline.run(&mut ctx, cancel))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(InvokeError::Panic(panic_message(panic.as_ref()))));

        // an error raised once the token fired is the request giving up, not failing
        let result = match result {
            Err(error) if cancel.is_cancelled() && !matches!(error, InvokeError::Panic(_)) => {
                debug!(path = %path, error = %error, "error after cancellation");
                Err(InvokeError::Cancelled)
            }
            other => other,
        };

        let outcome = Outcome::from_result(&path, result);
        match &outcome {
            Outcome::Failed { error, .. } => {
                error!(path = %path, error = %error, "command failed");
                ctx.finish(ContextState::Failed);
            }
            Outcome::Cancelled => {
                debug!(path = %path, "command cancelled");
                ctx.finish(ContextState::Cancelled);
            }
            _ => ctx.finish(ContextState::Complete),
        }
        outcome
    }

    /// Prepare and run `input` inline.
    pub async fn execute(
        &self,
        input: impl Into<Arc<str>>,
        cancel: &CancellationToken,
    ) -> Result<Outcome, TokenizeError> {
        let prepared = self.prepare(input, cancel)?;
        Ok(self.run(prepared, cancel).await)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("store", &self.inner.store)
            .field("pipeline", &self.inner.pipeline)
            .field("mode", &self.inner.mode)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_owned()
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    store: Option<Arc<Store>>,
    commands: Vec<Command>,
    binders: Option<BinderRegistry>,
    pipeline: PipelineBuilder,
    mode: TokenizerMode,
    pool_capacity: usize,
    scopes: Option<Arc<dyn ScopeFactory>>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            store: None,
            commands: Vec::new(),
            binders: None,
            pipeline: Pipeline::builder(),
            mode: TokenizerMode::default(),
            pool_capacity: ContextPool::DEFAULT_CAPACITY,
            scopes: None,
        }
    }
}

impl DispatcherBuilder {
    /// Use an existing store. Takes precedence over [`commands`](Self::commands).
    pub fn store(mut self, store: Arc<Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register fixed commands in a store owned by the dispatcher.
    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands.extend(commands);
        self
    }

    /// Use a custom binder registry instead of the built-ins.
    pub fn binders(mut self, binders: BinderRegistry) -> Self {
        self.binders = Some(binders);
        self
    }

    /// Append a middleware stage.
    pub fn layer<M: Middleware>(mut self, middleware: M) -> Self {
        self.pipeline = self.pipeline.layer(middleware);
        self
    }

    /// Append a shared middleware stage.
    pub fn layer_arc(mut self, middleware: Arc<dyn DynMiddleware>) -> Self {
        self.pipeline = self.pipeline.layer_arc(middleware);
        self
    }

    /// Select strict or lenient tokenizing.
    pub fn tokenizer_mode(mut self, mode: TokenizerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Maximum idle contexts kept for reuse.
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Open one service scope per request.
    pub fn scope_factory<F: ScopeFactory>(mut self, factory: F) -> Self {
        self.scopes = Some(Arc::new(factory));
        self
    }

    /// Finish building.
    pub fn build(self) -> Dispatcher {
        let store = match self.store {
            Some(store) => store,
            None => Arc::new(Store::from_commands(self.commands)),
        };
        Dispatcher {
            inner: Arc::new(Inner {
                store,
                binders: self.binders.unwrap_or_default(),
                pipeline: self.pipeline.build(),
                pool: Arc::new(ContextPool::new(self.pool_capacity)),
                mode: self.mode,
                scopes: self.scopes,
            }),
        }
    }
}
