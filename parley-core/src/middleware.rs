//! # Middleware Layer
//!
//! A middleware stage wraps everything after it. It receives the
//! continuation ([`Next`]), the request context and the cancellation signal,
//! and may:
//!
//! - call `next.run(ctx)` and return its result unchanged,
//! - call it and post-process the result,
//! - skip it and short-circuit with its own result,
//! - call it and convert the error it returns.
//!
//! Stages nest: for stages `M1, M2, M3` around terminal `T`, work done before
//! and after the continuation runs in the order
//! `M1, M2, M3, T, M3, M2, M1`.
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Middleware`] uses native `async fn` for zero-cost static dispatch. The
//! pipeline stores stages as `Arc<dyn DynMiddleware>`; every `Middleware`
//! implements [`DynMiddleware`] automatically.

use crate::{
    context::CommandContext, error::InvokeError, handler::Invocation, reply::Reply,
};
use futures::future::BoxFuture;
use std::{future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;

/// A pipeline stage.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Middleware`",
    label = "missing `Middleware` implementation",
    note = "Middleware must implement `handle`, or be wrapped with `middleware::from_fn`."
)]
pub trait Middleware: Send + Sync + 'static {
    /// Run this stage around the rest of the pipeline.
    fn handle<'a>(
        &'a self,
        next: Next<'a>,
        ctx: &'a mut CommandContext,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Reply, InvokeError>> + Send + 'a;
}

/// Object-safe version of [`Middleware`].
pub trait DynMiddleware: Send + Sync + 'static {
    /// Run this stage (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        next: Next<'a>,
        ctx: &'a mut CommandContext,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Reply, InvokeError>>;
}

// Blanket implementation: Any type implementing Middleware implements DynMiddleware automatically.
impl<M: Middleware> DynMiddleware for M {
    fn handle_dyn<'a>(
        &'a self,
        next: Next<'a>,
        ctx: &'a mut CommandContext,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Reply, InvokeError>> {
        Box::pin(self.handle(next, ctx, cancel))
    }
}

/// The continuation handed to a stage: the remaining stages plus the
/// terminal handler call.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn DynMiddleware>],
    cancel: &'a CancellationToken,
}

impl<'a> Next<'a> {
    /// A continuation over `stages`, ending in the bound command's handler.
    pub fn new(stages: &'a [Arc<dyn DynMiddleware>], cancel: &'a CancellationToken) -> Self {
        Self { stages, cancel }
    }

    /// Number of stages still ahead, excluding the terminal.
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }

    /// Run the rest of the pipeline.
    pub fn run(self, ctx: &'a mut CommandContext) -> BoxFuture<'a, Result<Reply, InvokeError>> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    stages: rest,
                    cancel: self.cancel,
                };
                stage.handle_dyn(next, ctx, self.cancel)
            }
            None => Box::pin(invoke_terminal(ctx, self.cancel)),
        }
    }
}

async fn invoke_terminal(
    ctx: &mut CommandContext,
    cancel: &CancellationToken,
) -> Result<Reply, InvokeError> {
    if cancel.is_cancelled() {
        return Err(InvokeError::Cancelled);
    }
    let command = ctx.command().cloned().ok_or(InvokeError::Unbound)?;
    let invocation = Invocation {
        path: ctx.path().clone(),
        arguments: ctx.take_arguments(),
        cancel: cancel.clone(),
        services: ctx.services().clone(),
        command: command.clone(),
    };
    command.handler().call_dyn(invocation).await
}

/// A middleware stage built from a closure.
///
/// The closure returns a boxed future so it can borrow the context:
///
/// ```rust,ignore
/// let stage = from_fn(|next, ctx, _cancel| Box::pin(async move {
///     ctx.items_mut().insert(Started);
///     next.run(ctx).await
/// }));
/// ```
pub fn from_fn<F>(func: F) -> FromFn<F>
where
    F: for<'a> Fn(
            Next<'a>,
            &'a mut CommandContext,
            &'a CancellationToken,
        ) -> BoxFuture<'a, Result<Reply, InvokeError>>
        + Send
        + Sync
        + 'static,
{
    FromFn(func)
}

/// See [`from_fn`].
pub struct FromFn<F>(F);

impl<F> Middleware for FromFn<F>
where
    F: for<'a> Fn(
            Next<'a>,
            &'a mut CommandContext,
            &'a CancellationToken,
        ) -> BoxFuture<'a, Result<Reply, InvokeError>>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(
        &'a self,
        next: Next<'a>,
        ctx: &'a mut CommandContext,
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<Reply, InvokeError>> + Send + 'a {
        (self.0)(next, ctx, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arguments::Arguments, command::Command, path::Path};

    struct Tag(&'static str);

    impl Middleware for Tag {
        async fn handle<'a>(
            &'a self,
            next: Next<'a>,
            ctx: &'a mut CommandContext,
            _cancel: &'a CancellationToken,
        ) -> Result<Reply, InvokeError> {
            let reply = next.run(ctx).await?;
            let inner = reply.content().unwrap_or_default();
            Ok(Reply::text(format!("{}({inner})", self.0)))
        }
    }

    fn bound_context() -> CommandContext {
        let command = Command::builder("t")
            .handler(|_: Invocation| async { "t" })
            .build()
            .unwrap();
        let mut ctx = CommandContext::new();
        ctx.bind(Arc::new(command), Path::new("t"), Arguments::new());
        ctx
    }

    #[tokio::test]
    async fn test_stages_nest() {
        let stages: Vec<Arc<dyn DynMiddleware>> = vec![Arc::new(Tag("a")), Arc::new(Tag("b"))];
        let cancel = CancellationToken::new();
        let mut ctx = bound_context();
        let reply = Next::new(&stages, &cancel).run(&mut ctx).await.unwrap();
        assert_eq!(reply.content(), Some("a(b(t))"));
    }

    #[tokio::test]
    async fn test_terminal_observes_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut ctx = bound_context();
        let err = Next::new(&[], &cancel).run(&mut ctx).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_terminal_without_command() {
        let cancel = CancellationToken::new();
        let mut ctx = CommandContext::new();
        let err = Next::new(&[], &cancel).run(&mut ctx).await.unwrap_err();
        assert!(matches!(err, InvokeError::Unbound));
    }

    #[tokio::test]
    async fn test_from_fn_short_circuits() {
        let stage = from_fn(|_next, _ctx, _cancel| Box::pin(async { Ok(Reply::text("blocked")) }));
        let stages: Vec<Arc<dyn DynMiddleware>> = vec![Arc::new(stage)];
        let cancel = CancellationToken::new();
        let mut ctx = bound_context();
        let reply = Next::new(&stages, &cancel).run(&mut ctx).await.unwrap();
        assert_eq!(reply.content(), Some("blocked"));
    }
}
