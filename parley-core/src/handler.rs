//! # Terminal Layer (Handler)
//!
//! The handler is the business logic at the end of the pipeline. It receives
//! an owned [`Invocation`] carrying the bound arguments, the cancellation
//! signal and the request's services, and returns anything that converts via
//! [`IntoReply`].
//!
//! # Usage Patterns
//!
//! 1. **Async fn or closure**: `|inv: Invocation| async move { ... }`
//! 2. **Struct implementation**: `impl Handler for MyHandler`
//! 3. **Attribute**: `#[command]` on an `async fn` with typed parameters
//!
//! A handler must check [`Invocation::cancel`] before doing any externally
//! visible work; the pipeline checks it once right before the call.

use crate::{
    arguments::Arguments, command::Command, error::InvokeError, path::Path, reply::IntoReply,
    reply::Reply, services::Services,
};
use futures::future::BoxFuture;
use std::{future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Everything a handler receives for one request.
#[derive(Debug)]
pub struct Invocation {
    /// The resolved command path as typed by the user.
    pub path: Path,
    /// The bound parameter values.
    pub arguments: Arguments,
    /// The request's cancellation signal.
    pub cancel: CancellationToken,
    /// Request-scoped services.
    pub services: Services,
    /// The selected overload.
    pub command: Arc<Command>,
}

/// The terminal endpoint of a command invocation.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle a command invocation",
    label = "missing `Handler` implementation",
    note = "Handlers must implement `call`, or be an `async fn(Invocation) -> impl IntoReply`."
)]
pub trait Handler: Send + Sync + 'static {
    /// The output type, converted into a [`Reply`].
    type Output: IntoReply;

    /// Executes the handler logic.
    fn call(&self, invocation: Invocation) -> impl Future<Output = Self::Output> + Send;
}

// Blanket impl for closures
impl<F, Out, Fut> Handler for F
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send,
    Out: IntoReply,
{
    type Output = Out;

    fn call(&self, invocation: Invocation) -> impl Future<Output = Self::Output> + Send {
        (self)(invocation)
    }
}

/// Object-safe version of [`Handler`].
///
/// Commands store their handler as `Arc<dyn DynHandler>`.
pub trait DynHandler: Send + Sync + 'static {
    /// Run the handler and convert its output.
    fn call_dyn(&self, invocation: Invocation) -> BoxFuture<'_, Result<Reply, InvokeError>>;
}

// Blanket implementation: Any type implementing Handler implements DynHandler automatically.
impl<H: Handler> DynHandler for H {
    fn call_dyn(&self, invocation: Invocation) -> BoxFuture<'_, Result<Reply, InvokeError>> {
        Box::pin(async move {
            let output = self.call(invocation).await;
            output.into_reply().map_err(InvokeError::from)
        })
    }
}
