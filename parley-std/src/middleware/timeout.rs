//! Timeout stage for time-limited execution.

use parley_core::{CommandContext, InvokeError, Middleware, Next, Reply};
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Fails the invocation with [`InvokeError::Timeout`] when the rest of the
/// pipeline takes longer than `duration`.
///
/// The continuation is dropped on expiry; handlers that must clean up should
/// also watch the cancellation token.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutMiddleware {
    duration: Duration,
}

impl TimeoutMiddleware {
    /// Create a new timeout stage.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// The configured limit.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Middleware for TimeoutMiddleware {
    async fn handle<'a>(
        &'a self,
        next: Next<'a>,
        ctx: &'a mut CommandContext,
        _cancel: &'a CancellationToken,
    ) -> Result<Reply, InvokeError> {
        match timeout(self.duration, next.run(ctx)).await {
            Ok(result) => result,
            Err(_) => Err(InvokeError::Timeout(self.duration)),
        }
    }
}
