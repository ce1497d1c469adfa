//! Logging stage for invocation observation.

use parley_core::{CommandContext, InvokeError, Middleware, Next, Reply};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Logs entry and exit of each invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    async fn handle<'a>(
        &'a self,
        next: Next<'a>,
        ctx: &'a mut CommandContext,
        _cancel: &'a CancellationToken,
    ) -> Result<Reply, InvokeError> {
        let path = ctx.path().clone();
        let started = Instant::now();
        tracing::debug!(path = %path, arguments = ctx.arguments().len(), "invoking command");

        let result = next.run(ctx).await;
        let elapsed = started.elapsed();
        match &result {
            Ok(reply) => {
                tracing::debug!(path = %path, ?elapsed, success = reply.is_success(), "command finished")
            }
            Err(err) => tracing::debug!(path = %path, ?elapsed, error = %err, "command faulted"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pipeline::Pipeline, testing::FailingHandler};
    use parley_core::{Arguments, Command, Path};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_passes_results_through() {
        let command = Command::builder("fail")
            .handler(FailingHandler::new("nope"))
            .build()
            .unwrap();
        let mut ctx = CommandContext::new();
        ctx.bind(Arc::new(command), Path::new("fail"), Arguments::new());

        let err = Pipeline::builder()
            .layer(LoggingMiddleware)
            .build()
            .run(&mut ctx, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
