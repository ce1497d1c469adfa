//! # Pipeline
//!
//! An ordered, immutable list of middleware stages. Running the pipeline
//! builds a [`Next`] over the stages; the last continuation invokes the bound
//! command's handler.

use parley_core::{CommandContext, DynMiddleware, InvokeError, Middleware, Next, Reply};
use std::{fmt, sync::Arc};
use tokio_util::sync::CancellationToken;

/// The middleware chain shared by every request.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn DynMiddleware>]>,
}

impl Pipeline {
    /// A pipeline without stages: requests go straight to the handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start adding stages.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run `ctx` through every stage and the handler.
    pub async fn run(
        &self,
        ctx: &mut CommandContext,
        cancel: &CancellationToken,
    ) -> Result<Reply, InvokeError> {
        Next::new(&self.stages, cancel).run(ctx).await
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

/// Builder for [`Pipeline`]. Stages run in the order they are added; the
/// first one added is outermost.
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn DynMiddleware>>,
}

impl PipelineBuilder {
    /// Append a stage.
    pub fn layer<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Append a shared stage.
    pub fn layer_arc(mut self, middleware: Arc<dyn DynMiddleware>) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Finish building.
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages.into(),
        }
    }
}
