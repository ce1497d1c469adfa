//! Per-request mutable state.
//!
//! A [`CommandContext`] travels through parse, bind and the middleware
//! pipeline for exactly one request at a time. Contexts are pooled: once a
//! request finishes, [`CommandContext::reset`] clears every field and drops
//! the service scope before the context is handed out again.

use crate::{
    arguments::Arguments, command::Command, extensions::Extensions, path::Path,
    services::Services,
};
use std::sync::Arc;

/// Lifecycle of a [`CommandContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContextState {
    /// Pooled and unused.
    #[default]
    Idle,
    /// Path and arguments are populated.
    Bound,
    /// Inside the pipeline.
    Executing,
    /// The pipeline produced a reply.
    Complete,
    /// The pipeline faulted.
    Failed,
    /// Cancellation was observed.
    Cancelled,
}

impl ContextState {
    /// Whether the request has finished.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ContextState::Complete | ContextState::Failed | ContextState::Cancelled
        )
    }
}

/// Mutable state for one request.
#[derive(Debug, Default)]
pub struct CommandContext {
    input: Option<Arc<str>>,
    path: Path,
    items: Extensions,
    arguments: Arguments,
    command: Option<Arc<Command>>,
    services: Services,
    state: ContextState,
}

impl CommandContext {
    /// A fresh, idle context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw input of the current request.
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Record the raw input of the current request.
    pub fn set_input(&mut self, input: Arc<str>) {
        self.input = Some(input);
    }

    /// The resolved command path as typed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Per-request items shared between middleware stages.
    pub fn items(&self) -> &Extensions {
        &self.items
    }

    /// Mutable access to the item bag.
    pub fn items_mut(&mut self) -> &mut Extensions {
        &mut self.items
    }

    /// The bound parameters.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Mutable access to the bound parameters.
    pub fn arguments_mut(&mut self) -> &mut Arguments {
        &mut self.arguments
    }

    /// Move the bound parameters out, leaving an empty map.
    pub fn take_arguments(&mut self) -> Arguments {
        std::mem::take(&mut self.arguments)
    }

    /// The selected overload.
    pub fn command(&self) -> Option<&Arc<Command>> {
        self.command.as_ref()
    }

    /// The request's service scope.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Attach a service scope.
    pub fn set_services(&mut self, services: Services) {
        self.services = services;
    }

    /// The lifecycle state.
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Populate the resolved command and its arguments.
    pub fn bind(&mut self, command: Arc<Command>, path: Path, arguments: Arguments) {
        self.command = Some(command);
        self.path = path;
        self.arguments = arguments;
        self.state = ContextState::Bound;
    }

    /// Enter the pipeline.
    pub fn begin(&mut self) {
        self.state = ContextState::Executing;
    }

    /// Record how the request ended.
    pub fn finish(&mut self, state: ContextState) {
        debug_assert!(state.is_terminal());
        self.state = state;
    }

    /// Clear every field and release the service scope.
    pub fn reset(&mut self) {
        self.input = None;
        self.path = Path::empty();
        self.items.clear();
        self.arguments.clear();
        self.command = None;
        self.services = Services::default();
        self.state = ContextState::Idle;
    }
}
