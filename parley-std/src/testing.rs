//! Testing utilities for Parley.
//!
//! Doubles for exercising dispatchers and pipelines without real commands.
//!
//! # Features
//!
//! - [`Journal`]: A shared, ordered log that stages and handlers write to
//! - [`RecordingMiddleware`]: A stage that records its label before and after the continuation
//! - [`ShortCircuit`]: A stage that never calls the continuation
//! - [`CancelBeforeNext`]: A stage that cancels the request before continuing
//! - [`CountingHandler`]: A handler that counts its calls
//! - [`FailingHandler`]: A handler that always returns an error
//! - [`PanickingHandler`]: A handler that always panics

use parking_lot::Mutex;
use parley_core::{
    BoxError, CommandContext, Handler, InvokeError, Invocation, Middleware, Next, Reply,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Journal
// ============================================================================

/// An ordered log shared between clones.
///
/// ```rust
/// use parley_std::testing::Journal;
///
/// let journal = Journal::new();
/// journal.clone().record("a");
/// journal.record("b");
/// assert_eq!(journal.entries(), ["a", "b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// A copy of every entry so far.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forget every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

// ============================================================================
// Middleware doubles
// ============================================================================

/// Records `label` on entry and again on exit.
#[derive(Debug, Clone)]
pub struct RecordingMiddleware {
    label: String,
    journal: Journal,
}

impl RecordingMiddleware {
    /// Record into `journal` under `label`.
    pub fn new(label: impl Into<String>, journal: &Journal) -> Self {
        Self {
            label: label.into(),
            journal: journal.clone(),
        }
    }
}

impl Middleware for RecordingMiddleware {
    async fn handle<'a>(
        &'a self,
        next: Next<'a>,
        ctx: &'a mut CommandContext,
        _cancel: &'a CancellationToken,
    ) -> Result<Reply, InvokeError> {
        self.journal.record(self.label.clone());
        let result = next.run(ctx).await;
        self.journal.record(self.label.clone());
        result
    }
}

/// Returns a fixed reply without calling the continuation.
#[derive(Debug, Clone)]
pub struct ShortCircuit {
    reply: Reply,
}

impl ShortCircuit {
    /// Always answer with `reply`.
    pub fn new(reply: Reply) -> Self {
        Self { reply }
    }
}

impl Middleware for ShortCircuit {
    async fn handle<'a>(
        &'a self,
        _next: Next<'a>,
        _ctx: &'a mut CommandContext,
        _cancel: &'a CancellationToken,
    ) -> Result<Reply, InvokeError> {
        Ok(self.reply.clone())
    }
}

/// Cancels the request, then calls the continuation anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelBeforeNext;

impl Middleware for CancelBeforeNext {
    async fn handle<'a>(
        &'a self,
        next: Next<'a>,
        ctx: &'a mut CommandContext,
        cancel: &'a CancellationToken,
    ) -> Result<Reply, InvokeError> {
        cancel.cancel();
        next.run(ctx).await
    }
}

// ============================================================================
// Handler doubles
// ============================================================================

/// Counts calls; optionally records `"T"` into a journal.
#[derive(Debug, Clone, Default)]
pub struct CountingHandler {
    calls: Arc<AtomicUsize>,
    journal: Option<Journal>,
}

impl CountingHandler {
    /// A handler that only counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also record `"T"` into `journal` on every call.
    pub fn recording(mut self, journal: &Journal) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    /// Number of calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Handler for CountingHandler {
    type Output = Reply;

    async fn call(&self, _invocation: Invocation) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            journal.record("T");
        }
        Reply::empty()
    }
}

/// Always fails with `message`.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Fail with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Handler for FailingHandler {
    type Output = Result<Reply, BoxError>;

    async fn call(&self, _invocation: Invocation) -> Result<Reply, BoxError> {
        Err(self.message.clone().into())
    }
}

/// Always panics with `"handler panicked"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingHandler;

impl Handler for PanickingHandler {
    type Output = Reply;

    async fn call(&self, _invocation: Invocation) -> Reply {
        panic!("handler panicked");
    }
}
