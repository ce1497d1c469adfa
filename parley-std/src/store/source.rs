//! Command sources feeding the store.
//!
//! A source supplies the current command set and, optionally, a change
//! signal. How commands are discovered is the source's business; the store
//! only ever calls [`CommandSource::load`] and watches
//! [`CommandSource::subscribe`].

use futures::future::BoxFuture;
use parking_lot::RwLock;
use parley_core::{BoxError, Command, Path};
use std::{future::Future, sync::Arc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Supplies commands to a [`Store`](super::Store).
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `CommandSource`",
    label = "missing `CommandSource` implementation",
    note = "Sources must implement `load`; `subscribe` is optional."
)]
pub trait CommandSource: Send + Sync + 'static {
    /// Produce the full current command set.
    ///
    /// `cancel` fires when a newer reload supersedes this one.
    fn load(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Vec<Arc<Command>>, BoxError>> + Send;

    /// A receiver that changes whenever the command set changes.
    fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        None
    }
}

/// Object-safe version of [`CommandSource`].
pub trait DynCommandSource: Send + Sync + 'static {
    /// Produce the full current command set (dynamic dispatch version).
    fn load_dyn(
        &self,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<Vec<Arc<Command>>, BoxError>>;

    /// See [`CommandSource::subscribe`].
    fn subscribe_dyn(&self) -> Option<watch::Receiver<u64>>;
}

// Blanket implementation: Any type implementing CommandSource implements DynCommandSource automatically.
impl<S: CommandSource> DynCommandSource for S {
    fn load_dyn(
        &self,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<Vec<Arc<Command>>, BoxError>> {
        Box::pin(self.load(cancel))
    }

    fn subscribe_dyn(&self) -> Option<watch::Receiver<u64>> {
        self.subscribe()
    }
}

/// A fixed set of commands. Never signals a change.
#[derive(Debug, Default)]
pub struct CommandSet {
    pub(super) commands: Vec<Arc<Command>>,
}

impl CommandSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command.
    pub fn with(mut self, command: Command) -> Self {
        self.commands.push(Arc::new(command));
        self
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<Command> for CommandSet {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl CommandSource for CommandSet {
    async fn load(&self, _cancel: CancellationToken) -> Result<Vec<Arc<Command>>, BoxError> {
        Ok(self.commands.clone())
    }
}

/// A command set that changes at runtime.
///
/// Every [`register`](DynamicSource::register) and
/// [`unregister`](DynamicSource::unregister) bumps a version counter that
/// subscribed stores watch.
pub struct DynamicSource {
    commands: RwLock<Vec<Arc<Command>>>,
    version: watch::Sender<u64>,
}

impl DynamicSource {
    /// An empty source.
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            commands: RwLock::new(Vec::new()),
            version,
        }
    }

    /// Add a command and signal the change.
    pub fn register(&self, command: Command) -> Arc<Command> {
        let command = Arc::new(command);
        self.commands.write().push(command.clone());
        self.bump();
        command
    }

    /// Remove every command whose declared name is `name`.
    ///
    /// Returns how many were removed; signals only when that is non-zero.
    pub fn unregister(&self, name: &Path) -> usize {
        let removed = {
            let mut commands = self.commands.write();
            let before = commands.len();
            commands.retain(|command| command.name() != *name);
            before - commands.len()
        };
        if removed > 0 {
            self.bump();
        }
        removed
    }

    /// Remove one specific command instance.
    pub fn remove(&self, command: &Arc<Command>) -> bool {
        let removed = {
            let mut commands = self.commands.write();
            let before = commands.len();
            commands.retain(|c| !Arc::ptr_eq(c, command));
            before != commands.len()
        };
        if removed {
            self.bump();
        }
        removed
    }

    /// The number of changes so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    fn bump(&self) {
        self.version.send_modify(|version| *version += 1);
    }
}

impl Default for DynamicSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSource for DynamicSource {
    async fn load(&self, _cancel: CancellationToken) -> Result<Vec<Arc<Command>>, BoxError> {
        Ok(self.commands.read().clone())
    }

    fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        Some(self.version.subscribe())
    }
}

// Shared sources: the application keeps one handle to mutate, the store another.
impl<S: CommandSource> CommandSource for Arc<S> {
    fn load(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Vec<Arc<Command>>, BoxError>> + Send {
        (**self).load(cancel)
    }

    fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        (**self).subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{Invocation, Reply};

    async fn noop(_: Invocation) -> Reply {
        Reply::empty()
    }

    fn command(name: &str) -> Command {
        Command::builder(name).handler(noop).build().unwrap()
    }

    #[tokio::test]
    async fn test_command_set_loads_everything_and_never_signals() {
        let set: CommandSet = [command("a"), command("b")].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.subscribe().is_none());

        let loaded = set.load(CancellationToken::new()).await.unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[tokio::test]
    async fn test_dynamic_source_signals_every_change() {
        let source = DynamicSource::new();
        let mut rx = source.subscribe().unwrap();

        let first = source.register(command("ping"));
        source.register(command("PING"));
        source.register(command("pong"));
        assert_eq!(source.version(), 3);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        // names compare case-insensitively
        assert_eq!(source.unregister(&Path::new("ping")), 2);
        assert_eq!(source.len(), 1);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert_eq!(source.unregister(&Path::new("missing")), 0);
        assert!(!source.remove(&first));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(source.version(), 4);

        let loaded = source.load(CancellationToken::new()).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name(), Path::new("pong"));
    }

    #[test]
    fn test_remove_targets_one_instance() {
        let source = DynamicSource::new();
        let kept = source.register(command("echo"));
        let dropped = source.register(command("echo"));

        assert!(source.remove(&dropped));
        assert_eq!(source.len(), 1);
        assert!(!source.remove(&dropped));
        assert!(source.remove(&kept));
        assert!(source.is_empty());
    }
}
