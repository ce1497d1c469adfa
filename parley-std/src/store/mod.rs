//! # Command Store
//!
//! Commands are indexed in a trie keyed by case-insensitive path segments.
//! Each [`StoreNode`] holds the overloads whose full path ends there and the
//! child segments below it, so one name can be both a command and a group.
//!
//! # Reload
//!
//! The whole trie lives in an immutable [`Snapshot`]. A reload loads every
//! source under a fresh cancellation scope, builds a new snapshot from
//! scratch and publishes it with a single atomic swap. Starting a reload
//! cancels the previous scope, so an older rebuild still in flight gives up
//! instead of publishing stale data. Rebuilds are serialized by a writer
//! lock; readers never lock.
//!
//! Readers racing a reload see either the old or the new snapshot, never a
//! mix. Callers that need several lookups to agree hold one [`Snapshot`].

mod source;

pub use source::{CommandSet, CommandSource, DynCommandSource, DynamicSource};

use arc_swap::ArcSwap;
use futures::future::select_all;
use parley_core::{BoxError, Command, ParleyError, Path};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Errors raised by [`Store::reload`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// A source failed; the previous snapshot stays active.
    #[error("command source failed: {0}")]
    Source(#[source] BoxError),

    /// A newer reload started before this one finished.
    #[error("reload was superseded by a newer one")]
    Superseded,
}

impl From<StoreError> for ParleyError {
    fn from(err: StoreError) -> Self {
        ParleyError::Source(Box::new(err))
    }
}

/// One segment of the trie.
#[derive(Default)]
pub struct StoreNode {
    children: HashMap<Path, StoreNode>,
    commands: Vec<Arc<Command>>,
}

impl StoreNode {
    fn insert(&mut self, path: &[Path], command: Arc<Command>) {
        let mut node = self;
        for segment in path {
            node = node.children.entry(segment.clone()).or_default();
        }
        node.commands.push(command);
    }

    /// The child node for `segment`.
    pub fn child(&self, segment: &Path) -> Option<&StoreNode> {
        self.children.get(segment)
    }

    /// The node at `path` below this one.
    pub fn descend(&self, path: &[Path]) -> Option<&StoreNode> {
        path.iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Whether any registered path continues below this node.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// The overloads ending exactly at this node.
    pub fn commands(&self) -> &[Arc<Command>] {
        &self.commands
    }

    /// The sub-store rooted at `prefix`, if `prefix` is a true group.
    ///
    /// Returns `None` when nothing extends beyond `prefix`, even if commands
    /// terminate there.
    pub fn group(&self, prefix: &[Path]) -> Option<&StoreNode> {
        self.descend(prefix).filter(|node| node.is_group())
    }

    /// Every overload whose full path equals `path`.
    pub fn handlers(&self, path: &[Path]) -> &[Arc<Command>] {
        self.descend(path).map(StoreNode::commands).unwrap_or(&[])
    }

    /// Child segment names, in no particular order.
    pub fn segments(&self) -> impl Iterator<Item = &Path> {
        self.children.keys()
    }
}

impl fmt::Debug for StoreNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreNode")
            .field("commands", &self.commands.len())
            .field("children", &self.children)
            .finish()
    }
}

/// An immutable trie built from one load of every source.
#[derive(Debug, Default)]
pub struct Snapshot {
    root: StoreNode,
    version: u64,
    commands: usize,
}

impl Snapshot {
    /// Build a trie over every alias path of `commands`.
    pub fn build(version: u64, commands: impl IntoIterator<Item = Arc<Command>>) -> Self {
        let mut root = StoreNode::default();
        let mut count = 0;
        for command in commands {
            for path in command.alias_paths() {
                root.insert(&path, command.clone());
            }
            count += 1;
        }
        Self {
            root,
            version,
            commands: count,
        }
    }

    /// The root node.
    pub fn root(&self) -> &StoreNode {
        &self.root
    }

    /// See [`StoreNode::group`].
    pub fn group(&self, prefix: &[Path]) -> Option<&StoreNode> {
        self.root.group(prefix)
    }

    /// See [`StoreNode::handlers`].
    pub fn handlers(&self, path: &[Path]) -> &[Arc<Command>] {
        self.root.handlers(path)
    }

    /// The reload generation that produced this snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of distinct commands indexed.
    pub fn len(&self) -> usize {
        self.commands
    }

    /// Whether no command is indexed.
    pub fn is_empty(&self) -> bool {
        self.commands == 0
    }
}

/// The hot-reloadable command store.
pub struct Store {
    current: ArcSwap<Snapshot>,
    scope: ArcSwap<CancellationToken>,
    sources: Vec<Arc<dyn DynCommandSource>>,
    writer: Mutex<()>,
    generation: AtomicU64,
}

impl Store {
    /// An empty store without sources.
    pub fn new() -> Self {
        Self::with_sources(Vec::new(), Snapshot::default())
    }

    /// Start configuring sources.
    pub fn builder() -> StoreBuilder {
        StoreBuilder {
            sources: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// A store over a fixed command list, indexed immediately.
    pub fn from_commands(commands: impl IntoIterator<Item = Command>) -> Self {
        Self::builder().commands(commands).build()
    }

    fn with_sources(sources: Vec<Arc<dyn DynCommandSource>>, initial: Snapshot) -> Self {
        Self {
            generation: AtomicU64::new(initial.version),
            current: ArcSwap::from_pointee(initial),
            scope: ArcSwap::from_pointee(CancellationToken::new()),
            sources,
            writer: Mutex::new(()),
        }
    }

    /// The current snapshot. Lock-free.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Overloads at `path` in the current snapshot.
    pub fn handlers(&self, path: &[Path]) -> Vec<Arc<Command>> {
        self.current.load().handlers(path).to_vec()
    }

    /// Whether `prefix` is a group in the current snapshot.
    pub fn is_group(&self, prefix: &[Path]) -> bool {
        self.current.load().group(prefix).is_some()
    }

    /// Rebuild the trie from every source and publish it.
    ///
    /// Returns the new snapshot version. On failure the previous snapshot
    /// stays active.
    pub async fn reload(&self) -> Result<u64, StoreError> {
        let scope = CancellationToken::new();
        let previous = self.scope.swap(Arc::new(scope.clone()));
        previous.cancel();

        let _writer = self.writer.lock().await;
        if scope.is_cancelled() {
            return Err(StoreError::Superseded);
        }

        let mut commands = Vec::new();
        for source in &self.sources {
            let loaded = tokio::select! {
                biased;
                _ = scope.cancelled() => return Err(StoreError::Superseded),
                loaded = source.load_dyn(scope.clone()) => loaded,
            };
            match loaded {
                Ok(loaded) => commands.extend(loaded),
                Err(err) => {
                    warn!(error = %err, "command source failed; keeping previous commands");
                    return Err(StoreError::Source(err));
                }
            }
        }

        let version = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let snapshot = Snapshot::build(version, commands);
        if scope.is_cancelled() {
            return Err(StoreError::Superseded);
        }
        let indexed = snapshot.len();
        self.current.store(Arc::new(snapshot));
        debug!(version, commands = indexed, "command store reloaded");
        Ok(version)
    }

    /// Reload whenever any source signals a change.
    ///
    /// Returns `None` when no source can signal. The watcher stops once every
    /// signal is closed or the store is dropped.
    pub fn watch(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut receivers: Vec<_> = self
            .sources
            .iter()
            .filter_map(|source| source.subscribe_dyn())
            .collect();
        if receivers.is_empty() {
            return None;
        }

        let store = Arc::downgrade(self);
        Some(tokio::spawn(async move {
            loop {
                let (changed, index, _) =
                    select_all(receivers.iter_mut().map(|rx| Box::pin(rx.changed()))).await;
                if changed.is_err() {
                    receivers.swap_remove(index);
                    if receivers.is_empty() {
                        break;
                    }
                    continue;
                }

                let Some(store) = store.upgrade() else {
                    break;
                };
                tokio::spawn(async move {
                    match store.reload().await {
                        Ok(_) | Err(StoreError::Superseded) => {}
                        Err(err) => debug!(error = %err, "reload after change failed"),
                    }
                });
            }
            debug!("command store watcher stopped");
        }))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("Store")
            .field("version", &snapshot.version())
            .field("commands", &snapshot.len())
            .field("sources", &self.sources.len())
            .finish()
    }
}

/// Builder for [`Store`].
pub struct StoreBuilder {
    sources: Vec<Arc<dyn DynCommandSource>>,
    commands: Vec<Arc<Command>>,
}

impl StoreBuilder {
    /// Add a source.
    pub fn source<S: CommandSource>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Add fixed commands, indexed immediately and kept across reloads.
    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands.extend(commands.into_iter().map(Arc::new));
        self
    }

    /// Build the store. Sources are not loaded until [`Store::reload`].
    pub fn build(mut self) -> Store {
        let initial = Snapshot::build(0, self.commands.iter().cloned());
        if !self.commands.is_empty() {
            let fixed = CommandSet {
                commands: std::mem::take(&mut self.commands),
            };
            self.sources.insert(0, Arc::new(fixed));
        }
        Store::with_sources(self.sources, initial)
    }
}
