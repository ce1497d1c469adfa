//! # parley-std
//!
//! Standard implementations for the Parley command resolution engine.
//!
//! This crate provides:
//! - **Command store**: [`Store`](store::Store) alias trie with atomic hot reload, plus
//!   [`CommandSet`](store::CommandSet) and [`DynamicSource`](store::DynamicSource) sources
//! - **Binders**: [`BinderRegistry`](binders::BinderRegistry) with numeric, boolean,
//!   UUID and string built-ins
//! - **Overload ranking**: [`resolve`](ranking::resolve)
//! - **Execution**: [`Pipeline`](pipeline::Pipeline), [`ContextPool`](pool::ContextPool),
//!   [`Dispatcher`](dispatch::Dispatcher) and [`QueueDispatcher`](dispatch::QueueDispatcher)
//! - **Standard middleware**: Logging, Timeout
//! - **Testing doubles**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core contracts
pub use parley_core;

// Modules
pub mod binders;
pub mod dispatch;
pub mod middleware;
pub mod pipeline;
pub mod pool;
pub mod ranking;
pub mod store;
pub mod testing;
