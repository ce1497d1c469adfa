//! # parley - Typed Command Resolution
//!
//! `parley` turns one line of text into a typed, middleware-wrapped command
//! invocation. Input is tokenized with strict quoting rules, matched against
//! an alias trie of declared commands, bound to the best overload and run
//! through a middleware pipeline. Every request ends in an [`Outcome`] or a
//! [`TokenizeError`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parley::prelude::*;
//!
//! #[parley::command(aliases = ["r"])]
//! async fn roll(count: u32, sides: Option<u32>) -> String {
//!     format!("rolling {count}d{}", sides.unwrap_or(6))
//! }
//!
//! let dispatcher = Dispatcher::builder()
//!     .commands([roll::command()?])
//!     .layer(LoggingMiddleware)
//!     .build();
//!
//! let outcome = dispatcher.execute("r 2 20", &CancellationToken::new()).await?;
//! assert!(outcome.is_success());
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use parley_core::{
    // Arguments
    ArgumentError,
    Arguments,
    // Binding
    Binder,
    // Error types
    BoxError,
    BoundValue,
    BuildError,
    // Declarations
    Command,
    CommandBuilder,
    // Context
    CommandContext,
    ContextState,
    DynBinder,
    DynHandler,
    DynMiddleware,
    Extensions,
    FnBinder,
    Group,
    // Handler
    Handler,
    IntoReply,
    Invocation,
    InvokeError,
    // Middleware
    Middleware,
    Next,
    NumberFormat,
    // Overrides
    NumberStyle,
    // Outcome
    Outcome,
    Overrides,
    Parameter,
    ParameterFlags,
    ParameterOverride,
    ParleyError,
    // Values
    Path,
    PathError,
    Reply,
    // Services
    ScopeFactory,
    Segment,
    Services,
    Token,
    TokenizeError,
    TokenizeErrorKind,
    // Tokenizer
    Tokenizer,
    TokenizerMode,
    UuidFormat,
    tokenize,
    unescape,
};

pub use parley_std::{
    binders::{BinderRegistry, BinderRegistryBuilder},
    dispatch::{
        DispatchError, Dispatcher, DispatcherBuilder, Prepared, QueueDispatcher, Ticket,
    },
    pipeline::{Pipeline, PipelineBuilder},
    pool::{ContextPool, PooledContext},
    store::{CommandSet, CommandSource, DynamicSource, Snapshot, Store, StoreError},
};

pub use tokio_util::sync::CancellationToken;

/// Character classes used by the tokenizer.
pub mod lexical {
    #![allow(clippy::wildcard_imports)]
    pub use parley_core::lexical::*;
}

/// Built-in binders.
pub mod binders {
    #![allow(clippy::wildcard_imports)]
    pub use parley_std::binders::*;
}

/// Command store internals.
pub mod store {
    #![allow(clippy::wildcard_imports)]
    pub use parley_std::store::*;
}

/// Overload ranking.
pub mod ranking {
    #![allow(clippy::wildcard_imports)]
    pub use parley_std::ranking::*;
}

/// Standard middleware implementations.
pub mod middleware {
    #![allow(clippy::wildcard_imports)]
    pub use parley_core::middleware::{FromFn, from_fn};
    pub use parley_std::middleware::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use parley_std::testing::*;
}

/// Prelude module - common imports for Parley.
///
/// # Usage
///
/// ```rust,ignore
/// use parley::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ArgumentError,
        Arguments,
        BinderRegistry,
        // Errors
        BoxError,
        CancellationToken,
        // Declarations
        Command,
        CommandContext,
        Dispatcher,
        Group,
        // Core traits
        Handler,
        IntoReply,
        Invocation,
        InvokeError,
        Middleware,
        Next,
        Outcome,
        Parameter,
        Path,
        QueueDispatcher,
        Reply,
        Store,
        TokenizeError,
        middleware::{LoggingMiddleware, TimeoutMiddleware},
    };
}

#[cfg(feature = "macros")]
pub use parley_macros::command;
