//! # parley-core
//!
//! Core contracts for the Parley command resolution engine.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! command libraries and middleware that don't need the full `parley-std`
//! implementation.
//!
//! # Resolution Pipeline
//!
//! One line of text travels strictly forward:
//!
//! text → [`Token`]s → path segments matched against the command store →
//! candidate [`Command`] overloads → bound [`Arguments`] → [`Middleware`]
//! chain → [`Handler`] → [`Outcome`].
//!
//! ## Values ([`Path`], [`Token`])
//!
//! Immutable views over a shared buffer with case-insensitive equality.
//! Tokens point straight into the raw input.
//!
//! ## Declarations ([`Command`], [`Parameter`], [`Group`])
//!
//! Commands are declared explicitly and never change after construction.
//! Every formal [`Parameter`] names the type a [`Binder`] must produce.
//!
//! ## Execution ([`Middleware`], [`Handler`])
//!
//! Stages wrap the terminal handler in strict nesting order. The same
//! cancellation token is threaded through every stage and the handler.
//!
//! ## State ([`CommandContext`])
//!
//! Per-request data, pooled and reset between requests.
//!
//! # Error Types
//!
//! - [`ParleyError`] - Top-level error type
//! - [`TokenizeError`] - Lexical errors with position
//! - [`BuildError`] - Invalid declarations
//! - [`InvokeError`] - Pipeline faults

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod arguments;
mod binder;
mod command;
mod context;
mod error;
mod extensions;
mod handler;
pub mod lexical;
pub mod middleware;
mod outcome;
mod overrides;
mod path;
mod reply;
mod services;
mod token;
pub mod tokenizer;

// Re-exports
pub use arguments::Arguments;
pub use binder::{Binder, BoundValue, DynBinder, FnBinder};
pub use command::{Command, CommandBuilder, Group, Parameter, ParameterFlags, Segment};
pub use context::{CommandContext, ContextState};
pub use error::{
    ArgumentError, BoxError, BuildError, InvokeError, ParleyError, PathError, TokenizeError,
    TokenizeErrorKind,
};
pub use extensions::Extensions;
pub use handler::{DynHandler, Handler, Invocation};
pub use middleware::{DynMiddleware, Middleware, Next};
pub use outcome::Outcome;
pub use overrides::{NumberFormat, NumberStyle, Overrides, ParameterOverride, UuidFormat};
pub use path::Path;
pub use reply::{IntoReply, Reply};
pub use services::{ScopeFactory, Services};
pub use token::{Token, unescape};
pub use tokenizer::{Tokenizer, TokenizerMode, tokenize};
