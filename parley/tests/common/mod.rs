#![allow(dead_code)]

use parley::{Command, Invocation, Outcome, Parameter, Reply, TokenizeError, tokenize};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Input helpers
// ============================================================================

/// Raw text of every token in `input`.
pub fn raw_tokens(input: &str) -> Result<Vec<String>, TokenizeError> {
    tokenize(input)
        .map(|token| token.map(|token| token.raw().to_owned()))
        .collect()
}

/// Resolved value of every token in `input`.
pub fn token_values(input: &str) -> Result<Vec<String>, TokenizeError> {
    tokenize(input)
        .map(|token| token.map(|token| token.value().into_owned()))
        .collect()
}

// ============================================================================
// Commands
// ============================================================================

pub async fn noop(_: Invocation) -> Reply {
    Reply::empty()
}

pub fn simple(name: &str) -> Command {
    Command::builder(name).handler(noop).build().unwrap()
}

/// `echo <text...>` replying with the remainder.
pub fn echo() -> Command {
    Command::builder("echo")
        .parameter(Parameter::of::<String>("text").remainder())
        .handler(|mut inv: Invocation| async move {
            inv.arguments
                .require::<String>("text")
                .map(Reply::text)
        })
        .build()
        .unwrap()
}

/// `add <a> <b>` replying with the sum.
pub fn add() -> Command {
    Command::builder("add")
        .parameter(Parameter::of::<i64>("a"))
        .parameter(Parameter::of::<i64>("b"))
        .handler(|mut inv: Invocation| async move {
            let a: i64 = inv.arguments.require("a")?;
            let b: i64 = inv.arguments.require("b")?;
            Ok::<_, parley::ArgumentError>((a + b).to_string())
        })
        .build()
        .unwrap()
}

/// A handler counting its calls through a shared counter.
pub fn counted(name: &str, calls: &Arc<AtomicUsize>) -> Command {
    let calls = calls.clone();
    Command::builder(name)
        .handler(move |_: Invocation| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Reply::text("counted")
            }
        })
        .build()
        .unwrap()
}

// ============================================================================
// Outcome helpers
// ============================================================================

pub fn content(outcome: &Outcome) -> Option<&str> {
    outcome.reply().and_then(Reply::content)
}
