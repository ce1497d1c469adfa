//! # Overload Ranking
//!
//! Turns a token list into at most one bound command.
//!
//! 1. Descend the trie one token per level. Every node passed on the way
//!    contributes its commands as candidates, so `a b 1` yields both the
//!    overloads of `a b` (leftover `1`) and those of `a` (leftover `b 1`).
//! 2. Order candidates by matched path length, then declared parameter count,
//!    then leftover token count, all descending. The sort is stable, so
//!    registration order breaks remaining ties.
//! 3. Bind each candidate's parameters in declared order. The first
//!    candidate whose parameters all bind wins. Failed attempts build only
//!    local state and leave nothing behind.

use crate::{binders::BinderRegistry, store::StoreNode};
use parley_core::{Arguments, Command, Path, Token, unescape};
use std::{cmp::Reverse, sync::Arc};
use tracing::trace;

/// One trie match.
#[derive(Debug, Clone)]
pub struct Candidate {
    command: Arc<Command>,
    matched: usize,
    leftover: usize,
}

impl Candidate {
    /// The matched overload.
    pub fn command(&self) -> &Arc<Command> {
        &self.command
    }

    /// Number of tokens consumed by the command path.
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// Number of tokens left for parameters.
    pub fn leftover(&self) -> usize {
        self.leftover
    }
}

/// The result of [`resolve`].
#[derive(Debug)]
pub enum Resolution {
    /// A candidate bound every parameter.
    Bound {
        /// The selected overload.
        command: Arc<Command>,
        /// The command path as typed, pointing into the input.
        path: Path,
        /// The bound values.
        arguments: Arguments,
    },
    /// No command path matches the input.
    NotFound,
    /// At least one command matched by name but none bound.
    NoMatchingOverload {
        /// The longest matched command path.
        path: Path,
        /// How many candidates were tried.
        candidates: usize,
    },
}

/// Every command whose path is a prefix of `tokens`, in ranking order.
pub fn candidates(root: &StoreNode, tokens: &[Token]) -> Vec<Candidate> {
    let mut found = Vec::new();
    let mut node = root;
    for (depth, token) in tokens.iter().enumerate() {
        let Some(child) = node.child(&token.to_path()) else {
            break;
        };
        node = child;
        let matched = depth + 1;
        found.extend(node.commands().iter().map(|command| Candidate {
            command: command.clone(),
            matched,
            leftover: tokens.len() - matched,
        }));
        if !node.is_group() {
            break;
        }
    }

    found.sort_by_key(|c| {
        (
            Reverse(c.matched),
            Reverse(c.command.parameters().len()),
            Reverse(c.leftover),
        )
    });
    found
}

/// Bind `command`'s parameters to `leftover`.
///
/// Returns `None` when a required parameter has no token, a token does not
/// convert, or tokens remain after the last parameter.
pub fn bind(registry: &BinderRegistry, command: &Command, leftover: &[Token]) -> Option<Arguments> {
    let mut arguments = Arguments::new();
    let mut next = 0;

    for parameter in command.parameters() {
        let Some(token) = leftover.get(next) else {
            if parameter.is_optional() {
                continue;
            }
            return None;
        };

        let value = if parameter.is_remainder() {
            // everything from this token to the end of the raw input
            let source = token.path().source();
            let text = unescape(source[token.start()..].trim_end());
            next = leftover.len();
            registry.bind(parameter, &text)?
        } else {
            next += 1;
            registry.bind(parameter, &token.value())?
        };
        arguments.insert(parameter.name(), value);
    }

    (next == leftover.len()).then_some(arguments)
}

/// Rank and bind in one pass.
pub fn resolve(root: &StoreNode, registry: &BinderRegistry, tokens: &[Token]) -> Resolution {
    let candidates = candidates(root, tokens);
    let Some(deepest) = candidates.first() else {
        return Resolution::NotFound;
    };
    let longest = typed_path(tokens, deepest.matched);

    for candidate in &candidates {
        let leftover = &tokens[candidate.matched..];
        match bind(registry, &candidate.command, leftover) {
            Some(arguments) => {
                let path = typed_path(tokens, candidate.matched);
                trace!(path = %path, parameters = arguments.len(), "overload selected");
                return Resolution::Bound {
                    command: candidate.command.clone(),
                    path,
                    arguments,
                };
            }
            None => {
                trace!(
                    command = %candidate.command.name(),
                    leftover = leftover.len(),
                    "overload rejected"
                );
            }
        }
    }

    Resolution::NoMatchingOverload {
        path: longest,
        candidates: candidates.len(),
    }
}

fn typed_path(tokens: &[Token], matched: usize) -> Path {
    let matched = &tokens[..matched.min(tokens.len())];
    match matched {
        [] => Path::empty(),
        [first, .., last] if !matched.iter().any(Token::has_escapes) => {
            first.path().extend_to(last.path())
        }
        // escapes force fresh buffers; join every segment
        _ => matched
            .iter()
            .fold(Path::empty(), |acc, token| Path::combine(&acc, &token.to_path())),
    }
}
