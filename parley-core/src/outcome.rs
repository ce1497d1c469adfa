//! The value every dispatched request resolves to.

use crate::{error::InvokeError, path::Path, reply::Reply};

/// How a request ended.
///
/// Everything except a lexical error is reported through this type; the
/// dispatcher never lets a handler fault escape.
#[derive(Debug)]
pub enum Outcome {
    /// The handler ran and produced a reply.
    Completed(Reply),
    /// No command path matches the input.
    NotFound,
    /// A command name matched, but no overload accepted the arguments.
    NoMatchingOverload {
        /// The longest matched command path.
        path: Path,
        /// How many overloads were tried.
        candidates: usize,
    },
    /// The handler or a middleware stage faulted.
    Failed {
        /// The resolved command path.
        path: Path,
        /// The fault.
        error: InvokeError,
    },
    /// Cancellation was observed.
    Cancelled,
}

impl Outcome {
    /// Whether the request completed with a successful reply.
    pub fn is_success(&self) -> bool {
        match self {
            Outcome::Completed(reply) => reply.is_success(),
            _ => false,
        }
    }

    /// Whether the request was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    /// The reply of a completed request.
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Outcome::Completed(reply) => Some(reply),
            _ => None,
        }
    }

    /// Convert the result of running a pipeline.
    ///
    /// Cancellation is kept apart from failure.
    pub fn from_result(path: &Path, result: Result<Reply, InvokeError>) -> Self {
        match result {
            Ok(reply) => Outcome::Completed(reply),
            Err(InvokeError::Cancelled) => Outcome::Cancelled,
            Err(error) => Outcome::Failed {
                path: path.clone(),
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result() {
        let path = Path::new("ping");
        assert!(Outcome::from_result(&path, Ok(Reply::empty())).is_success());
        assert!(!Outcome::from_result(&path, Ok(Reply::failure("no"))).is_success());
        assert!(Outcome::from_result(&path, Err(InvokeError::Cancelled)).is_cancelled());
        assert!(matches!(
            Outcome::from_result(&path, Err(InvokeError::Unbound)),
            Outcome::Failed { .. }
        ));
        assert!(!Outcome::NotFound.is_success());
    }
}
