//! Request-scoped service access.
//!
//! Dependency wiring lives outside Parley. The dispatcher only asks a
//! [`ScopeFactory`] for a fresh [`Services`] scope per request, attaches it to
//! the context, and drops it when the context is reset.

use crate::extensions::Extensions;
use std::{fmt, sync::Arc};

/// A read-only, cheaply cloned set of services for one request.
#[derive(Clone, Default)]
pub struct Services {
    inner: Arc<Extensions>,
}

impl Services {
    /// Wrap a populated map.
    pub fn new(services: Extensions) -> Self {
        Self {
            inner: Arc::new(services),
        }
    }

    /// Borrow the service of type `T`.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.inner.get::<T>()
    }

    /// Whether no service is available.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("len", &self.inner.len())
            .finish()
    }
}

/// Creates one [`Services`] scope per request.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `ScopeFactory`",
    label = "missing `ScopeFactory` implementation",
    note = "Implement `create_scope`, or pass a `Fn() -> Services` closure."
)]
pub trait ScopeFactory: Send + Sync + 'static {
    /// Open a new scope.
    fn create_scope(&self) -> Services;
}

impl<F> ScopeFactory for F
where
    F: Fn() -> Services + Send + Sync + 'static,
{
    fn create_scope(&self) -> Services {
        (self)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Database(&'static str);

    #[test]
    fn test_factory_creates_scopes() {
        let factory = || {
            let mut ext = Extensions::new();
            ext.insert(Database("primary"));
            Services::new(ext)
        };
        let scope = factory.create_scope();
        assert_eq!(scope.get::<Database>().map(|db| db.0), Some("primary"));
        assert!(Services::default().is_empty());
    }
}
