//! Context pooling.
//!
//! A [`PooledContext`] owns its [`CommandContext`] exclusively for one
//! request. Dropping it resets the context and hands it back, so a context
//! is never active on two requests and never carries state between them.

use parking_lot::Mutex;
use parley_core::CommandContext;
use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::Arc,
};

/// A free list of idle contexts.
pub struct ContextPool {
    idle: Mutex<Vec<CommandContext>>,
    capacity: usize,
}

impl ContextPool {
    /// Idle contexts kept by default.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// A pool keeping at most `capacity` idle contexts.
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity.min(Self::DEFAULT_CAPACITY))),
            capacity,
        }
    }

    /// Take an idle context, or create one when the pool is empty.
    pub fn acquire(self: &Arc<Self>) -> PooledContext {
        let context = self.idle.lock().pop().unwrap_or_default();
        PooledContext {
            context,
            pool: self.clone(),
        }
    }

    /// Number of idle contexts.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Maximum number of idle contexts kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn release(&self, mut context: CommandContext) {
        context.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(context);
        }
    }
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for ContextPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextPool")
            .field("idle", &self.idle())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// A context on loan from a [`ContextPool`].
pub struct PooledContext {
    context: CommandContext,
    pool: Arc<ContextPool>,
}

impl Deref for PooledContext {
    type Target = CommandContext;

    fn deref(&self) -> &CommandContext {
        &self.context
    }
}

impl DerefMut for PooledContext {
    fn deref_mut(&mut self) -> &mut CommandContext {
        &mut self.context
    }
}

impl Drop for PooledContext {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.context));
    }
}

impl fmt::Debug for PooledContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.context.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::ContextState;

    #[test]
    fn test_released_contexts_are_reset() {
        let pool = Arc::new(ContextPool::new(4));
        {
            let mut ctx = pool.acquire();
            ctx.set_input(Arc::from("ping"));
            ctx.items_mut().insert(42u32);
            ctx.begin();
        }
        assert_eq!(pool.idle(), 1);

        let ctx = pool.acquire();
        assert_eq!(pool.idle(), 0);
        assert!(ctx.input().is_none());
        assert!(ctx.items().is_empty());
        assert_eq!(ctx.state(), ContextState::Idle);
    }

    #[test]
    fn test_capacity_bounds_idle_list() {
        let pool = Arc::new(ContextPool::new(1));
        let a = pool.acquire();
        let b = pool.acquire();
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);

        let none = Arc::new(ContextPool::new(0));
        drop(none.acquire());
        assert_eq!(none.idle(), 0);
    }
}
