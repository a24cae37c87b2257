//! Scoped worker pool for parallel, bounded fan-out work.
//!
//! The pool is used for one-shot parallel phases (such as decoding every
//! image of a scene) where each task writes to its own pre-sized output
//! slot and the caller needs a single join barrier before continuing.
//!
//! # Example
//!
//! ```
//! use auriga_core::pool::WorkerPool;
//!
//! let pool = WorkerPool::with_hardware_concurrency();
//!
//! let mut results = vec![0u32; 4];
//! pool.scope(|s| {
//!     for (i, slot) in results.iter_mut().enumerate() {
//!         s.spawn(move || {
//!             *slot = (i as u32) * 10;
//!         });
//!     }
//! });
//! assert_eq!(results, vec![0, 10, 20, 30]);
//! ```

/// A worker pool for scoped parallel execution.
///
/// Backed by `std::thread::scope`: every task spawned inside [`scope`]
/// completes before the call returns, and tasks may borrow local data.
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Creates a pool that will use the given number of workers.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Creates a pool sized to the number of available CPU cores.
    pub fn with_hardware_concurrency() -> Self {
        Self::new(std::thread::available_parallelism().map_or(1, |n| n.get()))
    }

    /// Number of workers callers should fan out over.
    ///
    /// Callers partition their work into at most this many disjoint chunks
    /// and spawn one task per chunk.
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Chunk size that spreads `len` items over the pool's workers.
    pub fn chunk_size(&self, len: usize) -> usize {
        len.div_ceil(self.workers).max(1)
    }

    /// Executes tasks within a scoped context.
    ///
    /// All tasks spawned within the closure complete before this method
    /// returns; this is the join barrier between a parallel phase and the
    /// sequential work that follows it.
    pub fn scope<'env, F>(&self, f: F)
    where
        F: for<'scope> FnOnce(&PoolScope<'scope, 'env>),
    {
        std::thread::scope(|s| {
            let scope = PoolScope { inner: s };
            f(&scope);
        });
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::with_hardware_concurrency()
    }
}

/// A scope for spawning tasks that must complete before the scope exits.
pub struct PoolScope<'scope, 'env: 'scope> {
    inner: &'scope std::thread::Scope<'scope, 'env>,
}

impl<'scope, 'env> PoolScope<'scope, 'env> {
    /// Spawns a task within this scope.
    pub fn spawn<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'scope,
    {
        self.inner.spawn(f);
    }
}
