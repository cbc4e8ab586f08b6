//! Rayon thread pool configuration for batch battle resolution.
//!
//! Use [WorkerPool::install] to resolve many battles with a fixed number of threads, or rely on
//! Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to build worker pool with {workers} thread(s): {source}")]
pub struct PoolError {
    pub workers: usize,
    #[source]
    pub source: rayon::ThreadPoolBuildError,
}

/// Configures how many worker threads are used for parallel batch execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use the global Rayon pool.
    pub workers: usize,
}

impl WorkerPool {
    /// Use all available CPU cores (Rayon default).
    pub fn default_workers() -> Self {
        Self::default()
    }

    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure on a thread pool with this worker count. If [workers](WorkerPool::workers) is 0,
    /// runs on the global Rayon pool. Otherwise builds a temporary pool with that many threads.
    pub fn install<F, R>(&self, f: F) -> Result<R, PoolError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return Ok(f());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|source| PoolError {
                workers: self.workers,
                source,
            })?;
        Ok(pool.install(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_runs_closure_on_global_and_dedicated_pools() {
        assert_eq!(WorkerPool::default_workers().install(|| 2 + 2).unwrap(), 4);
        let threads = WorkerPool::with_workers(2)
            .install(rayon::current_num_threads)
            .unwrap();
        assert_eq!(threads, 2);
    }
}
