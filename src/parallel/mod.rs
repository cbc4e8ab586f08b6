pub mod batch;
pub mod pool;
pub mod sweep;

pub use batch::resolve_batch;
pub use pool::{PoolError, WorkerPool};
pub use sweep::{
    check_run_count, derive_seed, sweep_seeds, SweepError, SweepSummary, DEFAULT_SWEEP_RUNS,
    MAX_SWEEP_RUNS,
};
