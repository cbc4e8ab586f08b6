//! Runtime settings read from `BROADSIDE_*` environment variables.

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::data::{RegistryError, UnitRegistry};
use crate::parallel::WorkerPool;

pub const BIND_VAR: &str = "BROADSIDE_BIND";
pub const UNITS_VAR: &str = "BROADSIDE_UNITS";
pub const WORKERS_VAR: &str = "BROADSIDE_WORKERS";
pub const LOG_VAR: &str = "BROADSIDE_LOG";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_LOG_FILTER: &str = "broadside=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    /// Unit catalog file; the built-in catalog is used when unset.
    pub units_path: Option<PathBuf>,
    /// 0 = Rayon default.
    pub workers: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            units_path: None,
            workers: 0,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let workers = match get(WORKERS_VAR) {
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid {WORKERS_VAR}, defaulting to {}", defaults.workers);
                defaults.workers
            }),
            None => defaults.workers,
        };

        Self {
            bind_addr: get(BIND_VAR).unwrap_or(defaults.bind_addr),
            units_path: get(UNITS_VAR).map(PathBuf::from),
            workers,
            log_filter: get(LOG_VAR).unwrap_or(defaults.log_filter),
        }
    }

    pub fn load_registry(&self) -> Result<UnitRegistry, RegistryError> {
        match &self.units_path {
            Some(path) => UnitRegistry::load(path),
            None => Ok(UnitRegistry::builtin()),
        }
    }

    pub fn worker_pool(&self) -> WorkerPool {
        WorkerPool::with_workers(self.workers)
    }
}
