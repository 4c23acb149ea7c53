/*!
 * Pool Configuration
 *
 * Runtime configuration for the worker pool
 */

use crate::core::limits::{
    DEFAULT_THREAD_NAME_PREFIX, ENV_POOL_THREAD_PREFIX, ENV_POOL_WORKERS, FALLBACK_POOL_WORKERS,
};
use std::thread;
use tracing::warn;

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Worker threads are named "{prefix}-{index}"
    pub thread_name_prefix: String,
    /// Stack size per worker, platform default if `None`
    pub stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_POOL_WORKERS);
        Self::new(workers)
    }
}

impl PoolConfig {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
        }
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Defaults overridden by `SYNC_POOL_WORKERS` / `SYNC_POOL_THREAD_PREFIX`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(ENV_POOL_WORKERS) {
            match raw.trim().parse::<usize>() {
                Ok(workers) if workers > 0 => config.workers = workers,
                _ => warn!(value = %raw, "ignoring invalid {}", ENV_POOL_WORKERS),
            }
        }

        if let Ok(prefix) = std::env::var(ENV_POOL_THREAD_PREFIX) {
            if !prefix.is_empty() {
                config.thread_name_prefix = prefix;
            }
        }

        config
    }

    pub(crate) fn thread_name(&self, index: usize) -> String {
        format!("{}-{}", self.thread_name_prefix, index)
    }
}
