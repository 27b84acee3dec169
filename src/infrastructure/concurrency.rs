//! Thread pool setup for the parallel parts of the analysis.

use anyhow::{Context, Result};
use tracing::info;

/// Worker count used when none is configured: half the cores, minimum 1.
pub fn default_workers() -> usize {
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Initialize the global rayon thread pool.
/// Fails if the pool was already initialized.
pub fn init_thread_pool(threads: Option<usize>) -> Result<usize> {
    let workers = threads.unwrap_or_else(default_workers).max(1);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .context("Failed to initialize thread pool")?;

    info!(workers, cores = num_cpus::get(), "initialized thread pool");

    Ok(workers)
}
