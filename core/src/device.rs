//! Device
//!
//! Kernel launches run over the `rayon` thread pool. A launch executes one
//! closure per lane and returns the lane outputs in lane order; the first
//! lane error aborts the launch.

use crate::error::*;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Executes kernels over the current `rayon` thread pool.
#[derive(Debug, Default)]
pub struct Device {
    /// Number of launches since the last synchronization.
    pending: AtomicUsize,

    /// Total number of launches.
    launched: AtomicUsize,
}

impl Device {
    /// Create a new `Device`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `kernel` over `n` lanes and gathers each lane's output.
    ///
    /// * `name`   - Kernel name used in logs and errors.
    /// * `n`      - Number of lanes.
    /// * `kernel` - Lane function called with the lane index.
    pub fn launch<T, F>(&self, name: &str, n: usize, kernel: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync + Send,
    {
        trace!("Launching kernel '{}' over {} lanes", name, n);
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.launched.fetch_add(1, Ordering::Relaxed);

        (0..n)
            .into_par_iter()
            .map(kernel)
            .collect::<Result<Vec<T>>>()
            .map_err(|source| Error::KernelLaunch {
                kernel: name.to_string(),
                source: Box::new(source),
            })
    }

    /// Runs `kernel` over `n` lanes that produce no output.
    ///
    /// * `name`   - Kernel name used in logs and errors.
    /// * `n`      - Number of lanes.
    /// * `kernel` - Lane function called with the lane index.
    pub fn launch_for_each<F>(&self, name: &str, n: usize, kernel: F) -> Result<()>
    where
        F: Fn(usize) -> Result<()> + Sync + Send,
    {
        trace!("Launching kernel '{}' over {} lanes", name, n);
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.launched.fetch_add(1, Ordering::Relaxed);

        (0..n)
            .into_par_iter()
            .try_for_each(kernel)
            .map_err(|source| Error::KernelLaunch {
                kernel: name.to_string(),
                source: Box::new(source),
            })
    }

    /// Waits for all queued launches. Launches complete before `launch`
    /// returns, so this only drains the pending counter.
    pub fn synchronize(&self) {
        let pending = self.pending.swap(0, Ordering::AcqRel);
        debug!("Synchronized device after {} launches", pending);
    }

    /// Returns the total number of launches.
    pub fn launch_count(&self) -> usize {
        self.launched.load(Ordering::Acquire)
    }
}
