//! Periodic driver for [`Pool::maintenance`].
//!
//! The pool never schedules its own sweeps. `Maintainer` is one way to do
//! it from a tokio task; any other timer calling `maintenance()` works too.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::pool::Pool;
use crate::resource::Factory;

/// Background task that sweeps a pool every `interval`.
pub struct Maintainer {
    interval: Duration,
    cancel: CancellationToken,
}

impl Maintainer {
    /// Create a maintainer that stops once `cancel` is cancelled.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if `interval` is zero.
    pub fn new(interval: Duration, cancel: CancellationToken) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::configuration("maintenance interval must be greater than zero"));
        }
        Ok(Self { interval, cancel })
    }

    /// Spawn the sweep loop for `pool`.
    ///
    /// The first sweep runs one `interval` after spawning. The returned
    /// handle resolves once the task has exited after
    /// [`shutdown`](Self::shutdown).
    pub fn start<F: Factory>(&self, pool: Pool<F>) -> tokio::task::JoinHandle<()> {
        let interval = self.interval;
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(interval) => {}
                    () = cancel.cancelled() => break,
                }
                if pool.is_closed() {
                    break;
                }
                pool.maintenance();
            }
            tracing::debug!(pool = pool.name(), "Maintenance task stopped");
        })
    }

    /// Cancel the background task.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Maintainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Maintainer")
            .field("interval", &self.interval)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
