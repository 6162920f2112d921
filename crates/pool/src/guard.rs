//! RAII guard for checked-out resources

use std::sync::Arc;
use std::time::{Duration, Instant};

/// What the pool should do with a resource coming back from a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Release {
    /// Put it back in the idle set.
    Readmit,
    /// Evict and kill it.
    Discard,
}

/// Receives the resource, the holder's verdict and how long it was held.
type OnDrop<R> = Box<dyn FnOnce(Arc<R>, Release, Duration) + Send + Sync>;

/// Exclusive hold on a checked-out resource.
///
/// Dropping the guard hands the resource back to the pool, which makes
/// release run even when the future holding the guard is cancelled.
/// Use [`discard`](Self::discard) when the caller knows the resource is
/// broken and it should not be reused.
pub struct Guard<R> {
    resource: Option<Arc<R>>,
    on_drop: Option<OnDrop<R>>,
    acquired_at: Instant,
}

impl<R> Guard<R> {
    pub(crate) fn new<F>(resource: Arc<R>, on_drop: F) -> Self
    where
        F: FnOnce(Arc<R>, Release, Duration) + Send + Sync + 'static,
    {
        Self {
            resource: Some(resource),
            on_drop: Some(Box::new(on_drop)),
            acquired_at: Instant::now(),
        }
    }

    /// How long this guard has held the resource.
    #[must_use]
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }

    /// Give the resource back for eviction instead of reuse.
    pub fn discard(mut self) {
        self.finish(Release::Discard);
    }

    fn finish(&mut self, release: Release) {
        if let (Some(resource), Some(on_drop)) = (self.resource.take(), self.on_drop.take()) {
            on_drop(resource, release, self.acquired_at.elapsed());
        }
    }
}

impl<R> std::ops::Deref for Guard<R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.resource
            .as_deref()
            .expect("guard resource is present until drop")
    }
}

impl<R> Drop for Guard<R> {
    fn drop(&mut self) {
        self.finish(Release::Readmit);
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for Guard<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("resource", &self.resource)
            .field("held_for", &self.held_for())
            .finish()
    }
}
