//! Event broadcasting for pool lifecycle observability.
//!
//! Provides [`PoolEvent`] variants emitted as resources move through the
//! pool and an [`EventBus`] backed by `tokio::sync::broadcast`.

use std::time::Duration;

use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PoolEvent
// ---------------------------------------------------------------------------

/// Events emitted by a pool.
///
/// Every variant carries the pool name and, where one is involved, the
/// display form of the resource identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    /// The factory built a new resource and it joined membership.
    Created {
        /// The pool name.
        pool: String,
        /// The new resource.
        resource: String,
    },
    /// A resource was checked out.
    Acquired {
        /// The pool name.
        pool: String,
        /// The checked-out resource.
        resource: String,
    },
    /// A resource returned to the idle set.
    Released {
        /// The pool name.
        pool: String,
        /// The released resource.
        resource: String,
        /// How long the resource was checked out.
        usage_duration: Duration,
    },
    /// An acquisition gave up: timeout, cancellation, or shutdown.
    Exhausted {
        /// The pool name.
        pool: String,
        /// Callers still waiting when this one gave up.
        waiters: usize,
    },
    /// A resource was removed from membership and killed.
    Evicted {
        /// The pool name.
        pool: String,
        /// The evicted resource.
        resource: String,
        /// Why it was evicted.
        reason: EvictionReason,
    },
}

// ---------------------------------------------------------------------------
// EvictionReason
// ---------------------------------------------------------------------------

/// Reason a resource was permanently removed from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The resource reported itself closed.
    Closed,
    /// The resource sat idle longer than `max_idle_time`.
    IdleTimeout,
    /// Re-admission found the idle set already holding its identity.
    ReadmissionFailed,
    /// The holder discarded it instead of releasing it.
    Discarded,
    /// The pool is shutting down.
    Shutdown,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Broadcast-based event bus for pool events.
///
/// Emission is fire-and-forget: if no subscribers are listening or the
/// channel is full, events are silently dropped.
pub struct EventBus {
    sender: broadcast::Sender<PoolEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer size.
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self { sender }
    }

    /// Emit an event to all current subscribers.
    pub fn emit(&self, event: PoolEvent) {
        // No receivers is not an error for the emitter.
        let _ = self.sender.send(event);
    }

    /// Subscribe to events emitted after this call.
    ///
    /// A subscriber that falls more than `buffer_size` events behind gets a
    /// `Lagged` error and skips ahead.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.sender.receiver_count())
            .finish()
    }
}
