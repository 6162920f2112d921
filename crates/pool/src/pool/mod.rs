//! Resource pool: bounded acquisition, release and eviction.
//!
//! `Pool<F>` builds resources through a [`Factory`], lends each one to a
//! single request at a time and takes it back when the request finishes.
//! All bookkeeping lives in one `PoolState` behind one mutex; waiters park
//! on a `Notify` that is signalled whenever a resource or a creation slot
//! frees up.

pub mod config;
mod state;

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::events::{EventBus, EvictionReason, PoolEvent};
use crate::guard::{Guard, Release};
use crate::resource::{Factory, Resource};

pub use config::PoolConfig;
use state::{Commit, PoolState, Readmit, Slot};

type ResourceOf<F> = <F as Factory>::Resource;
type RequestOf<F> = <ResourceOf<F> as Resource>::Request;
type ResponseOf<F> = <ResourceOf<F> as Resource>::Response;

/// Pool statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Resources currently owned by the pool, idle or checked out.
    pub members: usize,
    /// Current number of idle resources.
    pub idle: usize,
    /// Current number of resources checked out.
    pub active: usize,
    /// Creations reserved but not finished yet.
    pub pending: usize,
    /// Callers currently parked waiting for a resource.
    pub waiters: usize,
    /// Total successful acquisitions.
    pub total_acquisitions: u64,
    /// Total resources handed back by callers.
    pub total_releases: u64,
    /// Total resources ever created.
    pub created: u64,
    /// Total resources removed from membership and killed.
    pub destroyed: u64,
    /// Factory calls that returned an error.
    pub create_failures: u64,
    /// Acquisitions that gave up (timeout or cancellation).
    pub timeouts: u64,
    /// Evictions because the resource reported itself closed.
    pub evicted_closed: u64,
    /// Evictions because the resource sat idle too long.
    pub evicted_idle: u64,
    /// Releases that found the idle set inconsistent.
    pub readmission_failures: u64,
}

/// Inner shared state for the pool.
struct PoolInner<F: Factory> {
    factory: F,
    config: PoolConfig,
    state: Mutex<PoolState<ResourceOf<F>>>,
    /// Signalled on release, eviction and abandoned creation.
    available: Notify,
    waiters: AtomicUsize,
    stats: Mutex<PoolStats>,
    events: EventBus,
}

/// Bounded pool of reusable resources.
///
/// Cloning is cheap and every clone drives the same pool.
pub struct Pool<F: Factory> {
    inner: Arc<PoolInner<F>>,
}

impl<F: Factory> Clone for Pool<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Factory> std::fmt::Debug for Pool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.name())
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<F: Factory> Pool<F> {
    /// Create an empty pool. Resources are created lazily on demand.
    ///
    /// `pool_size` is not applied here: call [`fill`](Self::fill) or use
    /// [`build`](Self::build) to pre-create that many resources.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if `config` is invalid.
    pub fn new(factory: F, config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let max = config.max_pool_size;
        Ok(Self {
            inner: Arc::new(PoolInner {
                factory,
                config,
                state: Mutex::new(PoolState::new(max)),
                available: Notify::new(),
                waiters: AtomicUsize::new(0),
                stats: Mutex::new(PoolStats::default()),
                events: EventBus::default(),
            }),
        })
    }

    /// Create a pool and eagerly fill it to `pool_size` idle resources.
    ///
    /// If the factory fails part-way, everything created so far is killed
    /// and the factory's error is returned.
    pub async fn build(factory: F, config: PoolConfig) -> Result<Self> {
        let pool = Self::new(factory, config)?;
        if let Err(err) = pool.fill().await {
            pool.shutdown();
            return Err(err);
        }
        Ok(pool)
    }

    /// Top membership up to `pool_size` with idle resources.
    ///
    /// Returns how many resources were created.
    pub async fn fill(&self) -> Result<usize> {
        let target = self.inner.config.pool_size;
        let mut created = 0;
        loop {
            let reserved = self.inner.state.lock().reserve(target);
            if !reserved {
                break;
            }
            self.create(true).await?;
            self.inner.available.notify_one();
            created += 1;
        }
        Ok(created)
    }

    /// Run `request` on a pooled resource.
    ///
    /// Acquires a resource (reusing an idle one, creating one below the
    /// ceiling, or waiting up to `acquire_timeout`), executes the request on
    /// it and re-admits it to the idle set whether or not the request
    /// succeeded.
    ///
    /// # Errors
    /// - [`Error::PoolExhausted`] when no resource frees up in time
    /// - [`Error::Initialization`] when creating a resource failed
    /// - [`Error::Execution`] when the resource reported a failure
    /// - [`Error::Closed`] after [`shutdown`](Self::shutdown)
    pub async fn execute(&self, request: RequestOf<F>) -> Result<ResponseOf<F>> {
        self.execute_inner(request, None).await
    }

    /// Like [`execute`](Self::execute), but a cancelled `cancel` token ends
    /// the wait for a resource with [`Error::PoolExhausted`].
    ///
    /// The token does not interrupt a request already dispatched.
    pub async fn execute_with_cancellation(
        &self,
        request: RequestOf<F>,
        cancel: &CancellationToken,
    ) -> Result<ResponseOf<F>> {
        self.execute_inner(request, Some(cancel)).await
    }

    async fn execute_inner(
        &self,
        request: RequestOf<F>,
        cancel: Option<&CancellationToken>,
    ) -> Result<ResponseOf<F>> {
        let guard = self.checkout_inner(cancel).await?;
        let resource: &ResourceOf<F> = &guard;
        let id = resource.id();
        let outcome = resource.execute(request).await;
        drop(guard);
        outcome.map_err(|err| Error::execution(self.name(), id.to_string(), err))
    }

    /// Check out a resource for exclusive use.
    ///
    /// The returned [`Guard`] re-admits the resource when dropped.
    pub async fn checkout(&self) -> Result<Guard<ResourceOf<F>>> {
        self.checkout_inner(None).await
    }

    /// Like [`checkout`](Self::checkout), with a cancellation token for the wait.
    pub async fn checkout_with_cancellation(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Guard<ResourceOf<F>>> {
        self.checkout_inner(Some(cancel)).await
    }

    async fn checkout_inner(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> Result<Guard<ResourceOf<F>>> {
        let resource = self.acquire(cancel).await?;
        self.inner.stats.lock().total_acquisitions += 1;
        tracing::debug!(pool = self.name(), resource_id = %resource.id(), "Acquired resource");
        self.emit(PoolEvent::Acquired {
            pool: self.name().to_string(),
            resource: resource.id().to_string(),
        });

        let pool = self.clone();
        Ok(Guard::new(resource, move |resource, release, held_for| {
            pool.release(resource, release, held_for);
        }))
    }

    /// Reuse an idle resource, create one, or wait. First success wins.
    async fn acquire(&self, cancel: Option<&CancellationToken>) -> Result<Arc<ResourceOf<F>>> {
        let inner = &*self.inner;
        let deadline = deadline_after(inner.config.acquire_timeout);
        let mut expired = false;

        loop {
            // Register interest before looking at the state so a release
            // between the check and the wait is not missed.
            let notified = inner.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let slot = inner.state.lock().try_take(inner.config.max_pool_size);
            match slot {
                Slot::Idle(resource) if resource.is_closed() => {
                    self.evict(&resource, EvictionReason::Closed);
                }
                Slot::Idle(resource) => return Ok(resource),
                Slot::Reserved => return self.create(false).await,
                Slot::Closed => return Err(self.closed()),
                Slot::Full if expired => return Err(self.exhausted()),
                Slot::Full => {
                    let _waiting = Waiting::enter(&inner.waiters);
                    tokio::select! {
                        () = &mut notified => {}
                        () = tokio::time::sleep_until(deadline) => expired = true,
                        () = cancelled(cancel) => return Err(self.exhausted()),
                    }
                }
            }
        }
    }

    /// Build a resource into a slot already reserved in the state.
    async fn create(&self, idle: bool) -> Result<Arc<ResourceOf<F>>> {
        let inner = &*self.inner;
        let reservation = Reservation {
            inner,
            armed: true,
        };

        let resource = match inner.factory.create().await {
            Ok(resource) => Arc::new(resource),
            Err(err) => {
                inner.stats.lock().create_failures += 1;
                tracing::warn!(pool = self.name(), error = %err, "Resource creation failed");
                return Err(err);
            }
        };

        match reservation.commit(&resource, idle) {
            Commit::Ok => {
                inner.stats.lock().created += 1;
                let members = inner.state.lock().members();
                tracing::debug!(
                    pool = self.name(),
                    resource_id = %resource.id(),
                    members,
                    "Created resource"
                );
                self.emit(PoolEvent::Created {
                    pool: self.name().to_string(),
                    resource: resource.id().to_string(),
                });
                Ok(resource)
            }
            Commit::Closed => {
                kill_quietly(self.name(), &*resource);
                inner.available.notify_one();
                Err(self.closed())
            }
            Commit::DuplicateId => {
                kill_quietly(self.name(), &*resource);
                inner.available.notify_one();
                let message = format!(
                    "factory returned resource '{}' which is already a member",
                    resource.id()
                );
                Err(Error::internal(self.name(), message))
            }
        }
    }

    /// Continuation run when a guard is dropped.
    fn release(&self, resource: Arc<ResourceOf<F>>, release: Release, usage: Duration) {
        let inner = &*self.inner;
        inner.stats.lock().total_releases += 1;

        if release == Release::Discard {
            self.evict(&resource, EvictionReason::Discarded);
            return;
        }
        if resource.is_closed() {
            self.evict(&resource, EvictionReason::Closed);
            return;
        }

        let outcome = inner.state.lock().readmit(Arc::clone(&resource));
        match outcome {
            Readmit::Idle => {
                inner.available.notify_one();
                tracing::debug!(
                    pool = self.name(),
                    resource_id = %resource.id(),
                    "Released resource"
                );
                self.emit(PoolEvent::Released {
                    pool: self.name().to_string(),
                    resource: resource.id().to_string(),
                    usage_duration: usage,
                });
            }
            Readmit::NotMember => {
                // Evicted while checked out; the eviction already counted it.
                kill_quietly(self.name(), &*resource);
                tracing::debug!(
                    pool = self.name(),
                    resource_id = %resource.id(),
                    "Released resource was already evicted"
                );
            }
            Readmit::Closed => self.retire(&resource, EvictionReason::Shutdown),
            Readmit::Rejected => {
                tracing::error!(
                    pool = self.name(),
                    resource_id = %resource.id(),
                    "Could not re-admit resource to the idle set, killing it"
                );
                self.retire(&resource, EvictionReason::ReadmissionFailed);
            }
        }
    }

    /// Evict closed resources and idle resources past `max_idle_time`.
    ///
    /// Meant to be called periodically by an external scheduler (see
    /// [`Maintainer`](crate::Maintainer)). Eligibility is decided on a
    /// snapshot taken before anything is removed; checked-out resources
    /// are only touched when they report themselves closed.
    pub fn maintenance(&self) {
        let inner = &*self.inner;
        let now = Instant::now();
        let max_idle = inner.config.max_idle_time;

        // Each resource's closed flag is read once; the idle queue is a
        // subset of membership, so idle entries reuse that reading.
        let (members, idle) = inner.state.lock().snapshot();
        let closed_ids: HashSet<_> = members
            .iter()
            .filter(|r| r.is_closed())
            .map(|r| r.id())
            .collect();
        let expired_ids: Vec<_> = idle
            .iter()
            .filter(|r| !closed_ids.contains(&r.id()))
            .filter(|r| now.saturating_duration_since(r.last_action_time()) > max_idle)
            .map(|r| r.id())
            .collect();

        let (closed, expired) = {
            let mut state = inner.state.lock();
            let closed: Vec<_> = closed_ids.iter().filter_map(|id| state.remove(id)).collect();
            let expired: Vec<_> = expired_ids
                .iter()
                .filter_map(|id| state.remove_idle(id))
                .collect();
            (closed, expired)
        };

        for resource in &closed {
            self.retire(resource, EvictionReason::Closed);
        }
        for resource in &expired {
            self.retire(resource, EvictionReason::IdleTimeout);
        }

        let (members, idle) = {
            let state = inner.state.lock();
            (state.members(), state.idle())
        };
        tracing::info!(
            pool = self.name(),
            members,
            idle,
            evicted_closed = closed.len(),
            evicted_idle = expired.len(),
            "Maintenance sweep finished"
        );
    }

    /// Kill every idle resource and refuse further acquisitions.
    ///
    /// Waiting callers fail with [`Error::Closed`]. Resources still checked
    /// out are killed when their holders release them.
    pub fn shutdown(&self) {
        let drained = self.inner.state.lock().close();
        for resource in &drained {
            self.retire(resource, EvictionReason::Shutdown);
        }
        self.inner.available.notify_waiters();
        tracing::info!(pool = self.name(), killed = drained.len(), "Pool shut down");
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let (members, idle, pending) = {
            let state = self.inner.state.lock();
            (state.members(), state.idle(), state.pending())
        };
        let mut stats = self.inner.stats.lock().clone();
        stats.members = members;
        stats.idle = idle;
        stats.active = members.saturating_sub(idle);
        stats.pending = pending;
        stats.waiters = self.waiters();
        stats
    }

    /// Callers currently waiting for a resource.
    #[must_use]
    pub fn waiters(&self) -> usize {
        self.inner.waiters.load(Ordering::Acquire)
    }

    /// The pool name reported by the factory.
    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.factory.name()
    }

    /// The configuration this pool was built with.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// `true` after [`shutdown`](Self::shutdown).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().is_closed()
    }

    /// Subscribe to this pool's lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: PoolEvent) {
        self.inner.events.emit(event);
    }

    /// Remove `resource` from both sets wherever it is, then kill it.
    fn evict(&self, resource: &Arc<ResourceOf<F>>, reason: EvictionReason) {
        let removed = self.inner.state.lock().remove(&resource.id()).is_some();
        if removed {
            self.retire(resource, reason);
        } else {
            kill_quietly(self.name(), &**resource);
        }
    }

    /// Kill a resource already taken out of membership and account for it.
    fn retire(&self, resource: &ResourceOf<F>, reason: EvictionReason) {
        kill_quietly(self.name(), resource);
        {
            let mut stats = self.inner.stats.lock();
            stats.destroyed += 1;
            match reason {
                EvictionReason::Closed => stats.evicted_closed += 1,
                EvictionReason::IdleTimeout => stats.evicted_idle += 1,
                EvictionReason::ReadmissionFailed => stats.readmission_failures += 1,
                EvictionReason::Discarded | EvictionReason::Shutdown => {}
            }
        }
        // A membership slot opened up.
        self.inner.available.notify_one();
        tracing::debug!(
            pool = self.name(),
            resource_id = %resource.id(),
            ?reason,
            "Evicted resource"
        );
        self.emit(PoolEvent::Evicted {
            pool: self.name().to_string(),
            resource: resource.id().to_string(),
            reason,
        });
    }

    fn exhausted(&self) -> Error {
        let members = self.inner.state.lock().members();
        let waiters = self.waiters();
        self.inner.stats.lock().timeouts += 1;
        tracing::warn!(
            pool = self.name(),
            members,
            waiters,
            timeout_ms = self.inner.config.acquire_timeout.as_millis() as u64,
            "Resource acquisition timed out"
        );
        self.emit(PoolEvent::Exhausted {
            pool: self.name().to_string(),
            waiters,
        });
        Error::pool_exhausted(self.name(), members, self.inner.config.max_pool_size, waiters)
    }

    fn closed(&self) -> Error {
        Error::Closed {
            pool: self.name().to_string(),
        }
    }
}

/// A creation slot held while the factory runs. Dropping it unused (failed
/// or cancelled creation) gives the slot back and wakes a waiter.
struct Reservation<'a, F: Factory> {
    inner: &'a PoolInner<F>,
    armed: bool,
}

impl<F: Factory> Reservation<'_, F> {
    fn commit(mut self, resource: &Arc<ResourceOf<F>>, idle: bool) -> Commit {
        self.armed = false;
        self.inner.state.lock().commit(resource, idle)
    }
}

impl<F: Factory> Drop for Reservation<'_, F> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.state.lock().abandon();
            self.inner.available.notify_one();
        }
    }
}

/// Counts a parked caller for as long as it is alive.
struct Waiting<'a>(&'a AtomicUsize);

impl<'a> Waiting<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// `now + timeout`, saturating to roughly thirty years out.
fn deadline_after(timeout: Duration) -> tokio::time::Instant {
    let now = tokio::time::Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Kill a resource, containing a panic so one bad resource cannot abort a
/// sweep or a release.
fn kill_quietly<R: Resource>(pool: &str, resource: &R) {
    if panic::catch_unwind(AssertUnwindSafe(|| resource.kill())).is_err() {
        tracing::error!(pool, resource_id = %resource.id(), "Resource panicked while being killed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFactory;

    fn config(pool_size: usize, max_pool_size: usize) -> PoolConfig {
        PoolConfig {
            pool_size,
            max_pool_size,
            max_idle_time: Duration::from_secs(60),
            acquire_timeout: Duration::from_millis(100),
        }
    }

    #[test]
    fn deadline_saturates_on_huge_timeout() {
        let now = tokio::time::Instant::now();
        let deadline = deadline_after(Duration::MAX);
        assert!(deadline > now + Duration::from_secs(86_400 * 365));
        assert!(deadline_after(Duration::from_millis(5)) >= now + Duration::from_millis(5));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let result = Pool::new(MockFactory::new(), config(3, 2));
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[tokio::test]
    async fn lazy_pool_creates_on_first_execute() {
        let factory = MockFactory::new();
        let pool = Pool::new(factory.clone(), config(0, 4)).unwrap();
        assert_eq!(pool.stats().members, 0);
        assert_eq!(factory.created(), 0);

        let response = pool.execute("ping".to_string()).await.unwrap();
        assert_eq!(response, "ping");

        let stats = pool.stats();
        assert_eq!(stats.members, 1);
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.created, 1);
    }

    #[tokio::test]
    async fn build_fills_to_pool_size() {
        let factory = MockFactory::new();
        let pool = Pool::build(factory.clone(), config(3, 5)).await.unwrap();
        let stats = pool.stats();
        assert_eq!(stats.members, 3);
        assert_eq!(stats.idle, 3);
        assert_eq!(factory.created(), 3);
        assert_eq!(pool.fill().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sequential_executes_reuse_one_resource() {
        let factory = MockFactory::new();
        let pool = Pool::new(factory.clone(), config(0, 4)).unwrap();
        for i in 0..5 {
            pool.execute(format!("req-{i}")).await.unwrap();
        }
        assert_eq!(factory.created(), 1);
        let stats = pool.stats();
        assert_eq!(stats.total_acquisitions, 5);
        assert_eq!(stats.total_releases, 5);
    }

    #[tokio::test]
    async fn idle_resources_are_reused_fifo() {
        let factory = MockFactory::new();
        let pool = Pool::build(factory.clone(), config(2, 2)).await.unwrap();
        let first = pool.checkout().await.unwrap();
        assert_eq!(first.id(), 1);
        drop(first);
        let second = pool.checkout().await.unwrap();
        assert_eq!(second.id(), 2, "resource 1 went to the back of the queue");
    }

    #[tokio::test]
    async fn failed_request_still_readmits() {
        let factory = MockFactory::new();
        let pool = Pool::new(factory.clone(), config(0, 1)).unwrap();
        let err = pool.execute("fail: boom".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::Execution { .. }));

        let stats = pool.stats();
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.destroyed, 0);
        assert!(pool.execute("again".to_string()).await.is_ok());
        assert_eq!(factory.created(), 1);
    }

    #[tokio::test]
    async fn discarded_guard_is_evicted() {
        let factory = MockFactory::new();
        let pool = Pool::new(factory.clone(), config(0, 1)).unwrap();
        let guard = pool.checkout().await.unwrap();
        guard.discard();

        let stats = pool.stats();
        assert_eq!(stats.members, 0);
        assert_eq!(stats.destroyed, 1);
        assert_eq!(factory.handle(1).unwrap().kills(), 1);
    }

    #[tokio::test]
    async fn closed_resource_is_not_readmitted() {
        let factory = MockFactory::new();
        let pool = Pool::new(factory.clone(), config(0, 1)).unwrap();
        let guard = pool.checkout().await.unwrap();
        factory.handle(1).unwrap().close();
        drop(guard);

        let stats = pool.stats();
        assert_eq!(stats.members, 0);
        assert_eq!(stats.evicted_closed, 1);
    }

    #[tokio::test]
    async fn closed_idle_resource_is_skipped_on_acquire() {
        let factory = MockFactory::new();
        let pool = Pool::build(factory.clone(), config(1, 1)).await.unwrap();
        factory.handle(1).unwrap().close();

        let guard = pool.checkout().await.unwrap();
        assert_eq!(guard.id(), 2);
        assert_eq!(pool.stats().evicted_closed, 1);
    }

    #[tokio::test]
    async fn shutdown_kills_idle_and_refuses_work() {
        let factory = MockFactory::new();
        let pool = Pool::build(factory.clone(), config(2, 2)).await.unwrap();
        let held = pool.checkout().await.unwrap();

        pool.shutdown();
        assert!(pool.is_closed());
        assert_eq!(factory.handle(2).unwrap().kills(), 1);
        assert!(matches!(pool.execute("x".to_string()).await, Err(Error::Closed { .. })));

        drop(held);
        assert_eq!(factory.handle(1).unwrap().kills(), 1);
        assert_eq!(pool.stats().members, 0);
    }

    #[tokio::test]
    async fn release_wakes_waiter() {
        let factory = MockFactory::new();
        let pool = Pool::new(
            factory,
            PoolConfig {
                acquire_timeout: Duration::from_secs(5),
                ..config(0, 1)
            },
        )
        .unwrap();
        let held = pool.checkout().await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.execute("later".to_string()).await })
        };
        while pool.waiters() == 0 {
            tokio::task::yield_now().await;
        }
        drop(held);

        let response = waiter.await.unwrap().unwrap();
        assert_eq!(response, "later");
        assert_eq!(pool.stats().waiters, 0);
    }
}
