//! Testing utilities: an in-memory resource and factory.
//!
//! [`MockResource`] echoes its request back after an optional latency, or
//! fails when the request starts with `"fail:"`. [`MockFactory`] keeps a
//! [`MockHandle`] to every resource it built so tests can close, age or
//! inspect resources the pool owns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::resource::{Factory, Resource};

/// Error returned by [`MockResource`] for `"fail:"` requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("mock execution failed: {0}")]
pub struct MockError(pub String);

struct MockState {
    id: u64,
    closed: AtomicBool,
    kills: AtomicUsize,
    executions: AtomicUsize,
    busy: AtomicBool,
    last_action: Mutex<Instant>,
}

impl MockState {
    fn touch(&self) {
        *self.last_action.lock() = Instant::now();
    }
}

/// Counters shared by every resource of one factory.
#[derive(Default)]
struct Shared {
    overlaps: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Marks a resource busy for one request, even if the request future is
/// dropped half way.
struct Busy<'a> {
    state: &'a MockState,
    shared: &'a Shared,
}

impl<'a> Busy<'a> {
    fn enter(state: &'a MockState, shared: &'a Shared) -> Self {
        if state.busy.swap(true, Ordering::SeqCst) {
            shared.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let running = shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        shared.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        Self { state, shared }
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.state.busy.store(false, Ordering::SeqCst);
    }
}

/// Outside view of a resource built by [`MockFactory`].
#[derive(Clone)]
pub struct MockHandle(Arc<MockState>);

impl MockHandle {
    /// The resource identity.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Mark the resource dead, as if its connection dropped.
    pub fn close(&self) {
        self.0.closed.store(true, Ordering::SeqCst);
    }

    /// Whether the resource reports itself closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.closed.load(Ordering::SeqCst)
    }

    /// How many times `kill` was called.
    #[must_use]
    pub fn kills(&self) -> usize {
        self.0.kills.load(Ordering::SeqCst)
    }

    /// How many requests the resource ran.
    #[must_use]
    pub fn executions(&self) -> usize {
        self.0.executions.load(Ordering::SeqCst)
    }

    /// Pretend the last action happened `age` ago.
    pub fn age_by(&self, age: Duration) {
        let now = Instant::now();
        *self.0.last_action.lock() = now.checked_sub(age).unwrap_or(now);
    }
}

impl std::fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHandle")
            .field("id", &self.id())
            .field("closed", &self.is_closed())
            .field("kills", &self.kills())
            .finish()
    }
}

/// Echo resource built by [`MockFactory`].
pub struct MockResource {
    state: Arc<MockState>,
    latency: Duration,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for MockResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockResource")
            .field("id", &self.state.id)
            .field("latency", &self.latency)
            .finish()
    }
}

impl Resource for MockResource {
    type Id = u64;
    type Request = String;
    type Response = String;
    type Error = MockError;

    fn id(&self) -> u64 {
        self.state.id
    }

    async fn execute(&self, request: String) -> std::result::Result<String, MockError> {
        let busy = Busy::enter(&self.state, &self.shared);
        self.state.executions.fetch_add(1, Ordering::SeqCst);
        self.state.touch();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.state.touch();
        drop(busy);

        match request.strip_prefix("fail:") {
            Some(reason) => Err(MockError(reason.trim().to_string())),
            None => Ok(request),
        }
    }

    fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    fn last_action_time(&self) -> Instant {
        *self.state.last_action.lock()
    }

    fn kill(&self) {
        self.state.kills.fetch_add(1, Ordering::SeqCst);
        self.state.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
struct Settings {
    latency: Duration,
    create_latency: Duration,
}

struct FactoryInner {
    name: String,
    next_id: AtomicU64,
    fail_creates: AtomicUsize,
    settings: Mutex<Settings>,
    handles: Mutex<Vec<MockHandle>>,
    shared: Arc<Shared>,
}

/// Factory for [`MockResource`]s. Clones share state, so a test can keep
/// one clone after moving another into a pool.
#[derive(Clone)]
pub struct MockFactory {
    inner: Arc<FactoryInner>,
}

impl MockFactory {
    /// Factory named `"mock"` with instant resources.
    #[must_use]
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Factory reporting `name` as the pool name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                name: name.into(),
                next_id: AtomicU64::new(1),
                fail_creates: AtomicUsize::new(0),
                settings: Mutex::new(Settings::default()),
                handles: Mutex::new(Vec::new()),
                shared: Arc::new(Shared::default()),
            }),
        }
    }

    /// Every request sleeps for `latency` before answering.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.inner.settings.lock().latency = latency;
        self
    }

    /// Every `create` sleeps for `latency` first.
    #[must_use]
    pub fn with_create_latency(self, latency: Duration) -> Self {
        self.inner.settings.lock().create_latency = latency;
        self
    }

    /// Make the next `count` calls to `create` fail.
    pub fn fail_next(&self, count: usize) {
        self.inner.fail_creates.store(count, Ordering::SeqCst);
    }

    /// Resources created successfully so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.inner.handles.lock().len()
    }

    /// Handle to the resource with identity `id`.
    #[must_use]
    pub fn handle(&self, id: u64) -> Option<MockHandle> {
        self.inner.handles.lock().iter().find(|h| h.id() == id).cloned()
    }

    /// Handles to every resource created so far, in creation order.
    #[must_use]
    pub fn handles(&self) -> Vec<MockHandle> {
        self.inner.handles.lock().clone()
    }

    /// Times a resource started a request while already running one.
    #[must_use]
    pub fn overlaps(&self) -> usize {
        self.inner.shared.overlaps.load(Ordering::SeqCst)
    }

    /// Highest number of requests running at once across all resources.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.inner.shared.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFactory")
            .field("name", &self.inner.name)
            .field("created", &self.created())
            .finish()
    }
}

impl Factory for MockFactory {
    type Resource = MockResource;

    fn name(&self) -> &str {
        &self.inner.name
    }

    async fn create(&self) -> Result<MockResource> {
        let settings = self.inner.settings.lock().clone();
        if !settings.create_latency.is_zero() {
            tokio::time::sleep(settings.create_latency).await;
        }

        let injected = self
            .inner
            .fail_creates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(Error::initialization(self.name(), "injected factory failure"));
        }

        let state = Arc::new(MockState {
            id: self.inner.next_id.fetch_add(1, Ordering::SeqCst),
            closed: AtomicBool::new(false),
            kills: AtomicUsize::new(0),
            executions: AtomicUsize::new(0),
            busy: AtomicBool::new(false),
            last_action: Mutex::new(Instant::now()),
        });
        self.inner.handles.lock().push(MockHandle(Arc::clone(&state)));

        Ok(MockResource {
            state,
            latency: settings.latency,
            shared: Arc::clone(&self.inner.shared),
        })
    }
}
