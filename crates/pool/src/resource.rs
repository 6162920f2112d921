//! Capabilities the pool consumes.
//!
//! The pool never looks at what a resource does. It only needs to build one
//! ([`Factory::create`]), hand it a request ([`Resource::execute`]), ask
//! whether it is dead or stale, and kill it.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::time::Instant;

use crate::error::Result;

/// A reusable unit that executes one request at a time.
///
/// The pool guarantees at most one outstanding [`execute`](Self::execute)
/// call per resource, so implementations need no internal queueing.
pub trait Resource: Send + Sync + 'static {
    /// Identity stable for the resource's whole lifetime.
    type Id: Eq + Hash + Clone + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// The request type accepted by [`execute`](Self::execute).
    type Request: Send + 'static;
    /// The response type produced on success.
    type Response: Send + 'static;
    /// The resource's own failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Identity used for membership and idle-set lookups.
    fn id(&self) -> Self::Id;

    /// Run one request.
    ///
    /// Implementations should stamp [`last_action_time`](Self::last_action_time)
    /// at least once the work completes.
    fn execute(
        &self,
        request: Self::Request,
    ) -> impl Future<Output = std::result::Result<Self::Response, Self::Error>> + Send;

    /// `true` once the resource is permanently unusable. Never flips back.
    fn is_closed(&self) -> bool;

    /// When the resource last started or finished an action.
    fn last_action_time(&self) -> Instant;

    /// Forcibly terminate the resource. Must be idempotent.
    fn kill(&self);
}

/// Builds resources on demand. May be called from several tasks at once.
pub trait Factory: Send + Sync + 'static {
    /// The resource type this factory produces.
    type Resource: Resource;

    /// Name for this pool, used in errors, logs and events (e.g. "postgres").
    fn name(&self) -> &str {
        "pool"
    }

    /// Create a ready, non-closed resource.
    fn create(&self) -> impl Future<Output = Result<Self::Resource>> + Send;
}
