//! Membership and idle bookkeeping.
//!
//! `PoolState` is never shared directly: the pool keeps it behind a single
//! mutex, so every method here is one linearizable step. The idle queue only
//! ever holds members; anything leaving membership leaves the queue in the
//! same step.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::resource::Resource;

/// Outcome of one acquisition attempt.
pub(crate) enum Slot<R> {
    /// An idle resource, now checked out.
    Idle(Arc<R>),
    /// A creation slot was reserved; the caller must build a resource and
    /// `commit` or `abandon` it.
    Reserved,
    /// Membership plus reservations already sit at the ceiling.
    Full,
    /// The pool is shut down.
    Closed,
}

/// Outcome of handing a checked-out resource back.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Readmit {
    /// Back in the idle queue.
    Idle,
    /// No longer a member (evicted while checked out); nothing changed.
    NotMember,
    /// The idle queue already held this identity. The resource was dropped
    /// from both sets.
    Rejected,
    /// The pool is shut down; the resource was dropped from membership.
    Closed,
}

/// Why a reserved creation could not be committed.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Commit {
    Ok,
    Closed,
    DuplicateId,
}

pub(crate) struct PoolState<R: Resource> {
    members: HashMap<R::Id, Arc<R>>,
    idle: VecDeque<Arc<R>>,
    pending: usize,
    closed: bool,
}

impl<R: Resource> PoolState<R> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            members: HashMap::with_capacity(capacity),
            idle: VecDeque::with_capacity(capacity),
            pending: 0,
            closed: false,
        }
    }

    /// Pop the oldest idle resource, or reserve a creation slot if
    /// membership plus in-flight creations is below `max`.
    pub(crate) fn try_take(&mut self, max: usize) -> Slot<R> {
        if self.closed {
            return Slot::Closed;
        }
        if let Some(resource) = self.idle.pop_front() {
            return Slot::Idle(resource);
        }
        if self.reserve(max) {
            Slot::Reserved
        } else {
            Slot::Full
        }
    }

    /// Reserve a creation slot without touching the idle queue.
    pub(crate) fn reserve(&mut self, limit: usize) -> bool {
        if self.closed || self.members.len() + self.pending >= limit {
            return false;
        }
        self.pending += 1;
        true
    }

    /// Turn a reservation into membership. `idle` also queues the resource.
    pub(crate) fn commit(&mut self, resource: &Arc<R>, idle: bool) -> Commit {
        self.pending = self.pending.saturating_sub(1);
        if self.closed {
            return Commit::Closed;
        }
        let id = resource.id();
        if self.members.contains_key(&id) {
            return Commit::DuplicateId;
        }
        self.members.insert(id, Arc::clone(resource));
        if idle {
            self.idle.push_back(Arc::clone(resource));
        }
        Commit::Ok
    }

    /// Give back a reservation whose creation failed.
    pub(crate) fn abandon(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    pub(crate) fn readmit(&mut self, resource: Arc<R>) -> Readmit {
        let id = resource.id();
        if !self.members.contains_key(&id) {
            return Readmit::NotMember;
        }
        if self.closed {
            self.members.remove(&id);
            return Readmit::Closed;
        }
        if self.idle.iter().any(|r| r.id() == id) {
            self.remove(&id);
            return Readmit::Rejected;
        }
        self.idle.push_back(resource);
        Readmit::Idle
    }

    /// Drop a resource from both sets, wherever it currently is.
    pub(crate) fn remove(&mut self, id: &R::Id) -> Option<Arc<R>> {
        self.idle.retain(|r| r.id() != *id);
        self.members.remove(id)
    }

    /// Drop a resource only if it is still idle. A resource checked out
    /// since the caller looked is left alone.
    pub(crate) fn remove_idle(&mut self, id: &R::Id) -> Option<Arc<R>> {
        let position = self.idle.iter().position(|r| r.id() == *id)?;
        self.idle.remove(position);
        self.members.remove(id)
    }

    /// Close the pool and hand back every idle resource, removed from
    /// membership. Checked-out members stay until they are released.
    pub(crate) fn close(&mut self) -> Vec<Arc<R>> {
        self.closed = true;
        let drained: Vec<_> = self.idle.drain(..).collect();
        for resource in &drained {
            self.members.remove(&resource.id());
        }
        drained
    }

    /// Copy of `(members, idle)` for evaluation outside the lock.
    pub(crate) fn snapshot(&self) -> (Vec<Arc<R>>, Vec<Arc<R>>) {
        (
            self.members.values().cloned().collect(),
            self.idle.iter().cloned().collect(),
        )
    }

    pub(crate) fn members(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn idle(&self) -> usize {
        self.idle.len()
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self, id: &R::Id) -> bool {
        self.idle.iter().any(|r| r.id() == *id)
    }

    #[cfg(test)]
    pub(crate) fn is_member(&self, id: &R::Id) -> bool {
        self.members.contains_key(id)
    }
}
