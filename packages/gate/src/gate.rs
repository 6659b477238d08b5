//! The single-slot rendezvous between one producer and any number of waiters.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::handle::ShareHandle;

/// Outcome of resolving a handle against the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<R> {
    /// The handle is not the tracked pending handle; there is nothing to
    /// wait for.
    NotPending,
    /// The handle was pending when the wait began, but a newer request
    /// replaced or cleared the slot before it became ready.
    Superseded,
    /// The producer published. The reference may still be absent if the
    /// producer resolved to nothing.
    Ready(Option<R>),
}

impl<R> Resolution<R> {
    /// Collapse to the reference itself; absent unless ready with a
    /// reference.
    pub fn reference(self) -> Option<R> {
        match self {
            Resolution::Ready(resolved) => resolved,
            Resolution::NotPending | Resolution::Superseded => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }
}

/// The rendezvous record. All three fields transition together under the
/// gate's mutex; `resolved` is meaningful only while `ready` is true.
struct Slot<R> {
    current: Option<ShareHandle>,
    ready: bool,
    resolved: Option<R>,
}

impl<R> Slot<R> {
    fn matches(&self, handle: ShareHandle) -> bool {
        self.current == Some(handle)
    }
}

/// Single-slot blocking rendezvous.
///
/// Tracks at most one pending handle at a time. A producer installs a handle
/// with [`begin_pending`](Self::begin_pending), writes its resource
/// out-of-band, then publishes with [`mark_ready`](Self::mark_ready).
/// Consumers park in [`resolve_blocking`](Self::resolve_blocking) until the
/// slot decides.
///
/// A newer `begin_pending` unconditionally supersedes the previous handle:
/// waiters of the old handle wake and observe [`Resolution::Superseded`].
pub struct ShareGate<R> {
    slot: Mutex<Slot<R>>,
    readiness: Condvar,
}

impl<R: Clone> ShareGate<R> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                current: None,
                ready: false,
                resolved: None,
            }),
            readiness: Condvar::new(),
        }
    }

    /// Install a fresh pending handle, superseding any previous one.
    ///
    /// Waiters of the previous handle are woken so they observe the
    /// supersession instead of sleeping on a slot that will never publish.
    pub fn begin_pending(&self) -> ShareHandle {
        let handle = ShareHandle::fresh();
        let mut slot = self.slot.lock().unwrap();
        slot.current = Some(handle);
        slot.ready = false;
        slot.resolved = None;
        // In case the previous handle never became ready.
        self.readiness.notify_all();
        log::debug!("pending handle {} installed", handle);
        handle
    }

    /// Publish the resolved reference for `handle`.
    ///
    /// State changes only if `handle` is still current; a producer finishing
    /// after being superseded must not resurrect the abandoned handle.
    /// Waiters are woken either way so a decided slot is re-examined
    /// promptly.
    pub fn mark_ready(&self, handle: ShareHandle, resolved: Option<R>) {
        let mut slot = self.slot.lock().unwrap();
        if slot.matches(handle) {
            slot.resolved = resolved;
            slot.ready = true;
            log::debug!("handle {} ready", handle);
        }
        self.readiness.notify_all();
    }

    /// Clear the slot if `handle` is still current.
    ///
    /// Returns whether the invalidation applied, so callers can tell
    /// "cleared the active pending slot" from "already superseded".
    pub fn invalidate(&self, handle: ShareHandle) -> bool {
        let mut slot = self.slot.lock().unwrap();
        if !slot.matches(handle) {
            return false;
        }
        slot.current = None;
        slot.ready = false;
        slot.resolved = None;
        self.readiness.notify_all();
        log::debug!("handle {} invalidated", handle);
        true
    }

    /// Block until `handle` is published, superseded, or found not pending.
    ///
    /// Returns immediately when `handle` is not the current pending handle.
    pub fn resolve_blocking(&self, handle: ShareHandle) -> Resolution<R> {
        let mut slot = self.slot.lock().unwrap();
        if !slot.matches(handle) {
            return Resolution::NotPending;
        }
        // Wakeups may be spurious or meant for another state change, so the
        // predicate is re-checked on every wake.
        while !slot.ready && slot.matches(handle) {
            slot = self.readiness.wait(slot).unwrap();
        }
        Self::decide(&slot, handle)
    }

    /// [`resolve_blocking`](Self::resolve_blocking) with a bound on each
    /// wait. Returns `None` if the slot is still undecided when the bound
    /// expires.
    pub fn resolve_timeout(
        &self,
        handle: ShareHandle,
        timeout: Duration,
    ) -> Option<Resolution<R>> {
        let mut slot = self.slot.lock().unwrap();
        if !slot.matches(handle) {
            return Some(Resolution::NotPending);
        }
        while !slot.ready && slot.matches(handle) {
            let (guard, waited) = self.readiness.wait_timeout(slot, timeout).unwrap();
            slot = guard;
            if waited.timed_out() && !slot.ready && slot.matches(handle) {
                return None;
            }
        }
        Some(Self::decide(&slot, handle))
    }

    fn decide(slot: &Slot<R>, handle: ShareHandle) -> Resolution<R> {
        if slot.matches(handle) {
            Resolution::Ready(slot.resolved.clone())
        } else {
            // The slot changed while the caller was asleep.
            Resolution::Superseded
        }
    }
}

impl<R: Clone> Default for ShareGate<R> {
    fn default() -> Self {
        Self::new()
    }
}
