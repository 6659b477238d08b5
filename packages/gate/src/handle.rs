//! Handle identity for pending share requests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for one pending share request.
///
/// A handle carries no payload; it is compared by value to decide whether a
/// waiter is still looking at the slot it went to sleep on. Ids come from a
/// process-wide counter, so handles are unique for the process lifetime even
/// across independent gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShareHandle(u64);

impl ShareHandle {
    /// Mint a fresh handle, distinct from every handle minted before it.
    pub fn fresh() -> Self {
        Self(HANDLE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Reconstruct a handle from its raw id, e.g. one parsed out of an
    /// externally-visible address.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id, for embedding in an externally-visible address.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShareHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
