//! sharefs gate: the single-slot blocking rendezvous.
//!
//! The gate coordinates one producer writing a file with any number of
//! consumers that were handed an address before the file exists:
//! - `begin_pending` installs a fresh pending handle, superseding the
//!   previous one
//! - `resolve_blocking` parks the caller until the handle is published,
//!   superseded, or found not to be pending at all
//! - `mark_ready` publishes the resolved reference and wakes every waiter
//! - `invalidate` clears the slot when the pending artifact is discarded
//!
//! Exactly one handle is pending at a time. The gate never performs I/O and
//! never errors; every race resolves to a tagged [`Resolution`].
//!
//! # Example
//!
//! ```rust
//! use sharefs_gate::{Resolution, ShareGate};
//!
//! let gate: ShareGate<String> = ShareGate::new();
//! let handle = gate.begin_pending();
//! gate.mark_ready(handle, Some("reports/q3.pdf".to_string()));
//! assert_eq!(
//!     gate.resolve_blocking(handle),
//!     Resolution::Ready(Some("reports/q3.pdf".to_string())),
//! );
//! ```

mod gate;
mod handle;

pub use gate::{Resolution, ShareGate};
pub use handle::ShareHandle;
