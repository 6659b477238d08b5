//! sharefs provider: the request-handler surface around the gate.
//!
//! A [`ShareProvider`] owns one rendezvous gate, one addressing authority,
//! and one resource store. Producers mint addresses for files that do not
//! exist yet (`begin_share`) and publish them once written (`publish`);
//! consumer-facing handlers (`open`, `query`, `content_type`, `delete`)
//! resolve pending addresses through the gate before touching the store.
//!
//! Absence is a normal outcome everywhere on this surface: a superseded
//! share, a producer that resolved to nothing, and a file missing on disk
//! all come back as `Ok(None)`, never as an error.
//!
//! # Example
//!
//! ```rust
//! use sharefs_provider::{DiskStore, ResourceRef, ShareProvider};
//!
//! let root = tempfile::tempdir().unwrap();
//! std::fs::write(root.path().join("notes.txt"), b"hello").unwrap();
//!
//! let store = DiskStore::new(root.path().to_path_buf()).unwrap();
//! let provider = ShareProvider::new("com.example.viewer", store);
//!
//! let reference = ResourceRef::parse("notes.txt").unwrap();
//! let address = provider.share_existing(&reference);
//! let bytes = provider.open_bytes(&address).unwrap().unwrap();
//! assert_eq!(&bytes[..], b"hello");
//! ```

mod address;
mod error;
mod provider;
mod resource;

pub use address::{ShareAddress, ShareAuthority};
pub use error::{Error, Result};
pub use provider::ShareProvider;
pub use resource::{content_type_of, DiskStore, ResourceMeta, ResourceRef, ResourceStore};

// Re-export gate types for convenience
pub use sharefs_gate::{Resolution, ShareGate, ShareHandle};
