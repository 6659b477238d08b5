//! Request handlers around the gate.

use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;
use serde_json::value::Value as JsonValue;
use sharefs_gate::ShareGate;

use crate::address::{ShareAddress, ShareAuthority};
use crate::error::{Error, Result};
use crate::resource::{content_type_of, ResourceMeta, ResourceRef, ResourceStore};

/// The provider surface: one authority, one gate, one resource store.
///
/// Producers mint addresses with [`begin_share`](Self::begin_share) or
/// [`share_existing`](Self::share_existing) and publish pending ones with
/// [`publish`](Self::publish). The consumer-facing handlers (`open`, `query`,
/// `content_type`, `delete`) resolve pending addresses through the gate
/// before forwarding to the store; any form of absence comes back as
/// `Ok(None)`.
pub struct ShareProvider<S> {
    authority: ShareAuthority,
    gate: Arc<ShareGate<ResourceRef>>,
    store: S,
}

impl<S: ResourceStore> ShareProvider<S> {
    /// Provider for `namespace` over `store`, with its own gate.
    pub fn new(namespace: &str, store: S) -> Self {
        Self::with_gate(namespace, store, Arc::new(ShareGate::new()))
    }

    /// Provider sharing an externally owned gate.
    pub fn with_gate(namespace: &str, store: S, gate: Arc<ShareGate<ResourceRef>>) -> Self {
        Self {
            authority: ShareAuthority::for_namespace(namespace),
            gate,
            store,
        }
    }

    pub fn authority(&self) -> &ShareAuthority {
        &self.authority
    }

    /// The gate producers and consumers rendezvous through.
    pub fn gate(&self) -> &Arc<ShareGate<ResourceRef>> {
        &self.gate
    }

    /// Begin a share for a resource that is still being written.
    ///
    /// Returns the pending address to hand to the requester. Supersedes any
    /// previous pending share; its waiters are released with absence.
    pub fn begin_share(&self) -> ShareAddress {
        let handle = self.gate.begin_pending();
        ShareAddress::pending(&self.authority, handle)
    }

    /// Publish the finished resource for a pending address.
    ///
    /// `resolved` may be `None` when the producer gave up, releasing waiters
    /// with absence instead of leaving them parked. Publishing a superseded
    /// address changes nothing, per the rendezvous rules.
    pub fn publish(&self, address: &ShareAddress, resolved: Option<ResourceRef>) -> Result<()> {
        self.check_authority(address)?;
        let handle = address.pending_handle().ok_or_else(|| {
            Error::InvalidAddress(format!("'{}' is not a pending address", address))
        })?;
        self.gate.mark_ready(handle, resolved);
        Ok(())
    }

    /// Address for a resource that already exists. Never blocks consumers.
    pub fn share_existing(&self, reference: &ResourceRef) -> ShareAddress {
        ShareAddress::concrete(&self.authority, reference.as_str())
    }

    /// Open the resource behind `address` for reading.
    ///
    /// Blocks while the address is pending and undecided.
    pub fn open(&self, address: &ShareAddress) -> Result<Option<Box<dyn Read + Send>>> {
        let reference = match self.resolve(address)? {
            Some(reference) => reference,
            None => return Ok(None),
        };
        self.store.open(&reference)
    }

    /// Full contents of the resource behind `address`.
    pub fn open_bytes(&self, address: &ShareAddress) -> Result<Option<Bytes>> {
        let mut reader = match self.open(address)? {
            Some(reader) => reader,
            None => return Ok(None),
        };
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Some(Bytes::from(buffer)))
    }

    /// Attribute row for the resource behind `address`.
    ///
    /// Rows are guaranteed to carry a `data` key; some consumers assume the
    /// attribute exists even when the store has nothing to put in it.
    pub fn query(&self, address: &ShareAddress) -> Result<Option<JsonValue>> {
        let reference = match self.resolve(address)? {
            Some(reference) => reference,
            None => return Ok(None),
        };
        let meta = match self.store.metadata(&reference)? {
            Some(meta) => meta,
            None => return Ok(None),
        };

        let mut row = meta_row(&meta);
        if !row.contains_key("data") {
            row.insert("data".to_string(), JsonValue::Null);
        }
        Ok(Some(JsonValue::Object(row)))
    }

    /// MIME type of the resource behind `address`, by file extension.
    pub fn content_type(&self, address: &ShareAddress) -> Result<Option<&'static str>> {
        let reference = match self.resolve(address)? {
            Some(reference) => reference,
            None => return Ok(None),
        };
        Ok(Some(content_type_of(&reference)))
    }

    /// Delete the resource behind `address`.
    ///
    /// A pending address only clears the matching rendezvous slot and never
    /// touches the store; a concrete address removes the underlying resource.
    /// Returns whether anything was removed.
    pub fn delete(&self, address: &ShareAddress) -> Result<bool> {
        self.check_authority(address)?;
        if let Some(handle) = address.pending_handle() {
            return Ok(self.gate.invalidate(handle));
        }
        let reference = ResourceRef::parse(address.name())?;
        self.store.delete(&reference)
    }

    /// Resolve `address` to the reference it names, waiting on the gate when
    /// the address is pending. Absence in any form is `None`.
    fn resolve(&self, address: &ShareAddress) -> Result<Option<ResourceRef>> {
        self.check_authority(address)?;
        if let Some(handle) = address.pending_handle() {
            return Ok(self.gate.resolve_blocking(handle).reference());
        }
        Ok(Some(ResourceRef::parse(address.name())?))
    }

    fn check_authority(&self, address: &ShareAddress) -> Result<()> {
        if address.authority() != &self.authority {
            return Err(Error::AuthorityMismatch {
                expected: self.authority.as_str().to_string(),
                actual: address.authority().as_str().to_string(),
            });
        }
        Ok(())
    }
}

fn meta_row(meta: &ResourceMeta) -> serde_json::Map<String, JsonValue> {
    let mut row = serde_json::Map::new();
    row.insert("name".to_string(), json!(meta.reference.as_str()));
    row.insert("size".to_string(), json!(meta.size));
    row.insert("is_file".to_string(), json!(meta.is_file));
    row.insert("is_dir".to_string(), json!(meta.is_dir));
    if let Some(modified) = &meta.modified {
        row.insert("modified".to_string(), json!(modified.to_rfc3339()));
    }
    if let Some(path) = &meta.path {
        row.insert("data".to_string(), json!(path.display().to_string()));
    }
    row
}
