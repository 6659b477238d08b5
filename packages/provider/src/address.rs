//! Externally-visible share addresses.
//!
//! Addresses use one scheme with two forms:
//! - pending: `share://{authority}/pending-{id}` names a rendezvous handle
//!   whose resource is still being written
//! - concrete: `share://{authority}/{resource-path}` names a stored resource

use std::fmt;

use serde::{Deserialize, Serialize};
use sharefs_gate::ShareHandle;
use url::Url;

use crate::error::{Error, Result};

const SHARE_SCHEME: &str = "share";
const AUTHORITY_SUFFIX: &str = ".share";
const PENDING_PREFIX: &str = "pending-";

/// Authority component of a share address, derived from a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShareAuthority(String);

impl ShareAuthority {
    /// Authority for a namespace: `com.example.viewer` becomes
    /// `com.example.viewer.share`.
    pub fn for_namespace(namespace: &str) -> Self {
        Self(format!("{}{}", namespace, AUTHORITY_SUFFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Externally-visible address of a shared resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShareAddress {
    authority: ShareAuthority,
    name: String,
}

impl ShareAddress {
    /// Pending-form address for a rendezvous handle.
    pub fn pending(authority: &ShareAuthority, handle: ShareHandle) -> Self {
        Self {
            authority: authority.clone(),
            name: format!("{}{}", PENDING_PREFIX, handle.raw()),
        }
    }

    /// Concrete-form address for a resource path.
    pub fn concrete(authority: &ShareAuthority, name: &str) -> Self {
        Self {
            authority: authority.clone(),
            name: name.to_string(),
        }
    }

    /// Parse `share://{authority}/{name}`.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)
            .map_err(|error| Error::InvalidAddress(format!("'{}': {}", input, error)))?;
        if url.scheme() != SHARE_SCHEME {
            return Err(Error::InvalidAddress(format!(
                "'{}': unsupported scheme '{}'",
                input,
                url.scheme()
            )));
        }
        let authority = url
            .host_str()
            .ok_or_else(|| Error::InvalidAddress(format!("'{}': missing authority", input)))?;
        let name = url.path().trim_start_matches('/');
        if name.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "'{}': missing resource name",
                input
            )));
        }
        Ok(Self {
            authority: ShareAuthority(authority.to_string()),
            name: name.to_string(),
        })
    }

    pub fn authority(&self) -> &ShareAuthority {
        &self.authority
    }

    /// Name component: either the pending marker plus id, or a resource path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this address must be resolved through the gate.
    pub fn is_pending(&self) -> bool {
        self.pending_handle().is_some()
    }

    /// The handle carried by a pending-form address.
    ///
    /// Only a single-segment `pending-{id}` name qualifies; a resource that
    /// merely starts with the marker is treated as concrete.
    pub fn pending_handle(&self) -> Option<ShareHandle> {
        if self.name.contains('/') {
            return None;
        }
        let raw = self.name.strip_prefix(PENDING_PREFIX)?;
        raw.parse::<u64>().ok().map(ShareHandle::from_raw)
    }
}

impl fmt::Display for ShareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", SHARE_SCHEME, self.authority, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_from_namespace() {
        let authority = ShareAuthority::for_namespace("com.example.viewer");
        assert_eq!(authority.as_str(), "com.example.viewer.share");
    }

    #[test]
    fn pending_address_round_trip() {
        let authority = ShareAuthority::for_namespace("com.example.viewer");
        let handle = ShareHandle::fresh();
        let address = ShareAddress::pending(&authority, handle);

        assert!(address.is_pending());
        assert_eq!(address.pending_handle(), Some(handle));

        let parsed = ShareAddress::parse(&address.to_string()).unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn concrete_address_round_trip() {
        let authority = ShareAuthority::for_namespace("com.example.viewer");
        let address = ShareAddress::concrete(&authority, "reports/q3.pdf");

        assert!(!address.is_pending());
        assert_eq!(address.pending_handle(), None);
        assert_eq!(address.name(), "reports/q3.pdf");
        assert_eq!(
            address.to_string(),
            "share://com.example.viewer.share/reports/q3.pdf"
        );

        let parsed = ShareAddress::parse(&address.to_string()).unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn marker_without_numeric_id_is_concrete() {
        let authority = ShareAuthority::for_namespace("com.example.viewer");
        let address = ShareAddress::concrete(&authority, "pending-notes.txt");
        assert!(!address.is_pending());

        let nested = ShareAddress::concrete(&authority, "pending-3/inner");
        assert!(!nested.is_pending());
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(ShareAddress::parse("not an address").is_err());
        assert!(ShareAddress::parse("http://example.com/file").is_err());
        assert!(ShareAddress::parse("share://authority.share").is_err());
    }
}
