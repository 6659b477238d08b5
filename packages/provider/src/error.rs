//! Error types for the provider surface.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the provider.
///
/// A missing resource is never an error; handlers return `Ok(None)` for
/// absence in all its forms.
#[derive(Debug, Error)]
pub enum Error {
    /// An address could not be parsed as a share address.
    #[error("invalid share address: {0}")]
    InvalidAddress(String),

    /// An address names another provider's authority.
    #[error("address authority '{actual}' does not match provider authority '{expected}'")]
    AuthorityMismatch { expected: String, actual: String },

    /// A resource path failed validation.
    #[error("invalid resource path: {0}")]
    InvalidResource(String),

    /// The store root could not be used.
    #[error("invalid store root {path}: {error}")]
    RootPathInvalid { path: PathBuf, error: io::Error },

    /// An I/O error occurred on the underlying resource.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let error = Error::InvalidAddress("not-a-url".to_string());
        assert_eq!(error.to_string(), "invalid share address: not-a-url");

        let error = Error::AuthorityMismatch {
            expected: "a.share".to_string(),
            actual: "b.share".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "address authority 'b.share' does not match provider authority 'a.share'"
        );
    }

    #[test]
    fn io_errors_convert() {
        let error: Error = io::Error::other("disk on fire").into();
        assert!(matches!(error, Error::Io(_)));
    }
}
