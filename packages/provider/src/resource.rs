//! Resource references and the resource-I/O collaborator.

use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{self, PathBuf};

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Validated relative path of a stored resource.
///
/// References are always relative: no leading separator, no empty segments,
/// no `.` or `..` traversal. Segments are restricted to a portable character
/// set (ASCII alphanumerics plus `.`, `_` and `-`), so a reference embeds
/// into a share address verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn parse(input: &str) -> Result<Self> {
        lazy_static! {
            static ref SEGMENT: Regex = Regex::new(r"^[A-Za-z0-9._-]+$").unwrap();
        }

        if input.is_empty() {
            return Err(Error::InvalidResource("empty path".to_string()));
        }
        for segment in input.split('/') {
            if segment == "." || segment == ".." {
                return Err(Error::InvalidResource(format!(
                    "traversal segment in '{}'",
                    input
                )));
            }
            if !SEGMENT.is_match(segment) {
                return Err(Error::InvalidResource(format!(
                    "bad segment '{}' in '{}'",
                    segment, input
                )));
            }
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// File extension of the final segment, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.0.rsplit('/').next()?;
        let (stem, extension) = name.rsplit_once('.')?;
        if stem.is_empty() || extension.is_empty() {
            return None;
        }
        Some(extension)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for a stored resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMeta {
    pub reference: ResourceRef,
    pub size: u64,
    pub is_file: bool,
    pub is_dir: bool,
    pub modified: Option<DateTime<Utc>>,
    /// Backing location, for stores that have one.
    pub path: Option<PathBuf>,
}

/// Resource-I/O collaborator: translates references into byte streams and
/// metadata.
///
/// Absence is `Ok(None)` (or `Ok(false)` for delete), never an error.
pub trait ResourceStore: Send + Sync {
    /// Open the resource for reading.
    fn open(&self, reference: &ResourceRef) -> Result<Option<Box<dyn io::Read + Send>>>;

    /// Metadata for the resource.
    fn metadata(&self, reference: &ResourceRef) -> Result<Option<ResourceMeta>>;

    /// Delete the resource. Returns whether something was removed.
    fn delete(&self, reference: &ResourceRef) -> Result<bool>;
}

/// Disk-backed resource store. Every reference resolves under one root
/// directory; reference validation keeps lookups from escaping it.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at `root`, which must be an existing directory.
    pub fn new(root: PathBuf) -> Result<Self> {
        let attr = fs::metadata(&root).map_err(|error| Error::RootPathInvalid {
            path: root.clone(),
            error,
        })?;

        if !attr.is_dir() {
            return Err(Error::RootPathInvalid {
                path: root,
                error: io::Error::other("root path must be a directory"),
            });
        }

        match root.canonicalize() {
            Ok(root) => Ok(DiskStore { root }),
            Err(error) => Err(Error::RootPathInvalid { path: root, error }),
        }
    }

    pub fn root(&self) -> &path::Path {
        &self.root
    }

    fn file_path(&self, reference: &ResourceRef) -> PathBuf {
        self.root
            .components()
            .chain(
                reference
                    .segments()
                    .map(|s| path::Component::Normal(OsStr::new(s))),
            )
            .collect()
    }
}

impl ResourceStore for DiskStore {
    fn open(&self, reference: &ResourceRef) -> Result<Option<Box<dyn io::Read + Send>>> {
        let file_path = self.file_path(reference);
        log::debug!("Opening {}...", file_path.display());
        match fs::metadata(&file_path) {
            Ok(attr) if attr.is_file() => {
                let reader: Box<dyn io::Read + Send> = Box::new(fs::File::open(&file_path)?);
                Ok(Some(reader))
            }
            // Directories and other non-file entries are not byte streams.
            Ok(_) => Ok(None),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn metadata(&self, reference: &ResourceRef) -> Result<Option<ResourceMeta>> {
        let file_path = self.file_path(reference);
        log::debug!("Reading metadata for {}...", file_path.display());
        let attr = match fs::metadata(&file_path) {
            Ok(attr) => attr,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        let modified = attr.modified().ok().map(DateTime::<Utc>::from);
        Ok(Some(ResourceMeta {
            reference: reference.clone(),
            size: attr.len(),
            is_file: attr.is_file(),
            is_dir: attr.is_dir(),
            modified,
            path: Some(file_path),
        }))
    }

    fn delete(&self, reference: &ResourceRef) -> Result<bool> {
        let file_path = self.file_path(reference);
        log::debug!("Deleting {}...", file_path.display());
        match fs::remove_file(&file_path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }
}

const OCTET_STREAM: &str = "application/octet-stream";

/// MIME type for a reference, from its file extension.
///
/// Unknown and missing extensions map to `application/octet-stream`.
pub fn content_type_of(reference: &ResourceRef) -> &'static str {
    let extension = match reference.extension() {
        Some(extension) => extension.to_ascii_lowercase(),
        None => return OCTET_STREAM,
    };
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "txt" | "log" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "csv" => "text/csv",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => OCTET_STREAM,
    }
}
