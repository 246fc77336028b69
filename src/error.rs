//! Error types for package extraction

use std::fmt;
use std::path::Path;

/// Result type alias for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur while extracting package metadata
///
/// Every variant is terminal: malformed input is not transient, so nothing
/// here is worth retrying.
#[derive(Debug)]
pub enum ExtractError {
    /// No path supplied (empty or whitespace-only)
    InvalidArgument(String),
    /// Path does not resolve to a readable regular file
    FileNotFound(String),
    /// Extension is not one of the recognized package kinds
    UnsupportedPackage(String),
    /// ZIP structure unreadable or an entry failed to decompress
    CorruptArchive(String),
    /// Manifest missing or undecodable
    MalformedManifest(String),
    /// Worker failure in the async wrapper (panic or cancelled join)
    Internal(String),
}

/// Field-less discriminant of [`ExtractError`], for matching in callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    FileNotFound,
    UnsupportedPackage,
    CorruptArchive,
    MalformedManifest,
    Internal,
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ExtractError::FileNotFound(_) => ErrorKind::FileNotFound,
            ExtractError::UnsupportedPackage(_) => ErrorKind::UnsupportedPackage,
            ExtractError::CorruptArchive(_) => ErrorKind::CorruptArchive,
            ExtractError::MalformedManifest(_) => ErrorKind::MalformedManifest,
            ExtractError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn file_not_found(path: &Path, detail: impl fmt::Display) -> Self {
        ExtractError::FileNotFound(format!("{}: {}", path.display(), detail))
    }

    pub(crate) fn corrupt(container: &str, detail: impl fmt::Display) -> Self {
        ExtractError::CorruptArchive(format!("{}: {}", container, detail))
    }

    pub(crate) fn malformed(manifest: &str, detail: impl fmt::Display) -> Self {
        ExtractError::MalformedManifest(format!("{}: {}", manifest, detail))
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            ExtractError::FileNotFound(e) => write!(f, "File not found: {}", e),
            ExtractError::UnsupportedPackage(e) => write!(f, "Unsupported package: {}", e),
            ExtractError::CorruptArchive(e) => write!(f, "Corrupt archive: {}", e),
            ExtractError::MalformedManifest(e) => write!(f, "Malformed manifest: {}", e),
            ExtractError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}
