//! Extraction options

use serde::Serialize;

use crate::common::HashAlgorithm;

// =============================================================================
// Configuration
// =============================================================================

/// Nested packages are read fully into memory; larger ones are skipped
pub const DEFAULT_MAX_NESTED_PACKAGE_SIZE: u64 = 512 * 1024 * 1024;

/// Icon candidates above this uncompressed size are ignored
pub const DEFAULT_MAX_ICON_SIZE: u64 = 16 * 1024 * 1024;

/// Options for one extraction call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractOptions {
    /// Digest used for the fingerprint (default: MD5)
    pub fingerprint_algorithm: HashAlgorithm,
    /// Upper bound on a nested package read into memory
    pub max_nested_package_size: u64,
    /// Upper bound on an icon entry's uncompressed size
    pub max_icon_size: u64,
    /// Look up an icon at all
    pub resolve_icons: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fingerprint_algorithm: HashAlgorithm::Md5,
            max_nested_package_size: DEFAULT_MAX_NESTED_PACKAGE_SIZE,
            max_icon_size: DEFAULT_MAX_ICON_SIZE,
            resolve_icons: true,
        }
    }
}

impl ExtractOptions {
    pub fn with_fingerprint_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.fingerprint_algorithm = algorithm;
        self
    }

    pub fn with_max_nested_package_size(mut self, bytes: u64) -> Self {
        self.max_nested_package_size = bytes;
        self
    }

    pub fn with_max_icon_size(mut self, bytes: u64) -> Self {
        self.max_icon_size = bytes;
        self
    }

    pub fn with_resolve_icons(mut self, resolve: bool) -> Self {
        self.resolve_icons = resolve;
        self
    }
}
