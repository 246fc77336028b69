//! Package kinds, detection and the normalized descriptor
//!
//! ## Module Structure
//! ```text
//! package/
//! ├── mod.rs        - Re-exports
//! ├── types.rs      - PackageKind, ContentDescriptor
//! └── detection.rs  - Extension mapping, GenericZip payload lookup
//! ```

pub mod detection;
pub mod types;

// Re-exports for convenience
pub use detection::{detect_package_kind, kind_for_file_name, locate_zip_payload, ZipPayload};
pub use types::{ContentDescriptor, PackageKind};
pub(crate) use types::ManifestFields;
