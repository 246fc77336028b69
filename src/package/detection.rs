//! Package kind detection
//!
//! Detection by extension never opens the file. A `GenericZip` is searched
//! after the container is open to find the app payload it carries.

use std::io::{Read, Seek};
use std::path::Path;

use tracing::{instrument, trace};

use super::types::PackageKind;
use crate::container::Container;
use crate::error::{ExtractError, ExtractResult};
use crate::manifest::{APPX_BUNDLE_MANIFEST_PATH, APPX_MANIFEST_PATH};

/// Nested package kinds a `GenericZip` may wrap, most preferred first
const NESTED_PAYLOAD_KINDS: &[PackageKind] = &[
    PackageKind::WindowsAppBundle,
    PackageKind::WindowsApp,
    PackageKind::IOSApp,
];

pub const IOS_INFO_PLIST_PATTERN: &str = "Payload/*.app/Info.plist";

/// Classify a path by its extension
#[instrument(fields(path = %path.display()))]
pub fn detect_package_kind(path: &Path) -> ExtractResult<PackageKind> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    let kind = kind_for_file_name(&file_name).ok_or_else(|| {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| "no extension".to_string());
        ExtractError::UnsupportedPackage(format!("{} ({})", path.display(), extension))
    })?;

    trace!(%kind, "Detected package kind");
    Ok(kind)
}

/// Kind for a file or entry name, if its extension is recognized
///
/// Extensions compare case-insensitively.
pub fn kind_for_file_name(name: &str) -> Option<PackageKind> {
    let (_, extension) = name.rsplit_once('.')?;
    PackageKind::ALL
        .into_iter()
        .find(|kind| extension.eq_ignore_ascii_case(kind.extension()))
}

// =============================================================================
// GenericZip payload lookup
// =============================================================================

/// Where a `GenericZip` keeps its app payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZipPayload {
    /// Payload laid out at the ZIP root; handled with the ZIP as its container
    InPlace(PackageKind),
    /// Payload is a package entry that must be read into memory
    Nested {
        kind: PackageKind,
        index: usize,
        name: String,
    },
    /// Nothing recognizable; only name and fingerprint are reported
    Absent,
}

/// Find the app payload of a generic ZIP
///
/// First match wins: a root bundle manifest, a root package manifest, a
/// `Payload/*.app/Info.plist`, then a nested package entry (bundle over APPX
/// over IPA, shallowest first). Nested entries above `max_nested_size` are
/// passed over.
pub fn locate_zip_payload<R: Read + Seek>(container: &Container<R>, max_nested_size: u64) -> ZipPayload {
    let payload = if container.find_ignore_case(APPX_BUNDLE_MANIFEST_PATH).is_some() {
        ZipPayload::InPlace(PackageKind::WindowsAppBundle)
    } else if container.find_ignore_case(APPX_MANIFEST_PATH).is_some() {
        ZipPayload::InPlace(PackageKind::WindowsApp)
    } else if !container.find_matching(IOS_INFO_PLIST_PATTERN).is_empty() {
        ZipPayload::InPlace(PackageKind::IOSApp)
    } else {
        nested_payload(container, max_nested_size)
    };

    trace!(container = %container.label(), ?payload, "Located ZIP payload");
    payload
}

fn nested_payload<R: Read + Seek>(container: &Container<R>, max_nested_size: u64) -> ZipPayload {
    for wanted in NESTED_PAYLOAD_KINDS {
        let best = container
            .files()
            .filter(|entry| kind_for_file_name(entry.file_name()) == Some(*wanted))
            .filter(|entry| {
                let fits = entry.size <= max_nested_size;
                if !fits {
                    trace!(entry = %entry.name, size = entry.size, "Nested package over size limit");
                }
                fits
            })
            .min_by_key(|entry| entry.depth());

        if let Some(entry) = best {
            return ZipPayload::Nested {
                kind: *wanted,
                index: entry.index,
                name: entry.name.clone(),
            };
        }
    }
    ZipPayload::Absent
}
