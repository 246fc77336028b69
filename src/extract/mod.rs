//! Extraction pipeline
//!
//! ```text
//! path ─► detect kind ─► open container ─► manifest ─► fields
//!                              │                └────► icon
//!                              └─ closed ─► fingerprint ─► ContentDescriptor
//! ```
//!
//! Every call owns its container exclusively and drops it before hashing,
//! on success and failure alike. Nothing is shared between calls, so any
//! number of extractions can run concurrently on different files.

pub(crate) mod ios;
pub(crate) mod windows;

use std::fs;
use std::io::{Read, Seek};
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::common::hash_file;
use crate::config::ExtractOptions;
use crate::container::{Container, MemoryContainer};
use crate::error::{ExtractError, ExtractResult};
use crate::icon::ResolvedIcon;
use crate::package::{detect_package_kind, locate_zip_payload, ContentDescriptor, ManifestFields, PackageKind, ZipPayload};

/// What one kind-specific pass produced
#[derive(Debug, Default)]
struct Extracted {
    fields: ManifestFields,
    icon: Option<ResolvedIcon>,
    payload_kind: Option<PackageKind>,
}

// =============================================================================
// Entry points
// =============================================================================

/// Extract metadata from a package file with default options
pub fn run(path: impl AsRef<Path>) -> ExtractResult<ContentDescriptor> {
    run_with_options(path, &ExtractOptions::default())
}

/// Extract metadata from a package file
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn run_with_options(path: impl AsRef<Path>, options: &ExtractOptions) -> ExtractResult<ContentDescriptor> {
    let path = path.as_ref();

    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(ExtractError::InvalidArgument("no package path supplied".to_string()));
    }

    let metadata = fs::metadata(path).map_err(|e| ExtractError::file_not_found(path, e))?;
    if !metadata.is_file() {
        return Err(ExtractError::file_not_found(path, "not a regular file"));
    }

    let kind = detect_package_kind(path)?;
    debug!(%kind, size = metadata.len(), "Package detected");

    let extracted = {
        let mut container = Container::open(path)?;
        let result = extract_kind(&mut container, kind, options);
        container.close();
        result?
    };

    let fingerprint = hash_file(path, options.fingerprint_algorithm)?;

    let original_file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!(
        file = %original_file_name,
        %kind,
        identifier = extracted.fields.unique_identifier.as_deref().unwrap_or_default(),
        icon = extracted.icon.as_ref().map(|icon| icon.file_name.as_str()).unwrap_or_default(),
        "Extraction complete"
    );

    Ok(ContentDescriptor::new(
        original_file_name,
        fingerprint,
        kind,
        extracted.payload_kind,
        extracted.fields,
        extracted.icon,
    ))
}

/// Async form of [`run`]; the work runs on tokio's blocking pool
pub async fn run_async(path: impl AsRef<Path>) -> ExtractResult<ContentDescriptor> {
    run_async_with_options(path, ExtractOptions::default()).await
}

/// Async form of [`run_with_options`]
pub async fn run_async_with_options(
    path: impl AsRef<Path>,
    options: ExtractOptions,
) -> ExtractResult<ContentDescriptor> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || run_with_options(&path, &options))
        .await
        .map_err(|e| ExtractError::Internal(format!("extraction task failed: {e}")))?
}

/// Reusable extractor holding its options
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn run(&self, path: impl AsRef<Path>) -> ExtractResult<ContentDescriptor> {
        run_with_options(path, &self.options)
    }

    pub async fn run_async(&self, path: impl AsRef<Path>) -> ExtractResult<ContentDescriptor> {
        run_async_with_options(path, self.options.clone()).await
    }
}

// =============================================================================
// Kind dispatch
// =============================================================================

fn extract_kind<R: Read + Seek>(
    container: &mut Container<R>,
    kind: PackageKind,
    options: &ExtractOptions,
) -> ExtractResult<Extracted> {
    let (fields, icon) = match kind {
        PackageKind::IOSApp => ios::extract(container, options)?,
        PackageKind::WindowsApp => windows::extract_package(container, options)?,
        PackageKind::WindowsAppBundle => windows::extract_bundle(container, options)?,
        PackageKind::GenericZip => return extract_generic_zip(container, options),
    };
    Ok(Extracted { fields, icon, payload_kind: None })
}

fn extract_generic_zip<R: Read + Seek>(
    container: &mut Container<R>,
    options: &ExtractOptions,
) -> ExtractResult<Extracted> {
    match locate_zip_payload(container, options.max_nested_package_size) {
        ZipPayload::InPlace(kind) => {
            debug!(%kind, "ZIP carries payload at its root");
            let extracted = extract_kind(container, kind, options)?;
            Ok(Extracted { payload_kind: Some(kind), ..extracted })
        }
        ZipPayload::Nested { kind, index, name } => {
            debug!(%kind, entry = %name, "ZIP carries nested package");
            let data = container.read_index(index)?;
            let label = name.rsplit('/').next().unwrap_or(&name).to_string();
            let mut nested = MemoryContainer::from_bytes(label, data)?;
            let result = extract_kind(&mut nested, kind, options);
            nested.close();
            Ok(Extracted { payload_kind: Some(kind), ..result? })
        }
        ZipPayload::Absent => {
            warn!(container = %container.label(), "ZIP carries no recognizable app payload");
            Ok(Extracted::default())
        }
    }
}
