//! APPX and APPXBUNDLE extraction

use std::io::{Read, Seek};

use tracing::{debug, instrument, warn};

use crate::config::ExtractOptions;
use crate::container::{Container, MemoryContainer};
use crate::error::{ExtractError, ExtractResult};
use crate::icon::{self, ResolvedIcon};
use crate::manifest::{
    parse_bundle_manifest, parse_package_manifest, AppxManifest, BundleManifest, APPX_BUNDLE_MANIFEST_PATH,
    APPX_MANIFEST_PATH,
};
use crate::package::ManifestFields;

/// Device family reported for every Windows package kind
pub(crate) const WINDOWS_DEVICE_FAMILY: &str = "Windows";

pub(crate) fn map_package_manifest(manifest: &AppxManifest) -> ManifestFields {
    ManifestFields {
        display_name: manifest.display_name.clone(),
        unique_identifier: Some(manifest.name.clone()),
        version: None,
        build_version: Some(manifest.version.clone()),
        executable_name: manifest.executable.clone(),
        minimum_os_version: manifest.min_version.clone(),
        device_family: Some(WINDOWS_DEVICE_FAMILY.to_string()),
        languages: manifest.languages.clone(),
    }
}

/// Bundle identity and languages, with the rest from the application package
pub(crate) fn map_bundle_manifest(bundle: &BundleManifest, application: Option<&AppxManifest>) -> ManifestFields {
    ManifestFields {
        display_name: application.and_then(|app| app.display_name.clone()),
        unique_identifier: Some(bundle.name.clone()),
        version: None,
        build_version: Some(bundle.version.clone()),
        executable_name: application.and_then(|app| app.executable.clone()),
        minimum_os_version: application.and_then(|app| app.min_version.clone()),
        device_family: Some(WINDOWS_DEVICE_FAMILY.to_string()),
        languages: bundle.languages(),
    }
}

fn read_package_manifest<R: Read + Seek>(container: &mut Container<R>) -> ExtractResult<AppxManifest> {
    let entry = container
        .find_ignore_case(APPX_MANIFEST_PATH)
        .cloned()
        .ok_or_else(|| ExtractError::malformed(container.label(), "no AppxManifest.xml entry"))?;
    let data = container.read_index(entry.index)?;
    parse_package_manifest(&entry.name, &data)
}

/// Decode `AppxManifest.xml`, map it and resolve the icon
#[instrument(skip_all, fields(container = %container.label()))]
pub(crate) fn extract_package<R: Read + Seek>(
    container: &mut Container<R>,
    options: &ExtractOptions,
) -> ExtractResult<(ManifestFields, Option<ResolvedIcon>)> {
    let manifest = read_package_manifest(container)?;
    debug!(name = %manifest.name, version = %manifest.version, "Package manifest decoded");

    let icon = if options.resolve_icons {
        icon::windows::resolve(container, &manifest.logo_seeds, options.max_icon_size)?
    } else {
        None
    };

    Ok((map_package_manifest(&manifest), icon))
}

/// Decode `AppxBundleManifest.xml` and its application package
///
/// A bundle with only a root `AppxManifest.xml` is handled as a package.
#[instrument(skip_all, fields(container = %container.label()))]
pub(crate) fn extract_bundle<R: Read + Seek>(
    container: &mut Container<R>,
    options: &ExtractOptions,
) -> ExtractResult<(ManifestFields, Option<ResolvedIcon>)> {
    let bundle_entry = container.find_ignore_case(APPX_BUNDLE_MANIFEST_PATH).cloned();
    let Some(entry) = bundle_entry else {
        if container.find_ignore_case(APPX_MANIFEST_PATH).is_some() {
            debug!("No bundle manifest; reading root package manifest");
            return extract_package(container, options);
        }
        return Err(ExtractError::malformed(container.label(), "no AppxMetadata/AppxBundleManifest.xml entry"));
    };

    let data = container.read_index(entry.index)?;
    let bundle = parse_bundle_manifest(&entry.name, &data)?;
    debug!(name = %bundle.name, version = %bundle.version, packages = bundle.packages.len(), "Bundle manifest decoded");

    let mut application = application_package(container, &bundle, options);

    let icon = match application.as_mut() {
        Some(app) if options.resolve_icons && !app.manifest.logo_seeds.is_empty() => icon::windows::resolve_bundle(
            container,
            Some((app.index, &mut app.container)),
            &app.manifest.logo_seeds,
            options,
        )?,
        _ => None,
    };

    let fields = map_bundle_manifest(&bundle, application.as_ref().map(|app| &app.manifest));
    if let Some(app) = application {
        app.container.close();
    }
    Ok((fields, icon))
}

/// The bundle's application package, opened once and kept for the icon search
struct ApplicationPackage {
    manifest: AppxManifest,
    /// Entry index inside the bundle
    index: usize,
    container: MemoryContainer,
}

/// First application package of the bundle, if it can be read
fn application_package<R: Read + Seek>(
    container: &mut Container<R>,
    bundle: &BundleManifest,
    options: &ExtractOptions,
) -> Option<ApplicationPackage> {
    let Some(package) = bundle.application_packages().next() else {
        warn!("Bundle declares no application package");
        return None;
    };
    let file_name = package.file_name.replace('\\', "/");

    let Some(entry) = container.find_ignore_case(&file_name).cloned() else {
        warn!(package = %file_name, "Application package missing from bundle");
        return None;
    };
    if entry.size > options.max_nested_package_size {
        warn!(package = %file_name, size = entry.size, "Application package over size limit");
        return None;
    }

    let opened = container
        .read_index(entry.index)
        .and_then(|data| MemoryContainer::from_bytes(entry.file_name(), data))
        .and_then(|mut nested| read_package_manifest(&mut nested).map(|manifest| (manifest, nested)));

    match opened {
        Ok((manifest, container)) => Some(ApplicationPackage {
            manifest,
            index: entry.index,
            container,
        }),
        Err(e) => {
            warn!(package = %file_name, error = %e, "Application package unreadable");
            None
        }
    }
}
