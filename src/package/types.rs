//! Package kinds and the normalized descriptor

use serde::{Serialize, Serializer};

use crate::icon::ResolvedIcon;

// =============================================================================
// Package Kind
// =============================================================================

/// Supported app package kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PackageKind {
    /// Apple IPA (`Payload/*.app/Info.plist`)
    IOSApp,
    /// Plain ZIP, possibly carrying one of the other kinds
    GenericZip,
    /// Windows APPX (`AppxManifest.xml`)
    WindowsApp,
    /// Windows APPXBUNDLE (`AppxMetadata/AppxBundleManifest.xml`)
    WindowsAppBundle,
}

impl PackageKind {
    /// Every kind, in detection order
    pub const ALL: [PackageKind; 4] = [
        PackageKind::IOSApp,
        PackageKind::GenericZip,
        PackageKind::WindowsApp,
        PackageKind::WindowsAppBundle,
    ];

    /// Lower-case extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            PackageKind::IOSApp => "ipa",
            PackageKind::GenericZip => "zip",
            PackageKind::WindowsApp => "appx",
            PackageKind::WindowsAppBundle => "appxbundle",
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageKind::IOSApp => write!(f, "IOSApp"),
            PackageKind::GenericZip => write!(f, "GenericZip"),
            PackageKind::WindowsApp => write!(f, "WindowsApp"),
            PackageKind::WindowsAppBundle => write!(f, "WindowsAppBundle"),
        }
    }
}

// =============================================================================
// Mapped manifest fields
// =============================================================================

/// Descriptor fields produced by one manifest mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ManifestFields {
    pub display_name: Option<String>,
    pub unique_identifier: Option<String>,
    pub version: Option<String>,
    pub build_version: Option<String>,
    pub executable_name: Option<String>,
    pub minimum_os_version: Option<String>,
    pub device_family: Option<String>,
    pub languages: Vec<String>,
}

// =============================================================================
// Content Descriptor
// =============================================================================

/// Normalized metadata for one package file
///
/// Built once at the end of a successful extraction; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptor {
    original_file_name: String,
    fingerprint: String,
    package_kind: PackageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload_kind: Option<PackageKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unique_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    executable_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum_os_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_hex")]
    icon: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_appx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    languages: Option<Vec<String>>,
}

fn serialize_hex<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => serializer.serialize_str(&hex::encode(bytes)),
        None => serializer.serialize_none(),
    }
}

impl ContentDescriptor {
    pub(crate) fn new(
        original_file_name: String,
        fingerprint: String,
        package_kind: PackageKind,
        payload_kind: Option<PackageKind>,
        fields: ManifestFields,
        icon: Option<ResolvedIcon>,
    ) -> Self {
        let (icon_name, icon, icon_appx) = match icon {
            Some(icon) => (Some(icon.file_name), Some(icon.data), icon.source_package),
            None => (None, None, None),
        };
        Self {
            original_file_name,
            fingerprint,
            package_kind,
            payload_kind,
            display_name: fields.display_name,
            unique_identifier: fields.unique_identifier,
            version: fields.version,
            build_version: fields.build_version,
            executable_name: fields.executable_name,
            minimum_os_version: fields.minimum_os_version,
            device_family: fields.device_family,
            icon_name,
            icon,
            icon_appx,
            languages: (!fields.languages.is_empty()).then_some(fields.languages),
        }
    }

    /// Base name of the input path
    pub fn original_file_name(&self) -> &str {
        &self.original_file_name
    }

    /// Lowercase hex digest of the package bytes
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn package_kind(&self) -> PackageKind {
        self.package_kind
    }

    /// Kind of the app payload found inside a `GenericZip`
    pub fn payload_kind(&self) -> Option<PackageKind> {
        self.payload_kind
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn unique_identifier(&self) -> Option<&str> {
        self.unique_identifier.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn build_version(&self) -> Option<&str> {
        self.build_version.as_deref()
    }

    pub fn executable_name(&self) -> Option<&str> {
        self.executable_name.as_deref()
    }

    pub fn minimum_os_version(&self) -> Option<&str> {
        self.minimum_os_version.as_deref()
    }

    pub fn device_family(&self) -> Option<&str> {
        self.device_family.as_deref()
    }

    /// Base file name of the chosen icon entry
    pub fn icon_name(&self) -> Option<&str> {
        self.icon_name.as_deref()
    }

    pub fn icon(&self) -> Option<&[u8]> {
        self.icon.as_deref()
    }

    /// Nested APPX that supplied the icon (bundles only)
    pub fn icon_appx(&self) -> Option<&str> {
        self.icon_appx.as_deref()
    }

    pub fn languages(&self) -> Option<&[String]> {
        self.languages.as_deref()
    }
}
