//! Manifest decoding
//!
//! ## Module Structure
//! ```text
//! manifest/
//! ├── mod.rs    - Re-exports
//! ├── value.rs  - ManifestValue / Dictionary tree for property lists
//! ├── plist.rs  - Binary and XML Info.plist decoding
//! └── appx.rs   - AppxManifest.xml and AppxBundleManifest.xml
//! ```

pub mod appx;
pub mod plist;
pub mod value;

// Re-exports for convenience
pub use self::appx::{
    parse_bundle_manifest, parse_package_manifest, AppxManifest, BundleManifest, BundlePackage,
    BundlePackageType, XmlElement, APPX_BUNDLE_MANIFEST_PATH, APPX_MANIFEST_PATH,
};
pub use self::plist::{decode, decode_dictionary, detect_format, PlistFormat};
pub use self::value::{Dictionary, ManifestValue};
