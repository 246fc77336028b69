//! App package metadata extraction
//!
//! Reads IPA, ZIP, APPX and APPXBUNDLE files and returns one normalized
//! [`ContentDescriptor`]: identity fields from the embedded manifest, the
//! best icon asset, and a fingerprint over the package bytes.
//!
//! ```no_run
//! let descriptor = app_extractor::run("Calculator.appxbundle")?;
//! println!("{:?} {:?}", descriptor.unique_identifier(), descriptor.languages());
//! # Ok::<(), app_extractor::ExtractError>(())
//! ```
//!
//! ## Module Structure
//! ```text
//! src/
//! ├── extract/    - Pipeline entry points and per-kind field mapping
//! ├── package/    - PackageKind, ContentDescriptor, detection
//! ├── container/  - ZIP container reader and entry patterns
//! ├── manifest/   - Property list and APPX manifest decoders
//! ├── icon/       - Icon candidate matching and ranking
//! ├── common/     - Fingerprint hashing, signatures, byte helpers
//! ├── config.rs   - ExtractOptions
//! ├── error.rs    - ExtractError
//! └── logging.rs  - Subscriber setup for the binary
//! ```

pub mod common;
pub mod config;
pub mod container;
pub mod error;
pub mod extract;
pub mod icon;
pub mod logging;
pub mod manifest;
pub mod package;

// Re-exports for convenience
pub use common::HashAlgorithm;
pub use config::ExtractOptions;
pub use error::{ErrorKind, ExtractError, ExtractResult};
pub use extract::{run, run_async, run_async_with_options, run_with_options, Extractor};
pub use package::{ContentDescriptor, PackageKind};
