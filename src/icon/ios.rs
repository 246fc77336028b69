//! iOS app icons
//!
//! `Info.plist` names icons by stem; the files carry suffixes:
//!
//! ```text
//! CFBundleIconFiles = ["AppIcon60x60"]
//! Payload/Test.app/AppIcon60x60@2x.png
//! Payload/Test.app/AppIcon60x60@3x.png
//! Payload/Test.app/AppIcon76x76~ipad.png
//! ```
//!
//! Without declared icons the largest `Default*@2x.png` launch image is used.

use std::io::{Read, Seek};

use tracing::{debug, instrument, trace};

use super::{best_candidate, load_icon, Candidate, ResolvedIcon};
use crate::container::{pattern, Container};
use crate::error::ExtractResult;
use crate::manifest::Dictionary;

/// Icon declarations, most preferred first
const ICON_KEY_PATHS: &[&[&str]] = &[
    &["CFBundleIcons", "CFBundlePrimaryIcon", "CFBundleIconFiles"],
    &["CFBundleIcons~ipad", "CFBundlePrimaryIcon", "CFBundleIconFiles"],
    &["CFBundleIconFiles"],
    &["CFBundleIconFile"],
];

const LAUNCH_IMAGE_PATTERN: &str = "Default*@2x.png";

/// Declared icon names in key order, without duplicates
pub fn declared_icon_names(info: &Dictionary) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for path in ICON_KEY_PATHS {
        let Some(value) = info.get_path(path) else {
            continue;
        };
        for name in value.to_string_list() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Declared name without its `.png` extension
fn stem(name: &str) -> &str {
    match name.len().checked_sub(4) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".png") => &name[..cut],
        _ => name,
    }
}

/// Scale from an `@Nx` suffix, in percent
fn scale_of(file_name: &str) -> u32 {
    file_name
        .rsplit_once('@')
        .and_then(|(_, rest)| {
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            let after = &rest[digits.len()..];
            after.starts_with(['x', 'X']).then(|| digits.parse::<u32>().ok()).flatten()
        })
        .map_or(100, |factor| factor.saturating_mul(100))
}

/// Best declared icon, else the best launch image, from the app directory
///
/// `app_dir` is the `Payload/<name>.app/` prefix, with trailing slash.
#[instrument(skip_all, fields(container = %container.label(), app_dir = %app_dir))]
pub fn resolve<R: Read + Seek>(
    container: &mut Container<R>,
    app_dir: &str,
    info: &Dictionary,
    max_icon_size: u64,
) -> ExtractResult<Option<ResolvedIcon>> {
    let declared = declared_icon_names(info);
    let stems: Vec<String> = declared.iter().map(|name| stem(name).to_ascii_lowercase()).collect();
    trace!(?declared, "Declared icon names");

    let mut found = Vec::new();
    if !stems.is_empty() {
        for entry in container.files() {
            let Some(file_name) = entry.name.strip_prefix(app_dir) else {
                continue;
            };
            if file_name.contains('/') {
                continue;
            }
            let lower = file_name.to_ascii_lowercase();
            if !lower.ends_with(".png") || !stems.iter().any(|stem| lower.starts_with(stem.as_str())) {
                continue;
            }
            found.push(Candidate {
                entry: entry.clone(),
                seed: 0,
                high_contrast: false,
                scale: scale_of(file_name),
                target_size: 0,
            });
        }
    }

    if found.is_empty() {
        // The app directory is a literal prefix; only the file name is globbed
        found = container
            .files()
            .filter(|entry| {
                entry
                    .name
                    .strip_prefix(app_dir)
                    .is_some_and(|file_name| pattern::matches(LAUNCH_IMAGE_PATTERN, file_name))
            })
            .map(|entry| Candidate {
                entry: entry.clone(),
                seed: 0,
                high_contrast: false,
                scale: scale_of(entry.file_name()),
                target_size: 0,
            })
            .collect();
        trace!(candidates = found.len(), "Falling back to launch images");
    }

    let Some((_, entry)) = best_candidate(container, found, max_icon_size)? else {
        debug!("No icon found");
        return Ok(None);
    };
    debug!(entry = %entry.name, "Icon selected");
    load_icon(container, &entry, None).map(Some)
}
