//! Windows package icons
//!
//! A manifest declares logical asset paths (`Assets\SmallTile.png`); the
//! package holds qualified variants of them:
//!
//! ```text
//! Assets/SmallTile.png
//! Assets/SmallTile.scale-400.png
//! Assets/Square44x44Logo.targetsize-48_altform-unplated.png
//! Assets/scale-200/Logo.png
//! Assets/contrast-high/Logo.scale-100.png
//! ```
//!
//! Qualifiers are `_`-separated `name-value` pairs, either between the stem
//! and the extension or as whole directory segments. Matching ignores case.
//! In a bundle the variants are spread over the nested resource packages.

use std::io::{Read, Seek};

use tracing::{debug, instrument, trace, warn};

use super::{best_candidate, load_icon, Candidate, IconRank, ResolvedIcon};
use crate::config::ExtractOptions;
use crate::container::{Container, EntryInfo, MemoryContainer};
use crate::error::ExtractResult;
use crate::package::{kind_for_file_name, PackageKind};

/// Qualifiers parsed from one asset variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qualifiers {
    pub scale: Option<u32>,
    pub target_size: Option<u32>,
    pub high_contrast: bool,
}

impl Qualifiers {
    /// Merge one `name-value[_name-value...]` list; `false` if it is not one
    fn parse_into(&mut self, list: &str) -> bool {
        if list.is_empty() {
            return false;
        }
        for qualifier in list.split('_') {
            let Some((name, value)) = qualifier.split_once('-') else {
                return false;
            };
            if name.is_empty() || value.is_empty() {
                return false;
            }
            match name {
                "scale" => match value.parse() {
                    Ok(scale) => self.scale = Some(scale),
                    Err(_) => return false,
                },
                "targetsize" => match value.parse() {
                    Ok(size) => self.target_size = Some(size),
                    Err(_) => return false,
                },
                "contrast" => self.high_contrast = value != "standard",
                _ => {}
            }
        }
        true
    }
}

/// Normalize a manifest asset path for comparison
fn normalize(path: &str) -> String {
    path.trim()
        .replace('\\', "/")
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_ascii_lowercase()
}

/// Match an entry name against a declared asset path
///
/// Returns the variant's qualifiers, or `None` if the entry is not a variant
/// of `seed`.
pub fn match_variant(seed: &str, entry_name: &str) -> Option<Qualifiers> {
    let seed = normalize(seed);
    let entry = entry_name.to_ascii_lowercase();

    let (seed_dir, seed_file) = seed.rsplit_once('/').unwrap_or(("", seed.as_str()));
    let (entry_dir, entry_file) = entry.rsplit_once('/').unwrap_or(("", entry.as_str()));

    let mut qualifiers = Qualifiers::default();

    // Directory: the seed's own, optionally followed by qualifier segments
    if entry_dir != seed_dir {
        let extra = if seed_dir.is_empty() {
            entry_dir
        } else {
            entry_dir.strip_prefix(seed_dir)?.strip_prefix('/')?
        };
        for segment in extra.split('/') {
            if !qualifiers.parse_into(segment) {
                return None;
            }
        }
    }

    // File: `stem.ext` or `stem.<qualifiers>.ext`
    let Some((stem, extension)) = seed_file.rsplit_once('.') else {
        return (entry_file == seed_file).then_some(qualifiers);
    };
    let rest = entry_file.strip_prefix(stem)?.strip_prefix('.')?;
    if rest == extension {
        return Some(qualifiers);
    }
    let list = rest.strip_suffix(extension)?.strip_suffix('.')?;
    qualifiers.parse_into(list).then_some(qualifiers)
}

/// Variants of every seed, tagged with the seed's index
fn candidates<R: Read + Seek>(container: &Container<R>, seeds: &[String]) -> Vec<Candidate> {
    let mut found = Vec::new();
    for entry in container.files() {
        let matched = seeds
            .iter()
            .enumerate()
            .find_map(|(seed, path)| match_variant(path, &entry.name).map(|q| (seed, q)));
        if let Some((seed, qualifiers)) = matched {
            found.push(Candidate {
                entry: entry.clone(),
                seed,
                high_contrast: qualifiers.high_contrast,
                scale: qualifiers.scale.unwrap_or(100),
                target_size: qualifiers.target_size.unwrap_or(0),
            });
        }
    }
    found
}

fn best_match<R: Read + Seek>(
    container: &mut Container<R>,
    seeds: &[String],
    max_icon_size: u64,
) -> ExtractResult<Option<(IconRank, EntryInfo)>> {
    let found = candidates(container, seeds);
    trace!(container = %container.label(), candidates = found.len(), "Matched logo variants");
    best_candidate(container, found, max_icon_size)
}

/// Best logo variant inside one APPX
#[instrument(skip_all, fields(container = %container.label()))]
pub fn resolve<R: Read + Seek>(
    container: &mut Container<R>,
    seeds: &[String],
    max_icon_size: u64,
) -> ExtractResult<Option<ResolvedIcon>> {
    let Some((_, entry)) = best_match(container, seeds, max_icon_size)? else {
        debug!("No logo variant found");
        return Ok(None);
    };
    debug!(entry = %entry.name, "Icon selected");
    load_icon(container, &entry, None).map(Some)
}

/// Best logo variant across every nested APPX of a bundle
///
/// Each nested package is read into memory and searched with the same
/// seeds. A nested package that is not a readable ZIP is skipped.
/// `application` is the bundle entry index and open container of a package
/// the caller already read; it is searched in place of that entry.
#[instrument(skip_all, fields(container = %bundle.label()))]
pub fn resolve_bundle<R: Read + Seek>(
    bundle: &mut Container<R>,
    mut application: Option<(usize, &mut MemoryContainer)>,
    seeds: &[String],
    options: &ExtractOptions,
) -> ExtractResult<Option<ResolvedIcon>> {
    let packages: Vec<EntryInfo> = bundle
        .files()
        .filter(|entry| kind_for_file_name(entry.file_name()) == Some(PackageKind::WindowsApp))
        .cloned()
        .collect();

    let mut best: Option<(IconRank, ResolvedIcon)> = None;

    for package in packages {
        if let Some((index, opened)) = application.as_mut() {
            if *index == package.index {
                trace!(package = %package.name, "Reusing open application package");
                consider_package(&mut **opened, seeds, options.max_icon_size, &mut best)?;
                continue;
            }
        }

        if package.size > options.max_nested_package_size {
            warn!(package = %package.name, size = package.size, "Skipping nested package over size limit");
            continue;
        }

        let data = bundle.read_index(package.index)?;
        let mut nested = match MemoryContainer::from_bytes(package.file_name(), data) {
            Ok(nested) => nested,
            Err(e) => {
                warn!(package = %package.name, error = %e, "Skipping unreadable nested package");
                continue;
            }
        };
        consider_package(&mut nested, seeds, options.max_icon_size, &mut best)?;
        nested.close();
    }

    match &best {
        Some((_, icon)) => debug!(
            entry = %icon.entry_name,
            package = icon.source_package.as_deref().unwrap_or_default(),
            "Icon selected"
        ),
        None => debug!("No logo variant found in nested packages"),
    }
    Ok(best.map(|(_, icon)| icon))
}

/// Replace `best` if this package holds a better variant
fn consider_package(
    nested: &mut MemoryContainer,
    seeds: &[String],
    max_icon_size: u64,
    best: &mut Option<(IconRank, ResolvedIcon)>,
) -> ExtractResult<()> {
    let Some((rank, entry)) = best_match(nested, seeds, max_icon_size)? else {
        return Ok(());
    };
    if best.as_ref().map_or(true, |(current, _)| rank < *current) {
        let label = nested.label().to_string();
        let icon = load_icon(nested, &entry, Some(label))?;
        *best = Some((rank, icon));
    }
    Ok(())
}
