//! Icon resolution
//!
//! Icons are found by naming convention, not by decoding images: every
//! candidate gets an [`IconRank`] and the smallest rank wins. Only the PNG
//! header of each candidate is decompressed for ranking; the winner is then
//! read in full, which also verifies its CRC.
//!
//! ## Module Structure
//! ```text
//! icon/
//! ├── mod.rs      - ResolvedIcon, IconRank, candidate ranking
//! ├── ios.rs      - Info.plist icon keys, Default*@2x.png fallback
//! └── windows.rs  - Manifest logo seeds, scale/targetsize variants, bundles
//! ```

pub mod ios;
pub mod windows;

use std::cmp::Reverse;
use std::io::{Read, Seek};

use tracing::trace;

use crate::common::png_dimensions;
use crate::container::{Container, EntryInfo};
use crate::error::ExtractResult;

/// Enough of a PNG to reach `IHDR`, with room for a leading `CgBI` chunk
pub(crate) const PNG_HEADER_LEN: usize = 4096;

/// The chosen icon, owned apart from any container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIcon {
    /// Full entry path inside its container
    pub entry_name: String,
    /// Base file name of the entry
    pub file_name: String,
    pub data: Vec<u8>,
    /// Nested package that held the icon (bundles only)
    pub source_package: Option<String>,
}

/// Ranking key for icon candidates; smaller is better
///
/// Fields compare in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IconRank {
    seed: usize,
    high_contrast: bool,
    scale: Reverse<u32>,
    target_size: Reverse<u32>,
    area: Reverse<u64>,
    size: Reverse<u64>,
    name_len: usize,
    name: String,
}

/// A name-matched entry awaiting ranking
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub entry: EntryInfo,
    pub seed: usize,
    pub high_contrast: bool,
    /// Percent; unqualified assets are 100
    pub scale: u32,
    pub target_size: u32,
}

impl Candidate {
    fn rank(&self, area: u64) -> IconRank {
        IconRank {
            seed: self.seed,
            high_contrast: self.high_contrast,
            scale: Reverse(self.scale),
            target_size: Reverse(self.target_size),
            area: Reverse(area),
            size: Reverse(self.entry.size),
            name_len: self.entry.name.len(),
            name: self.entry.name.clone(),
        }
    }
}

/// Rank candidates and return the best one
///
/// Entries above `max_icon_size` are dropped before any read.
pub(crate) fn best_candidate<R: Read + Seek>(
    container: &mut Container<R>,
    candidates: Vec<Candidate>,
    max_icon_size: u64,
) -> ExtractResult<Option<(IconRank, EntryInfo)>> {
    let mut best: Option<(IconRank, EntryInfo)> = None;

    for candidate in candidates {
        if candidate.entry.size > max_icon_size {
            trace!(entry = %candidate.entry.name, size = candidate.entry.size, "Icon candidate over size limit");
            continue;
        }

        let header = container.read_prefix(candidate.entry.index, PNG_HEADER_LEN)?;
        let area = png_dimensions(&header)
            .map(|(width, height)| u64::from(width) * u64::from(height))
            .unwrap_or(0);
        let rank = candidate.rank(area);
        trace!(container = %container.label(), entry = %candidate.entry.name, ?rank, "Icon candidate");

        if best.as_ref().map_or(true, |(current, _)| rank < *current) {
            best = Some((rank, candidate.entry));
        }
    }

    Ok(best)
}

/// Read the winning entry in full
pub(crate) fn load_icon<R: Read + Seek>(
    container: &mut Container<R>,
    entry: &EntryInfo,
    source_package: Option<String>,
) -> ExtractResult<ResolvedIcon> {
    let data = container.read_index(entry.index)?;
    Ok(ResolvedIcon {
        entry_name: entry.name.clone(),
        file_name: entry.file_name().to_string(),
        data,
        source_package,
    })
}
