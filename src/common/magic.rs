//! Signature checks for the formats found inside app packages
//!
//! Only the signatures the extractor needs: the binary plist magic, and PNG
//! with its `IHDR` header for icon ranking.

use super::binary::{read_u32_be, slice_at};

// =============================================================================
// Magic Signatures
// =============================================================================

pub const BPLIST_MAGIC: &[u8] = b"bplist00";
pub const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Apple's Xcode-optimized PNGs put a `CgBI` chunk ahead of `IHDR`
const CGBI_CHUNK: &[u8] = b"CgBI";
const IHDR_CHUNK: &[u8] = b"IHDR";

pub fn is_binary_plist(data: &[u8]) -> bool {
    data.starts_with(BPLIST_MAGIC)
}

pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(PNG_MAGIC)
}

/// Read `(width, height)` from a PNG header
///
/// Chunk layout: `[length u32 BE][type 4][data length][crc 4]`. Walks past a
/// leading `CgBI` chunk; any other chunk before `IHDR` means the file is not
/// a well-formed PNG.
pub fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if !is_png(data) {
        return None;
    }

    let mut pos = PNG_MAGIC.len();
    loop {
        let length = read_u32_be(data, pos)? as usize;
        let chunk_type = slice_at(data, pos + 4, 4)?;

        if chunk_type == IHDR_CHUNK {
            let width = read_u32_be(data, pos + 8)?;
            let height = read_u32_be(data, pos + 12)?;
            return Some((width, height));
        }
        if chunk_type != CGBI_CHUNK {
            return None;
        }

        pos = pos.checked_add(12)?.checked_add(length)?;
    }
}

#[cfg(test)]
pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut data = PNG_MAGIC.to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(IHDR_CHUNK);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data.extend_from_slice(&[0, 0, 0, 0]);
    data
}
