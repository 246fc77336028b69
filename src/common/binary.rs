// Bounds-checked integer reads over byte slices
//
// Header parsers (PNG IHDR, chunk walking) read fixed-width fields at
// offsets that come from untrusted input. These helpers return None instead
// of panicking when the slice is too short.

/// Read a big-endian u32 at `offset`
pub fn read_u32_be(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let field = bytes.get(offset..end)?;
    Some(u32::from_be_bytes([field[0], field[1], field[2], field[3]]))
}

/// Borrow `len` bytes at `offset`
pub fn slice_at(bytes: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    let end = offset.checked_add(len)?;
    bytes.get(offset..end)
}
