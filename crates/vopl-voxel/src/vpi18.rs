//! VPI18: sparse voxel entries packed as 18-bit records.
//!
//! ## Record Layout
//!
//! | Bits (MSB first) | Width | Field |
//! |------------------|-------|-------|
//! | 17..6 | 12 | Linear cell index (`index & 0xFFF`) |
//! | 5..0 | 6 | Palette index (`color & 0x3F`) |
//!
//! Records are concatenated with no padding, header, magic or length prefix.
//! A stream of N records occupies `ceil(18 × N / 8)` bytes and any spare bits
//! in the last byte are zero. Decoders read `floor(8 × len / 18)` records and
//! ignore the incomplete tail.
//!
//! Indices wider than 12 bits and colors wider than 6 bits are masked on
//! encode. That caps the format at 4096 addressable cells.

use crate::bit_io::{BitReader, BitWriter};
use crate::extents::GridExtents;
use crate::grid::{SparseEntry, VoxelGrid};

/// Bits per record.
pub const RECORD_BITS: u32 = 18;

/// Bits used by the index field.
pub const INDEX_BITS: u32 = 12;

/// Bits used by the color field.
pub const COLOR_BITS: u32 = 6;

const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
const COLOR_MASK: u8 = (1 << COLOR_BITS) - 1;

/// Number of bytes needed to encode `records` entries.
pub fn encoded_len(records: usize) -> usize {
    (records * RECORD_BITS as usize).div_ceil(8)
}

/// Number of complete records contained in `byte_len` bytes.
pub fn record_count(byte_len: usize) -> usize {
    byte_len * 8 / RECORD_BITS as usize
}

/// Packs entries into a VPI18 byte stream, preserving their order.
pub fn encode<I>(entries: I) -> Vec<u8>
where
    I: IntoIterator<Item = SparseEntry>,
{
    let entries = entries.into_iter();
    let mut writer = BitWriter::with_capacity(entries.size_hint().0 * RECORD_BITS as usize);
    for entry in entries {
        let index = u64::from(entry.index & INDEX_MASK);
        let color = u64::from(entry.color & COLOR_MASK);
        writer.write_bits((index << COLOR_BITS) | color, RECORD_BITS);
    }
    writer.into_bytes()
}

/// Encodes every non-empty cell of `grid` in scan order.
pub fn encode_grid(grid: &VoxelGrid) -> Vec<u8> {
    encode(grid.non_empty_entries())
}

/// Unpacks every complete record in `data`.
///
/// Trailing bits that do not form a full record are dropped.
pub fn decode(data: &[u8]) -> Vec<SparseEntry> {
    let mut reader = BitReader::new(data);
    let mut entries = Vec::with_capacity(record_count(data.len()));
    while let Some(value) = reader.read_bits(RECORD_BITS) {
        entries.push(SparseEntry {
            index: (value >> COLOR_BITS) as u32 & INDEX_MASK,
            color: value as u8 & COLOR_MASK,
        });
    }
    entries
}

/// Decodes `data` and hands each in-bounds record to `setter(x, y, z, color)`.
///
/// Records whose index decomposes outside `extents` are skipped. A color of
/// `0` is passed through, so such records clear their cell. Returns the number
/// of setter calls.
pub fn apply<F>(data: &[u8], extents: GridExtents, mut setter: F) -> usize
where
    F: FnMut(u32, u32, u32, u8),
{
    let mut applied = 0;
    let mut dropped = 0;
    for entry in decode(data) {
        match extents.checked_coordinates_of(entry.index) {
            Some((x, y, z)) => {
                setter(x, y, z, entry.color);
                applied += 1;
            }
            None => dropped += 1,
        }
    }
    tracing::debug!("VPI18 apply: {applied} records applied, {dropped} out of range");
    applied
}

/// Applies a VPI18 stream onto `grid` in place.
pub fn apply_to_grid(data: &[u8], grid: &mut VoxelGrid) -> usize {
    let extents = grid.extents();
    apply(data, extents, |x, y, z, color| {
        // Coordinates are pre-checked and colors are 6-bit, so this cannot fail.
        if let Err(e) = grid.set(x, y, z, color) {
            tracing::warn!("VPI18 apply rejected by grid: {e}");
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
