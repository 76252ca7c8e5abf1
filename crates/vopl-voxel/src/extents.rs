//! Grid extents and the linear-index bijection used by every codec.
//!
//! Linear indices are laid out Z-major, then Y, with X varying fastest:
//! `index = x + y * W + z * W * H`. Each Y layer of a Z slab is therefore
//! contiguous, which mirrors the row-text layout.

use serde::{Deserialize, Serialize};

/// Default side length of the editor grid.
pub const DEFAULT_SIZE: u32 = 16;

/// Highest addressable palette index. Index 0 is reserved for "empty".
pub const MAX_PALETTE_INDEX: u8 = 63;

/// Fixed dimensions of a voxel grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridExtents {
    /// Cells along X.
    pub width: u32,
    /// Cells along Y (number of layers).
    pub height: u32,
    /// Cells along Z (rows per layer).
    pub depth: u32,
}

impl GridExtents {
    /// Creates extents of the given size.
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Total number of cells (`W * H * D`).
    pub fn volume(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Returns `true` if `(x, y, z)` lies inside the grid.
    pub fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        x < self.width && y < self.height && z < self.depth
    }

    /// Converts `(x, y, z)` to a linear index (x varies fastest).
    ///
    /// Coordinates must be inside the extents and the volume must fit in a
    /// `u32`; both are only debug-asserted.
    pub fn linear_index(&self, x: u32, y: u32, z: u32) -> u32 {
        debug_assert!(self.contains(x, y, z), "({x}, {y}, {z}) outside {self:?}");
        debug_assert!(self.fits_u32_index(), "{self:?} too large for u32 indices");
        let (w, h) = (u64::from(self.width), u64::from(self.height));
        (u64::from(x) + u64::from(y) * w + u64::from(z) * w * h) as u32
    }

    /// Returns `true` if every cell has a `u32` linear index.
    pub fn fits_u32_index(&self) -> bool {
        self.volume() as u64 <= u64::from(u32::MAX) + 1
    }

    /// Inverse of [`linear_index`](Self::linear_index).
    ///
    /// Indices past the end of the grid decompose to a `z` outside the
    /// extents; use [`checked_coordinates_of`](Self::checked_coordinates_of)
    /// when the index comes from untrusted input.
    pub fn coordinates_of(&self, index: u32) -> (u32, u32, u32) {
        let index = u64::from(index);
        let width = u64::from(self.width);
        let layer = width * u64::from(self.height);
        let z = index / layer;
        let rem = index % layer;
        // Each part is at most `index`, so it fits back into u32.
        ((rem % width) as u32, (rem / width) as u32, z as u32)
    }

    /// Decomposes `index`, returning `None` if the result falls outside the grid.
    pub fn checked_coordinates_of(&self, index: u32) -> Option<(u32, u32, u32)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let (x, y, z) = self.coordinates_of(index);
        self.contains(x, y, z).then_some((x, y, z))
    }
}

impl Default for GridExtents {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE, DEFAULT_SIZE, DEFAULT_SIZE)
    }
}
