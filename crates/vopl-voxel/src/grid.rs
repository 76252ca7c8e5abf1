//! Dense palette-index storage for the editor grid.
//!
//! [`VoxelGrid`] is the single owner of cell state. Every mutation goes
//! through [`VoxelGrid::set`] (or [`VoxelGrid::clear`]), which validates the
//! coordinate and color and bumps a version counter.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extents::{GridExtents, MAX_PALETTE_INDEX};

/// One non-empty cell: "the cell at `index` holds `color`".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SparseEntry {
    /// Linear cell index (`x + y * W + z * W * H`).
    pub index: u32,
    /// Palette index.
    pub color: u8,
}

impl SparseEntry {
    /// Creates an entry.
    pub const fn new(index: u32, color: u8) -> Self {
        Self { index, color }
    }
}

/// Errors returned by grid mutation and comparison.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The coordinate lies outside the grid extents.
    #[error("coordinate ({x}, {y}, {z}) is outside the grid")]
    OutOfBounds {
        /// X coordinate.
        x: u32,
        /// Y coordinate.
        y: u32,
        /// Z coordinate.
        z: u32,
    },
    /// The color does not fit in a 6-bit palette index.
    #[error("palette index {0} exceeds {MAX_PALETTE_INDEX}")]
    ColorOutOfRange(u8),
    /// Two grids with different extents were compared.
    #[error("grid extents differ: {left:?} vs {right:?}")]
    ExtentsMismatch {
        /// Extents of the first grid.
        left: GridExtents,
        /// Extents of the second grid.
        right: GridExtents,
    },
}

/// Dense voxel grid of palette indices. `0` means empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    extents: GridExtents,
    /// One palette index per cell, addressed by linear index.
    cells: Vec<u8>,
    /// Incremented on every accepted mutation.
    version: u64,
}

impl VoxelGrid {
    /// Creates a zero-filled grid.
    pub fn new(extents: GridExtents) -> Self {
        Self {
            extents,
            cells: vec![0; extents.volume()],
            version: 0,
        }
    }

    /// Returns the grid extents.
    pub fn extents(&self) -> GridExtents {
        self.extents
    }

    /// Returns the palette index at `(x, y, z)`, or `0` if out of bounds.
    pub fn get(&self, x: u32, y: u32, z: u32) -> u8 {
        if !self.extents.contains(x, y, z) {
            tracing::warn!("VoxelGrid::get out of bounds: ({}, {}, {})", x, y, z);
            return 0;
        }
        self.cells[self.extents.linear_index(x, y, z) as usize]
    }

    /// Overwrites the cell at `(x, y, z)`. A color of `0` erases it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] or [`GridError::ColorOutOfRange`]
    /// without touching the grid.
    pub fn set(&mut self, x: u32, y: u32, z: u32, color: u8) -> Result<(), GridError> {
        if !self.extents.contains(x, y, z) {
            return Err(GridError::OutOfBounds { x, y, z });
        }
        if color > MAX_PALETTE_INDEX {
            return Err(GridError::ColorOutOfRange(color));
        }
        let index = self.extents.linear_index(x, y, z) as usize;
        self.cells[index] = color;
        self.version += 1;
        Ok(())
    }

    /// Erases every cell.
    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.version += 1;
    }

    /// Returns the mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of non-empty cells.
    pub fn count_non_empty(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    /// Returns `true` if every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    /// Lazily yields every non-empty cell, scanning Y outermost, then Z, then X.
    ///
    /// The scan order is fixed, so identical content always yields an
    /// identical sequence. Call again to restart.
    pub fn non_empty_entries(&self) -> impl Iterator<Item = SparseEntry> + '_ {
        let extents = self.extents;
        (0..extents.height)
            .flat_map(move |y| {
                (0..extents.depth).flat_map(move |z| (0..extents.width).map(move |x| (x, y, z)))
            })
            .filter_map(move |(x, y, z)| {
                let index = extents.linear_index(x, y, z);
                let color = self.cells[index as usize];
                (color != 0).then_some(SparseEntry::new(index, color))
            })
    }
}
