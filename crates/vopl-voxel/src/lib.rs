//! Voxel grid storage and the interchange codecs used by the VOPL editor.
//!
//! - [`vpi18`]: bit-packed 18-bit index/color records.
//! - [`updates`]: chunk-keyed sparse JSON documents.
//! - [`row_text`]: row-oriented text layers in two dialects.
//! - [`catalog`]: example scenes built from row-text layers.
//! - [`conversion`]: checked calls into the external conversion service.

pub mod bit_io;
pub mod catalog;
pub mod conversion;
pub mod extents;
pub mod grid;
pub mod row_text;
pub mod updates;
pub mod vpi18;

pub use catalog::{CatalogError, Example, ExampleCatalog, ExampleSummary};
pub use conversion::{
    ConversionBoundary, ConversionError, ConversionOp, ConversionService, ServiceReply,
};
pub use extents::{DEFAULT_SIZE, GridExtents, MAX_PALETTE_INDEX};
pub use grid::{GridError, SparseEntry, VoxelGrid};
pub use row_text::RowText;
pub use updates::{UpdatesDocument, UpdatesError};
