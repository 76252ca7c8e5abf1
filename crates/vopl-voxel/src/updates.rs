//! Sparse "updates" documents keyed by chunk id.
//!
//! The document shape is `{ "<chunkId>": { "<decimalIndex>": <color>, ... } }`.
//! Writers always emit a single chunk. Readers consult only the first chunk
//! key in document order; any further chunks are ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::extents::{GridExtents, MAX_PALETTE_INDEX};
use crate::grid::{GridError, SparseEntry, VoxelGrid};

/// Chunk id used when the caller has no better name.
pub const DEFAULT_CHUNK_ID: &str = "0";

/// Errors raised while reading an updates document from text.
#[derive(Debug, Error)]
pub enum UpdatesError {
    /// The text is not valid JSON.
    #[error("invalid updates JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The root value is not an object.
    #[error("updates document root must be an object, found {0}")]
    NotAnObject(&'static str),
}

/// A chunk-keyed sparse document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdatesDocument(Map<String, Value>);

impl UpdatesDocument {
    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`UpdatesError::Json`] for malformed JSON and
    /// [`UpdatesError::NotAnObject`] when the root is not an object.
    pub fn from_json(text: &str) -> Result<Self, UpdatesError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(UpdatesError::NotAnObject(json_kind(&other))),
        }
    }

    /// Serializes with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, UpdatesError> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Serializes without whitespace.
    pub fn to_json(&self) -> Result<String, UpdatesError> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Chunk ids in document order.
    pub fn chunk_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The first chunk in document order, which is the only one decoded.
    pub fn first_chunk(&self) -> Option<(&str, &Value)> {
        self.0.iter().next().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if the document has no chunks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for UpdatesDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Builds a single-chunk document from `entries`, verbatim and in order.
pub fn encode<I>(entries: I, chunk_id: &str) -> UpdatesDocument
where
    I: IntoIterator<Item = SparseEntry>,
{
    let inner: Map<String, Value> = entries
        .into_iter()
        .map(|e| (e.index.to_string(), Value::from(e.color)))
        .collect();
    let mut outer = Map::new();
    outer.insert(chunk_id.to_string(), Value::Object(inner));
    UpdatesDocument(outer)
}

/// Encodes every non-empty cell of `grid` under `chunk_id`.
pub fn encode_grid(grid: &VoxelGrid, chunk_id: &str) -> UpdatesDocument {
    encode(grid.non_empty_entries(), chunk_id)
}

/// Applies the first chunk of `document` through `setter(x, y, z, color)`.
///
/// Keys that are not decimal indices or that decompose outside `extents` are
/// dropped. Colors are truncated to integers, and anything that does not
/// land in `0..=63` is coerced to `0`.
/// Returns the number of setter calls.
pub fn decode<F>(document: &UpdatesDocument, extents: GridExtents, mut setter: F) -> usize
where
    F: FnMut(u32, u32, u32, u8),
{
    let Some((chunk_id, chunk)) = document.first_chunk() else {
        return 0;
    };
    let Some(cells) = chunk.as_object() else {
        tracing::warn!("updates chunk '{chunk_id}' is not an object; nothing applied");
        return 0;
    };

    let mut applied = 0;
    let mut dropped = 0;
    for (key, value) in cells {
        let coords = key
            .parse::<u32>()
            .ok()
            .and_then(|index| extents.checked_coordinates_of(index));
        match coords {
            Some((x, y, z)) => {
                setter(x, y, z, coerce_color(value));
                applied += 1;
            }
            None => dropped += 1,
        }
    }
    tracing::debug!("updates chunk '{chunk_id}': {applied} cells applied, {dropped} dropped");
    applied
}

/// Parses `text` and applies it like [`decode`].
///
/// # Errors
///
/// Returns an error only when the text is not a JSON object.
pub fn decode_str<F>(text: &str, extents: GridExtents, setter: F) -> Result<usize, UpdatesError>
where
    F: FnMut(u32, u32, u32, u8),
{
    let document = UpdatesDocument::from_json(text)?;
    Ok(decode(&document, extents, setter))
}

/// Applies the first chunk of `document` onto `grid` in place.
pub fn apply_to_grid(document: &UpdatesDocument, grid: &mut VoxelGrid) -> usize {
    let extents = grid.extents();
    decode(document, extents, |x, y, z, color| {
        if let Err(e) = grid.set(x, y, z, color) {
            tracing::warn!("updates apply rejected by grid: {e}");
        }
    })
}

/// Lists cells whose value changed from `previous` to `next` and are now non-empty.
///
/// Cells that went from a color back to empty are not reported; an updates
/// document built from this list cannot express erasure.
///
/// # Errors
///
/// Returns [`GridError::ExtentsMismatch`] if the grids differ in size.
pub fn diff(previous: &VoxelGrid, next: &VoxelGrid) -> Result<Vec<SparseEntry>, GridError> {
    if previous.extents() != next.extents() {
        return Err(GridError::ExtentsMismatch {
            left: previous.extents(),
            right: next.extents(),
        });
    }
    let extents = next.extents();
    Ok(next
        .non_empty_entries()
        .filter(|entry| {
            let (x, y, z) = extents.coordinates_of(entry.index);
            previous.get(x, y, z) != entry.color
        })
        .collect())
}

/// Numbers truncate toward zero and numeric strings are read as numbers.
/// Anything else, or a result outside the palette, is 0.
fn coerce_color(value: &Value) -> u8 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number.map(f64::trunc) {
        Some(c) if c.is_finite() && (0.0..=f64::from(MAX_PALETTE_INDEX)).contains(&c) => c as u8,
        _ => 0,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
