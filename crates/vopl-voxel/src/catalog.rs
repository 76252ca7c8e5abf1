//! Catalog of example scenes stored as row-text layers.
//!
//! The source is a JSON document:
//!
//! ```json
//! { "examples": [ { "id": "cube", "name": "Cube", "layers": [["1111", ...], ...] } ] }
//! ```
//!
//! Every example is normalized at load time to exactly `H` layers of exactly
//! `D` rows, each row passed through [`normalize_row`]. Missing or malformed
//! rows and layers become all-zero rows. A catalog is built completely before
//! it becomes visible, so a failed [`ExampleCatalog::reload`] leaves the
//! previous contents in place.

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::extents::GridExtents;
use crate::grid::VoxelGrid;
use crate::row_text::{apply_layers, normalize_row, zero_row};

/// Errors that abort a catalog load.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The source is not valid JSON.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The root value is not an object.
    #[error("catalog root must be an object")]
    RootNotObject,
    /// The `examples` field exists but is not an array.
    #[error("catalog `examples` must be an array")]
    ExamplesNotArray,
    /// An element of `examples` is not an object.
    #[error("example #{0} is not an object")]
    ExampleNotObject(usize),
    /// An example has no string `id`.
    #[error("example #{0} has no string id")]
    MissingId(usize),
    /// Two examples share an id.
    #[error("duplicate example id: {0}")]
    DuplicateId(String),
}

/// One normalized example scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Example {
    id: String,
    name: String,
    /// `layers[y][z]`, exactly `H` × `D` normalized rows.
    layers: Vec<Vec<String>>,
}

impl Example {
    /// Stable identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized rows, indexed `[y][z]`.
    pub fn layers(&self) -> &[Vec<String>] {
        &self.layers
    }

    /// Writes this example's non-zero cells into `grid`.
    ///
    /// Empty cells are skipped, so clear the grid first for a clean result.
    pub fn apply_to(&self, grid: &mut VoxelGrid) -> usize {
        let written = apply_layers(&self.layers, grid);
        tracing::debug!("applied example '{}': {written} cells", self.id);
        written
    }
}

/// `{id, name}` pair returned by [`ExampleCatalog::list`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExampleSummary {
    /// Example id.
    pub id: String,
    /// Example display name.
    pub name: String,
}

/// Loaded examples with O(1) lookup by id and stable listing order.
#[derive(Clone, Debug)]
pub struct ExampleCatalog {
    extents: GridExtents,
    /// Examples in source order.
    examples: Vec<Example>,
    /// id → position in `examples`.
    by_id: FxHashMap<String, usize>,
}

impl ExampleCatalog {
    /// Creates an empty catalog for grids of the given extents.
    pub fn new(extents: GridExtents) -> Self {
        Self {
            extents,
            examples: Vec::new(),
            by_id: FxHashMap::default(),
        }
    }

    /// Parses a complete catalog from JSON source.
    ///
    /// A missing `examples` field yields an empty catalog. An example without
    /// a `name` uses its id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the JSON is invalid or its structure cannot
    /// be interpreted as a list of identified examples.
    pub fn load(source: &str, extents: GridExtents) -> Result<Self, CatalogError> {
        let root: Value = serde_json::from_str(source)?;
        let root = root.as_object().ok_or(CatalogError::RootNotObject)?;

        let mut catalog = Self::new(extents);
        let list = match root.get("examples") {
            None => return Ok(catalog),
            Some(Value::Array(list)) => list,
            Some(_) => return Err(CatalogError::ExamplesNotArray),
        };

        for (position, raw) in list.iter().enumerate() {
            let example = parse_example(position, raw, extents)?;
            if catalog.by_id.contains_key(&example.id) {
                return Err(CatalogError::DuplicateId(example.id));
            }
            catalog.by_id.insert(example.id.clone(), catalog.examples.len());
            catalog.examples.push(example);
        }

        tracing::debug!("loaded example catalog with {} entries", catalog.len());
        Ok(catalog)
    }

    /// Replaces the whole catalog with one parsed from `source`.
    ///
    /// # Errors
    ///
    /// On failure the current contents are kept unchanged.
    pub fn reload(&mut self, source: &str) -> Result<(), CatalogError> {
        match Self::load(source, self.extents) {
            Ok(fresh) => {
                *self = fresh;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("catalog reload failed, keeping previous catalog: {e}");
                Err(e)
            }
        }
    }

    /// Looks up an example by id.
    pub fn get_by_id(&self, id: &str) -> Option<&Example> {
        self.by_id.get(id).map(|&i| &self.examples[i])
    }

    /// `{id, name}` pairs in load order.
    pub fn list(&self) -> Vec<ExampleSummary> {
        self.examples
            .iter()
            .map(|e| ExampleSummary {
                id: e.id.clone(),
                name: e.name.clone(),
            })
            .collect()
    }

    /// Iterates examples in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Example> {
        self.examples.iter()
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Returns `true` if the catalog holds no examples.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Extents every example was normalized to.
    pub fn extents(&self) -> GridExtents {
        self.extents
    }
}

fn parse_example(
    position: usize,
    raw: &Value,
    extents: GridExtents,
) -> Result<Example, CatalogError> {
    let fields = raw
        .as_object()
        .ok_or(CatalogError::ExampleNotObject(position))?;
    let id = fields
        .get("id")
        .and_then(Value::as_str)
        .ok_or(CatalogError::MissingId(position))?
        .to_string();
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| id.clone(), str::to_string);

    let source_layers = fields.get("layers").and_then(Value::as_array);
    if source_layers.is_some_and(|l| l.len() > extents.height as usize) {
        tracing::warn!("example '{id}' has more than {} layers; extras ignored", extents.height);
    }

    let layers = (0..extents.height as usize)
        .map(|y| {
            let rows = source_layers
                .and_then(|l| l.get(y))
                .and_then(Value::as_array);
            normalize_layer(rows.map(Vec::as_slice).unwrap_or_default(), extents)
        })
        .collect();

    Ok(Example { id, name, layers })
}

fn normalize_layer(rows: &[Value], extents: GridExtents) -> Vec<String> {
    let width = extents.width as usize;
    (0..extents.depth as usize)
        .map(|z| match rows.get(z).and_then(Value::as_str) {
            Some(row) => normalize_row(row, width),
            None => zero_row(width),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"{
        "examples": [
            { "id": "diag", "name": "Diagonal", "layers": [["1000", "0200", "0030", "0004"]] },
            { "id": "tokens", "name": "Tokens", "layers": [[], ["10, 20,30"]] },
            { "id": "plain" }
        ]
    }"#;

    fn extents() -> GridExtents {
        GridExtents::new(4, 4, 4)
    }

    #[test]
    fn test_list_preserves_load_order() {
        let catalog = ExampleCatalog::load(SOURCE, extents()).unwrap();
        let ids: Vec<_> = catalog.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["diag", "tokens", "plain"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_name_defaults_to_id() {
        let catalog = ExampleCatalog::load(SOURCE, extents()).unwrap();
        assert_eq!(catalog.get_by_id("plain").unwrap().name(), "plain");
        assert_eq!(catalog.get_by_id("diag").unwrap().name(), "Diagonal");
        assert!(catalog.get_by_id("missing").is_none());
    }

    #[test]
    fn test_short_examples_fill_with_zero_rows() {
        let catalog = ExampleCatalog::load(SOURCE, extents()).unwrap();
        for example in catalog.iter() {
            assert_eq!(example.layers().len(), 4);
            assert!(example.layers().iter().all(|rows| rows.len() == 4));
        }
        let diag = catalog.get_by_id("diag").unwrap();
        assert_eq!(diag.layers()[0][1], "0200");
        assert_eq!(diag.layers()[3], vec!["0000"; 4]);

        let tokens = catalog.get_by_id("tokens").unwrap();
        assert_eq!(tokens.layers()[0], vec!["0000"; 4]);
        assert_eq!(tokens.layers()[1][0], "10, 20,30");
        assert_eq!(tokens.layers()[1][1], "0000");
    }

    #[test]
    fn test_malformed_rows_become_zero() {
        let source = r#"{"examples":[{"id":"x","layers":[[12, null, "12345", "7"], "oops"]}]}"#;
        let catalog = ExampleCatalog::load(source, extents()).unwrap();
        let x = catalog.get_by_id("x").unwrap();
        assert_eq!(x.layers()[0], vec!["0000", "0000", "1234", "7000"]);
        assert_eq!(x.layers()[1], vec!["0000"; 4]);
    }

    #[test]
    fn test_apply_to_grid() {
        let catalog = ExampleCatalog::load(SOURCE, extents()).unwrap();
        let mut grid = VoxelGrid::new(extents());
        assert_eq!(catalog.get_by_id("diag").unwrap().apply_to(&mut grid), 4);
        for i in 0..4 {
            assert_eq!(grid.get(i, 0, i), i as u8 + 1);
        }

        grid.clear();
        assert_eq!(catalog.get_by_id("tokens").unwrap().apply_to(&mut grid), 3);
        assert_eq!(grid.get(0, 1, 0), 10);
        assert_eq!(grid.get(1, 1, 0), 20);
        assert_eq!(grid.get(2, 1, 0), 30);
    }

    #[test]
    fn test_missing_examples_is_empty() {
        let catalog = ExampleCatalog::load("{}", extents()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_structural_errors() {
        let e = extents();
        assert!(matches!(
            ExampleCatalog::load("not json", e),
            Err(CatalogError::Json(_))
        ));
        assert!(matches!(
            ExampleCatalog::load("[]", e),
            Err(CatalogError::RootNotObject)
        ));
        assert!(matches!(
            ExampleCatalog::load(r#"{"examples":{}}"#, e),
            Err(CatalogError::ExamplesNotArray)
        ));
        assert!(matches!(
            ExampleCatalog::load(r#"{"examples":[{"id":"a"},3]}"#, e),
            Err(CatalogError::ExampleNotObject(1))
        ));
        assert!(matches!(
            ExampleCatalog::load(r#"{"examples":[{"name":"a"}]}"#, e),
            Err(CatalogError::MissingId(0))
        ));
        assert!(matches!(
            ExampleCatalog::load(r#"{"examples":[{"id":"a"},{"id":"a"}]}"#, e),
            Err(CatalogError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_failed_reload_keeps_previous() {
        let mut catalog = ExampleCatalog::load(SOURCE, extents()).unwrap();
        assert!(catalog.reload(r#"{"examples":[{"id":"new"},{"oops":1}]}"#).is_err());
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get_by_id("diag").is_some());
        assert!(catalog.get_by_id("new").is_none());
    }

    #[test]
    fn test_successful_reload_replaces_wholesale() {
        let mut catalog = ExampleCatalog::load(SOURCE, extents()).unwrap();
        catalog.reload(r#"{"examples":[{"id":"new","name":"New"}]}"#).unwrap();
        assert_eq!(
            catalog.list(),
            vec![ExampleSummary {
                id: "new".to_string(),
                name: "New".to_string()
            }]
        );
        assert!(catalog.get_by_id("diag").is_none());
    }
}
