//! Row-text layers: one string per (layer, depth slice), `W` cells wide.
//!
//! Two dialects share the format and are told apart per row:
//!
//! - **Tokens**: the row contains a comma or any whitespace. Cells are decimal
//!   integers separated by runs of commas/whitespace, e.g. `"3, 5,7"`.
//! - **Fixed width**: otherwise. Each character is one cell and only digits
//!   `0`-`9` can be expressed, e.g. `"305"`.
//!
//! Parsing never fails. Bad tokens become `0`, short rows are padded with `0`
//! and long rows are truncated to the grid width.

use crate::extents::MAX_PALETTE_INDEX;
use crate::grid::VoxelGrid;

/// A row after dialect classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowText<'a> {
    /// Delimiter-separated decimal tokens.
    Tokens(&'a str),
    /// One digit per cell.
    FixedWidth(&'a str),
}

impl<'a> RowText<'a> {
    /// Classifies `row` by looking for a comma or whitespace.
    pub fn classify(row: &'a str) -> Self {
        if row.chars().any(is_token_separator) {
            Self::Tokens(row)
        } else {
            Self::FixedWidth(row)
        }
    }

    /// Decodes the row into exactly `width` palette indices.
    pub fn parse(self, width: usize) -> Vec<u8> {
        match self {
            Self::Tokens(row) => parse_tokens(row, width),
            Self::FixedWidth(row) => parse_fixed_width(row, width),
        }
    }

    /// Returns `true` for the token dialect.
    pub fn is_tokens(&self) -> bool {
        matches!(self, Self::Tokens(_))
    }
}

/// Classifies and decodes `row` into exactly `width` palette indices.
pub fn parse_row(row: &str, width: usize) -> Vec<u8> {
    RowText::classify(row).parse(width)
}

/// Canonicalizes a stored row.
///
/// Token rows are trimmed and otherwise left alone. Fixed-width rows are
/// padded with `'0'` or truncated to exactly `width` characters.
pub fn normalize_row(row: &str, width: usize) -> String {
    match RowText::classify(row) {
        RowText::Tokens(row) => row.trim().to_string(),
        RowText::FixedWidth(row) => {
            let mut out: String = row.chars().take(width).collect();
            let missing = width.saturating_sub(out.chars().count());
            out.extend(std::iter::repeat_n('0', missing));
            out
        }
    }
}

/// An all-empty fixed-width row.
pub fn zero_row(width: usize) -> String {
    "0".repeat(width)
}

/// Writes row-text layers into `grid`.
///
/// `layers[y][z]` is the row at height `y` and depth `z`. Only non-zero cells
/// are written; zero cells leave the grid untouched, so applying onto a
/// non-empty grid overlays rather than replaces. Missing layers or rows count
/// as empty. Returns the number of cells written.
pub fn apply_layers<L, R>(layers: L, grid: &mut VoxelGrid) -> usize
where
    L: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let extents = grid.extents();
    let width = extents.width as usize;
    let mut written = 0;
    for (y, rows) in (0..extents.height).zip(layers) {
        for (z, row) in (0..extents.depth).zip(rows) {
            let cells = parse_row(row.as_ref(), width);
            for (x, color) in (0..extents.width).zip(cells) {
                if color == 0 {
                    continue;
                }
                match grid.set(x, y, z, color) {
                    Ok(()) => written += 1,
                    Err(e) => tracing::warn!("row-text cell rejected by grid: {e}"),
                }
            }
        }
    }
    written
}

fn is_token_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

fn parse_tokens(row: &str, width: usize) -> Vec<u8> {
    let mut cells: Vec<u8> = row
        .split(is_token_separator)
        .filter(|token| !token.is_empty())
        .take(width)
        .map(parse_token)
        .collect();
    cells.resize(width, 0);
    cells
}

/// Reads an optional sign and the leading run of decimal digits, so `"5abc"`
/// and `"3.7"` read as 5 and 3. No digits, or a value outside the palette,
/// reads as 0.
fn parse_token(token: &str) -> u8 {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];
    if digits.is_empty() {
        return 0;
    }
    // Negative values are outside the palette and "-0" is 0 anyway.
    if token.starts_with('-') {
        return 0;
    }
    match digits.parse::<u64>() {
        Ok(v) if v <= u64::from(MAX_PALETTE_INDEX) => v as u8,
        _ => 0,
    }
}

fn parse_fixed_width(row: &str, width: usize) -> Vec<u8> {
    let mut cells: Vec<u8> = row
        .chars()
        .take(width)
        .map(|c| c.to_digit(10).map_or(0, |d| d as u8))
        .collect();
    cells.resize(width, 0);
    cells
}
