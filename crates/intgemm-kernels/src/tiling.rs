//! Index mapping between logical B coordinates and the packed layout.
//!
//! A `rows × cols` B matrix is cut into tiles of [`TILE_ROWS`] × [`TILE_COLS`]
//! elements. Tiles are stored column-block-major, so all row blocks of the
//! first eight columns come first:
//!
//! ```text
//! tile(rb, cb) = cb * (rows / TILE_ROWS) + rb
//! ```
//!
//! Inside a tile each column is one contiguous run of [`TILE_ROWS`] bytes,
//! which is the K-slice the multiply kernel loads into a single register:
//!
//! ```text
//! packed(r, c) = tile(r / TILE_ROWS, c / TILE_COLS) * TILE_BYTES
//!              + (c % TILE_COLS) * TILE_ROWS
//!              + (r % TILE_ROWS)
//! ```
//!
//! Everything here is pure arithmetic on indices; memory is touched only by
//! the packers that apply these mappings.

use std::ops::Range;

pub use intgemm_common::{TILE_BYTES, TILE_COLS, TILE_ROWS};

/// Tile decomposition of a B matrix whose dimensions are tile multiples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
}

impl TileGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        debug_assert!(rows % TILE_ROWS == 0 && cols % TILE_COLS == 0);
        Self { rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of elements (and packed bytes).
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row_tiles(&self) -> usize {
        self.rows / TILE_ROWS
    }

    pub fn col_tiles(&self) -> usize {
        self.cols / TILE_COLS
    }

    pub fn tile_count(&self) -> usize {
        self.row_tiles() * self.col_tiles()
    }

    /// Packed position of the tile holding `(row, col)`.
    #[inline]
    pub fn tile_index(&self, row: usize, col: usize) -> usize {
        (col / TILE_COLS) * self.row_tiles() + row / TILE_ROWS
    }

    /// Logical `(row, col)` of the first element of packed tile `tile`.
    #[inline]
    pub fn tile_origin(&self, tile: usize) -> (usize, usize) {
        let row_tiles = self.row_tiles();
        ((tile % row_tiles) * TILE_ROWS, (tile / row_tiles) * TILE_COLS)
    }

    /// Packed byte range of tile `tile`.
    #[inline]
    pub fn tile_span(&self, tile: usize) -> Range<usize> {
        let start = tile * TILE_BYTES;
        start..start + TILE_BYTES
    }

    /// Packed index of logical element `(row, col)`.
    #[inline]
    pub fn packed_index(&self, row: usize, col: usize) -> usize {
        self.tile_index(row, col) * TILE_BYTES + local_index(row % TILE_ROWS, col % TILE_COLS)
    }

    /// Inverse of [`packed_index`](Self::packed_index).
    #[inline]
    pub fn logical_position(&self, packed: usize) -> (usize, usize) {
        let (row0, col0) = self.tile_origin(packed / TILE_BYTES);
        let within = packed % TILE_BYTES;
        (row0 + within % TILE_ROWS, col0 + within / TILE_ROWS)
    }

    /// Packed byte range holding rows `[row_block * TILE_ROWS, +TILE_ROWS)` of column `col`.
    #[inline]
    pub fn column_run(&self, row_block: usize, col: usize) -> Range<usize> {
        let start = self.packed_index(row_block * TILE_ROWS, col);
        start..start + TILE_ROWS
    }
}

/// Offset of `(local_row, local_col)` inside one tile.
#[inline]
pub fn local_index(local_row: usize, local_col: usize) -> usize {
    local_col * TILE_ROWS + local_row
}

#[inline]
pub fn row_major_index(row: usize, col: usize, cols: usize) -> usize {
    row * cols + col
}

#[inline]
pub fn column_major_index(row: usize, col: usize, rows: usize) -> usize {
    col * rows + row
}

/// Recover the row-major int8 matrix from packed bytes.
pub fn unpack_b(packed: &[u8], rows: usize, cols: usize) -> Vec<i8> {
    let grid = TileGrid::new(rows, cols);
    let mut out = vec![0i8; grid.len()];
    for (packed_idx, &byte) in packed.iter().take(grid.len()).enumerate() {
        let (row, col) = grid.logical_position(packed_idx);
        out[row_major_index(row, col, cols)] = byte as i8;
    }
    out
}
