//! Column selection on a prepared B.
//!
//! Builds the prepared form of the matrix made of a subset of B's columns
//! (vocabulary shortlisting) directly from prepared B. Each selected
//! column is copied as whole [`TILE_ROWS`]-byte runs, so the result is
//! byte-identical to preparing the column-subset matrix from scratch.

use crate::memory::load_u32;
use crate::tiling::{TILE_ROWS, TileGrid};
use crate::validation::{CallContract, DimensionCheck, Region, validate};
use intgemm_common::{
    COLUMNS_B_MULTIPLIER, Dimension, Fault, Operand, ROWS_B_MULTIPLIER,
    SELECTED_COLUMNS_B_MULTIPLIER,
};

/// Arguments of one column selection call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectColumns {
    pub input: u32,
    pub rows: u32,
    pub cols: u32,
    /// Offset of `size_col_index_list` little-endian u32 column indices.
    pub col_index_list: u32,
    pub size_col_index_list: u32,
    pub output: u32,
}

pub fn select_columns_of_b(memory: &mut [u8], request: &SelectColumns) -> Result<(), Fault> {
    let count = request.size_col_index_list;
    let dims = [
        DimensionCheck::new(Dimension::RowsB, request.rows, ROWS_B_MULTIPLIER),
        DimensionCheck::new(Dimension::ColsB, request.cols, COLUMNS_B_MULTIPLIER),
        DimensionCheck::new(Dimension::SelectedColumns, count, SELECTED_COLUMNS_B_MULTIPLIER),
    ];
    let rows = u64::from(request.rows);
    let regions = [
        Region::of(Operand::PreparedMatrixB, request.input, rows * u64::from(request.cols), 1),
        Region::of(Operand::ColumnIndexList, request.col_index_list, u64::from(count), 4),
        Region::of(Operand::Output, request.output, rows * u64::from(count), 1),
    ];
    validate(&CallContract::new(&dims, &regions), memory.len())?;

    let index_list = request.col_index_list as usize;
    for position in 0..count {
        let index = load_u32(memory, index_list + position as usize * 4);
        if index >= request.cols {
            return Err(Fault::ColumnOutOfRange { index, position, cols: request.cols });
        }
    }

    let source = TileGrid::new(request.rows as usize, request.cols as usize);
    let selected = TileGrid::new(request.rows as usize, count as usize);
    let input = request.input as usize;
    let output = request.output as usize;

    for position in 0..count as usize {
        let index = load_u32(memory, index_list + position * 4) as usize;
        // Indices were checked above; a later one can only change if the
        // output overlaps the index list.
        if index >= source.cols() {
            continue;
        }
        for row_block in 0..source.row_tiles() {
            let from = source.column_run(row_block, index);
            let to = selected.column_run(row_block, position);
            debug_assert_eq!(from.len(), TILE_ROWS);
            memory.copy_within(input + from.start..input + from.end, output + to.start);
        }
    }
    Ok(())
}
