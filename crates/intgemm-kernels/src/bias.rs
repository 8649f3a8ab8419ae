//! Bias preparation for the shifted-activation multiply.
//!
//! Activations are stored as `q_a + A_SHIFT`, so the multiply accumulates
//! `A_SHIFT * Σ_k B[k][j]` on top of the true product for every column `j`.
//! Folding the dequantized amount into the bias once, ahead of time, removes
//! it again:
//!
//! ```text
//! out[j] = bias[j] - A_SHIFT * scale_a * scale_b * Σ_k B[k][j]
//! ```
//!
//! Zero points are carried for interface symmetry; the compensation assumes
//! symmetric quantization.

use crate::memory::{load_f32, store_f32};
use crate::tiling::TileGrid;
use crate::validation::{CallContract, DimensionCheck, Region, validate};
use intgemm_common::{
    A_SHIFT, COLUMNS_B_MULTIPLIER, Dimension, Fault, Operand, QuantizationParams, ROWS_B_MULTIPLIER,
};

/// Arguments of one bias preparation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepareBias {
    pub input_prepared_b: u32,
    pub a: QuantizationParams,
    pub b: QuantizationParams,
    pub rows: u32,
    pub cols: u32,
    pub input_bias: u32,
    /// May equal `input_bias` to prepare in place.
    pub output: u32,
}

impl PrepareBias {
    /// Multiplier applied to each column sum.
    pub fn compensation(&self) -> f32 {
        A_SHIFT as f32 * self.a.scale * self.b.scale
    }
}

pub fn prepare_bias(memory: &mut [u8], request: &PrepareBias) -> Result<(), Fault> {
    let dims = [
        DimensionCheck::new(Dimension::RowsB, request.rows, ROWS_B_MULTIPLIER),
        DimensionCheck::new(Dimension::ColsB, request.cols, COLUMNS_B_MULTIPLIER),
    ];
    let cols = u64::from(request.cols);
    let regions = [
        Region::of(
            Operand::PreparedMatrixB,
            request.input_prepared_b,
            u64::from(request.rows) * cols,
            1,
        ),
        Region::of(Operand::InputBias, request.input_bias, cols, 4),
        Region::of(Operand::Output, request.output, cols, 4),
    ];
    validate(&CallContract::new(&dims, &regions), memory.len())?;

    let grid = TileGrid::new(request.rows as usize, request.cols as usize);
    let input = request.input_prepared_b as usize;
    let bias = request.input_bias as usize;
    let output = request.output as usize;
    let compensation = request.compensation();

    for col in 0..grid.cols() {
        // Tall matrices can exceed the i32 range.
        let mut sum = 0i64;
        for row_block in 0..grid.row_tiles() {
            let run = grid.column_run(row_block, col);
            sum += memory[input + run.start..input + run.end]
                .iter()
                .map(|&b| i64::from(b as i8))
                .sum::<i64>();
        }
        let value = load_f32(memory, bias + col * 4) - compensation * sum as f32;
        store_f32(memory, output + col * 4, value);
    }
    Ok(())
}
