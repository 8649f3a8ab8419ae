//! Preparation of B (weights) and A (activations).
//!
//! B is repacked into the tiled layout of [`crate::tiling`]. The source may
//! be int8 or f32 and row-major or column-major (already transposed); all
//! four combinations produce the same bytes for the same logical matrix.
//! f32 sources are quantized on the way through the provider.
//!
//! A keeps its row-major order and is quantized to unsigned bytes shifted by
//! [`A_SHIFT`].

use crate::memory::load_f32;
use crate::tiling::{
    TILE_BYTES, TILE_COLS, TILE_ROWS, TileGrid, column_major_index, local_index, row_major_index,
};
use crate::validation::{CallContract, DimensionCheck, Region, validate};
use crate::KernelProvider;
use intgemm_common::{
    A_SHIFT, COLUMNS_A_MULTIPLIER, COLUMNS_B_MULTIPLIER, Dimension, ElementType, Fault,
    MatrixDescriptor, Operand, Order, QuantizationParams, ROWS_A_MULTIPLIER, ROWS_B_MULTIPLIER,
};

/// Arguments of one B preparation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepareB {
    pub input: u32,
    pub params: QuantizationParams,
    pub rows: u32,
    pub cols: u32,
    pub output: u32,
    pub element: ElementType,
    pub order: Order,
}

impl PrepareB {
    fn source_operand(&self) -> Operand {
        match self.order {
            Order::RowMajor => Operand::InputMatrixB,
            Order::ColumnMajor => Operand::InputMatrixBTransposed,
        }
    }

    fn dimension_checks(&self) -> [DimensionCheck; 2] {
        [
            DimensionCheck::new(Dimension::RowsB, self.rows, ROWS_B_MULTIPLIER),
            DimensionCheck::new(Dimension::ColsB, self.cols, COLUMNS_B_MULTIPLIER),
        ]
    }

    fn regions(&self) -> [Region; 2] {
        let source = MatrixDescriptor::new(self.input, self.rows, self.cols);
        let packed = MatrixDescriptor::new(self.output, self.rows, self.cols);
        [
            Region::new(self.source_operand(), source.offset, source.byte_len(self.element)),
            Region::new(Operand::Output, packed.offset, packed.byte_len(ElementType::I8)),
        ]
    }
}

/// Validate `request` and pack its source into the tiled layout at `request.output`.
pub fn prepare_b(
    provider: &dyn KernelProvider,
    memory: &mut [u8],
    request: &PrepareB,
) -> Result<(), Fault> {
    let dims = request.dimension_checks();
    let regions = request.regions();
    validate(&CallContract::new(&dims, &regions), memory.len())?;

    let grid = TileGrid::new(request.rows as usize, request.cols as usize);
    let input = request.input as usize;
    let output = request.output as usize;
    let mut tile = [0i8; TILE_BYTES];
    let mut staged = [0f32; TILE_BYTES];

    for t in 0..grid.tile_count() {
        let origin = grid.tile_origin(t);
        match request.element {
            ElementType::I8 => gather_i8(memory, input, &grid, request.order, origin, &mut tile),
            ElementType::F32 => {
                gather_f32(memory, input, &grid, request.order, origin, &mut staged);
                provider.quantize(&staged, &mut tile, request.params);
            }
        }
        let span = grid.tile_span(t);
        let dst = &mut memory[output + span.start..output + span.end];
        for (d, &v) in dst.iter_mut().zip(&tile) {
            *d = v as u8;
        }
    }
    Ok(())
}

fn gather_i8(
    memory: &[u8],
    input: usize,
    grid: &TileGrid,
    order: Order,
    (row0, col0): (usize, usize),
    tile: &mut [i8; TILE_BYTES],
) {
    match order {
        Order::RowMajor => {
            for local_row in 0..TILE_ROWS {
                let start = input + row_major_index(row0 + local_row, col0, grid.cols());
                for (local_col, &b) in memory[start..start + TILE_COLS].iter().enumerate() {
                    tile[local_index(local_row, local_col)] = b as i8;
                }
            }
        }
        Order::ColumnMajor => {
            for local_col in 0..TILE_COLS {
                let start = input + column_major_index(row0, col0 + local_col, grid.rows());
                let first = local_index(0, local_col);
                let run = &mut tile[first..first + TILE_ROWS];
                for (d, &b) in run.iter_mut().zip(&memory[start..start + TILE_ROWS]) {
                    *d = b as i8;
                }
            }
        }
    }
}

fn gather_f32(
    memory: &[u8],
    input: usize,
    grid: &TileGrid,
    order: Order,
    (row0, col0): (usize, usize),
    staged: &mut [f32; TILE_BYTES],
) {
    for local_col in 0..TILE_COLS {
        for local_row in 0..TILE_ROWS {
            let (row, col) = (row0 + local_row, col0 + local_col);
            let element = match order {
                Order::RowMajor => row_major_index(row, col, grid.cols()),
                Order::ColumnMajor => column_major_index(row, col, grid.rows()),
            };
            staged[local_index(local_row, local_col)] = load_f32(memory, input + element * 4);
        }
    }
}

/// Arguments of one A preparation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepareA {
    pub input: u32,
    pub params: QuantizationParams,
    pub rows: u32,
    pub cols: u32,
    pub output: u32,
}

/// Quantize row-major f32 A into shifted unsigned bytes at `request.output`.
pub fn prepare_a(
    provider: &dyn KernelProvider,
    memory: &mut [u8],
    request: &PrepareA,
) -> Result<(), Fault> {
    let elements = u64::from(request.rows) * u64::from(request.cols);
    let dims = [
        DimensionCheck::new(Dimension::RowsA, request.rows, ROWS_A_MULTIPLIER),
        DimensionCheck::new(Dimension::ColsA, request.cols, COLUMNS_A_MULTIPLIER),
    ];
    let regions = [
        Region::of(Operand::InputMatrixA, request.input, elements, 4),
        Region::of(Operand::Output, request.output, elements, 1),
    ];
    validate(&CallContract::new(&dims, &regions), memory.len())?;

    let total = elements as usize;
    let input = request.input as usize;
    let output = request.output as usize;
    let mut staged = [0f32; TILE_BYTES];
    let mut quantized = [0i8; TILE_BYTES];

    let mut start = 0;
    while start < total {
        let n = (total - start).min(TILE_BYTES);
        for (i, s) in staged[..n].iter_mut().enumerate() {
            *s = load_f32(memory, input + (start + i) * 4);
        }
        provider.quantize(&staged[..n], &mut quantized[..n], request.params);
        for (d, &q) in memory[output + start..output + start + n].iter_mut().zip(&quantized[..n]) {
            *d = (i32::from(q) + A_SHIFT) as u8;
        }
        start += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::FallbackKernel;
    use crate::tiling::unpack_b;
    use intgemm_common::{FaultKind, PAGE_SIZE_BYTES};

    fn request(element: ElementType, order: Order, rows: u32, cols: u32) -> PrepareB {
        PrepareB {
            input: 0,
            params: QuantizationParams::default(),
            rows,
            cols,
            output: 32768,
            element,
            order,
        }
    }

    #[test]
    fn int8_row_major_is_a_permutation() {
        let mut memory = vec![0u8; PAGE_SIZE_BYTES];
        let (rows, cols) = (128usize, 16usize);
        for (i, b) in memory[..rows * cols].iter_mut().enumerate() {
            *b = (i * 7 % 256) as u8;
        }
        let req = request(ElementType::I8, Order::RowMajor, rows as u32, cols as u32);
        prepare_b(&FallbackKernel, &mut memory, &req).unwrap();

        let source: Vec<i8> = memory[..rows * cols].iter().map(|&b| b as i8).collect();
        let packed = &memory[32768..32768 + rows * cols];
        assert_eq!(unpack_b(packed, rows, cols), source);
    }

    #[test]
    fn int8_ignores_quantization_params() {
        let mut a = vec![0u8; PAGE_SIZE_BYTES];
        for (i, b) in a[..512].iter_mut().enumerate() {
            *b = i as u8;
        }
        let mut b = a.clone();

        let mut req = request(ElementType::I8, Order::RowMajor, 64, 8);
        prepare_b(&FallbackKernel, &mut a, &req).unwrap();
        req.params = QuantizationParams::new(0.01, 42.0);
        prepare_b(&FallbackKernel, &mut b, &req).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn transposed_source_matches_row_major() {
        let (rows, cols) = (128usize, 24usize);
        let logical: Vec<u8> = (0..rows * cols).map(|i| (i * 31 % 253) as u8).collect();

        let mut row_major = vec![0u8; PAGE_SIZE_BYTES];
        row_major[..rows * cols].copy_from_slice(&logical);

        let mut col_major = vec![0u8; PAGE_SIZE_BYTES];
        for r in 0..rows {
            for c in 0..cols {
                col_major[c * rows + r] = logical[r * cols + c];
            }
        }

        let row_request = request(ElementType::I8, Order::RowMajor, 128, 24);
        let col_request = request(ElementType::I8, Order::ColumnMajor, 128, 24);
        prepare_b(&FallbackKernel, &mut row_major, &row_request).unwrap();
        prepare_b(&FallbackKernel, &mut col_major, &col_request).unwrap();
        assert_eq!(&row_major[32768..32768 + rows * cols], &col_major[32768..32768 + rows * cols]);
    }

    #[test]
    fn f32_source_is_quantized_then_packed() {
        let mut memory = vec![0u8; PAGE_SIZE_BYTES];
        let (rows, cols) = (64usize, 8usize);
        let values: Vec<f32> = (0..rows * cols).map(|i| i as f32 * 0.5 - 100.0).collect();
        for (i, v) in values.iter().enumerate() {
            memory[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        let mut req = request(ElementType::F32, Order::RowMajor, 64, 8);
        req.params = QuantizationParams::new(0.5, 2.0);
        prepare_b(&FallbackKernel, &mut memory, &req).unwrap();

        let expected: Vec<i8> = values.iter().map(|&v| req.params.quantize(v)).collect();
        assert_eq!(unpack_b(&memory[32768..32768 + 512], rows, cols), expected);
    }

    #[test]
    fn rejected_call_writes_nothing() {
        let mut memory = vec![0xAAu8; PAGE_SIZE_BYTES];
        let req = request(ElementType::I8, Order::RowMajor, 65, 8);
        let err = prepare_b(&FallbackKernel, &mut memory, &req).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Shape);
        assert!(memory.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn f32_source_span_is_four_bytes_per_element() {
        let mut memory = vec![0u8; PAGE_SIZE_BYTES];
        // 64×8 f32 = 2048 bytes; an input 1024 bytes from the end does not fit.
        let mut req = request(ElementType::F32, Order::RowMajor, 64, 8);
        req.input = (PAGE_SIZE_BYTES - 1024) as u32;
        req.output = 0;
        let err = prepare_b(&FallbackKernel, &mut memory, &req).unwrap_err();
        assert!(matches!(err, Fault::Bounds { operand: Operand::InputMatrixB, len: 2048, .. }));
    }

    #[test]
    fn prepare_a_shifts_quantized_values() {
        let mut memory = vec![0u8; PAGE_SIZE_BYTES];
        let values: Vec<f32> = (0..128).map(|i| i as f32 - 64.0).collect();
        for (i, v) in values.iter().enumerate() {
            memory[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        let req = PrepareA {
            input: 0,
            params: QuantizationParams::new(1.0, 0.0),
            rows: 2,
            cols: 64,
            output: 4096,
        };
        prepare_a(&FallbackKernel, &mut memory, &req).unwrap();
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(i32::from(memory[4096 + i]), v as i32 + A_SHIFT);
        }
    }

    #[test]
    fn prepare_a_checks_column_multiple() {
        let mut memory = vec![0u8; PAGE_SIZE_BYTES];
        let req = PrepareA {
            input: 0,
            params: QuantizationParams::default(),
            rows: 3,
            cols: 32,
            output: 4096,
        };
        let err = prepare_a(&FallbackKernel, &mut memory, &req).unwrap_err();
        assert_eq!(err, Fault::Shape { dimension: Dimension::ColsA, value: 32, multiple: 64 });
    }
}
