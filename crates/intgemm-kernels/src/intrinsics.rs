//! Host-facing entry points.
//!
//! Each method takes the flat argument list a host runtime passes across
//! its boundary (offsets into the linear buffer, dimensions, quantization
//! parameters), runs the kernel, and on rejection records the full call at
//! debug level before returning the fault.

use crate::bias::{PrepareBias, prepare_bias};
use crate::prepare::{PrepareA, PrepareB, prepare_a, prepare_b};
use crate::select::{SelectColumns, select_columns_of_b};
use crate::KernelManager;
use intgemm_common::{ElementType, KernelConfig, LinearBuffer, Order, QuantizationParams, Result};

pub struct IntGemm {
    manager: KernelManager,
}

impl IntGemm {
    pub fn new() -> Self {
        Self { manager: KernelManager::new() }
    }

    pub fn from_config(config: &KernelConfig) -> Self {
        Self { manager: KernelManager::with_preference(config.kernel.provider) }
    }

    pub fn manager(&self) -> &KernelManager {
        &self.manager
    }

    /// Row-major f32 B → prepared B.
    pub fn prepare_b(
        &self,
        memory: &mut LinearBuffer,
        input: u32,
        scale: f32,
        zero_point: f32,
        rows_b: u32,
        cols_b: u32,
        output: u32,
    ) -> Result<()> {
        self.run_prepare_b(
            "prepare_b",
            memory,
            input,
            scale,
            zero_point,
            rows_b,
            cols_b,
            output,
            ElementType::F32,
            Order::RowMajor,
        )
    }

    /// Column-major (transposed) f32 B → prepared B.
    pub fn prepare_b_from_transposed(
        &self,
        memory: &mut LinearBuffer,
        input: u32,
        scale: f32,
        zero_point: f32,
        rows_b: u32,
        cols_b: u32,
        output: u32,
    ) -> Result<()> {
        self.run_prepare_b(
            "prepare_b_from_transposed",
            memory,
            input,
            scale,
            zero_point,
            rows_b,
            cols_b,
            output,
            ElementType::F32,
            Order::ColumnMajor,
        )
    }

    /// Row-major int8 B → prepared B. `scale` and `zero_point` are not applied.
    pub fn prepare_b_from_quantized(
        &self,
        memory: &mut LinearBuffer,
        input: u32,
        scale: f32,
        zero_point: f32,
        rows_b: u32,
        cols_b: u32,
        output: u32,
    ) -> Result<()> {
        self.run_prepare_b(
            "prepare_b_from_quantized",
            memory,
            input,
            scale,
            zero_point,
            rows_b,
            cols_b,
            output,
            ElementType::I8,
            Order::RowMajor,
        )
    }

    /// Column-major int8 B → prepared B. `scale` and `zero_point` are not applied.
    pub fn prepare_b_from_quantized_transposed(
        &self,
        memory: &mut LinearBuffer,
        input: u32,
        scale: f32,
        zero_point: f32,
        rows_b: u32,
        cols_b: u32,
        output: u32,
    ) -> Result<()> {
        self.run_prepare_b(
            "prepare_b_from_quantized_transposed",
            memory,
            input,
            scale,
            zero_point,
            rows_b,
            cols_b,
            output,
            ElementType::I8,
            Order::ColumnMajor,
        )
    }

    fn run_prepare_b(
        &self,
        name: &str,
        memory: &mut LinearBuffer,
        input: u32,
        scale: f32,
        zero_point: f32,
        rows_b: u32,
        cols_b: u32,
        output: u32,
        element: ElementType,
        order: Order,
    ) -> Result<()> {
        let request = PrepareB {
            input,
            params: QuantizationParams::new(scale, zero_point),
            rows: rows_b,
            cols: cols_b,
            output,
            element,
            order,
        };
        let buffer_len = memory.len();
        prepare_b(self.manager.select_best(), memory.as_mut_slice(), &request).map_err(|fault| {
            log::debug!(
                "{name}: {fault}; input:{input:#x} scale:{scale} zeroPoint:{zero_point} \
                 rowsB:{rows_b} colsB:{cols_b} output:{output:#x} bufferLen:{buffer_len}"
            );
            fault.into()
        })
    }

    pub fn prepare_a(
        &self,
        memory: &mut LinearBuffer,
        input: u32,
        scale: f32,
        zero_point: f32,
        rows_a: u32,
        cols_a: u32,
        output: u32,
    ) -> Result<()> {
        let request = PrepareA {
            input,
            params: QuantizationParams::new(scale, zero_point),
            rows: rows_a,
            cols: cols_a,
            output,
        };
        let buffer_len = memory.len();
        prepare_a(self.manager.select_best(), memory.as_mut_slice(), &request).map_err(|fault| {
            log::debug!(
                "prepare_a: {fault}; input:{input:#x} scale:{scale} zeroPoint:{zero_point} \
                 rowsA:{rows_a} colsA:{cols_a} output:{output:#x} bufferLen:{buffer_len}"
            );
            fault.into()
        })
    }

    pub fn select_columns_of_b(
        &self,
        memory: &mut LinearBuffer,
        input_prepared: u32,
        rows_b: u32,
        cols_b: u32,
        col_index_list: u32,
        size_col_index_list: u32,
        output: u32,
    ) -> Result<()> {
        let request = SelectColumns {
            input: input_prepared,
            rows: rows_b,
            cols: cols_b,
            col_index_list,
            size_col_index_list,
            output,
        };
        let buffer_len = memory.len();
        select_columns_of_b(memory.as_mut_slice(), &request).map_err(|fault| {
            log::debug!(
                "select_columns_of_b: {fault}; inputPrepared:{input_prepared:#x} rowsB:{rows_b} \
                 colsB:{cols_b} colIndexList:{col_index_list:#x} \
                 sizeColIndexList:{size_col_index_list} output:{output:#x} bufferLen:{buffer_len}"
            );
            fault.into()
        })
    }

    pub fn prepare_bias(
        &self,
        memory: &mut LinearBuffer,
        input_prepared_b: u32,
        scale_a: f32,
        zero_point_a: f32,
        scale_b: f32,
        zero_point_b: f32,
        rows_b: u32,
        cols_b: u32,
        input_bias: u32,
        output: u32,
    ) -> Result<()> {
        let request = PrepareBias {
            input_prepared_b,
            a: QuantizationParams::new(scale_a, zero_point_a),
            b: QuantizationParams::new(scale_b, zero_point_b),
            rows: rows_b,
            cols: cols_b,
            input_bias,
            output,
        };
        let buffer_len = memory.len();
        prepare_bias(memory.as_mut_slice(), &request).map_err(|fault| {
            log::debug!(
                "prepare_bias: {fault}; inputPreparedB:{input_prepared_b:#x} scaleA:{scale_a} \
                 zeroPointA:{zero_point_a} scaleB:{scale_b} zeroPointB:{zero_point_b} \
                 rowsB:{rows_b} colsB:{cols_b} inputBias:{input_bias:#x} output:{output:#x} \
                 bufferLen:{buffer_len}"
            );
            fault.into()
        })
    }
}

impl Default for IntGemm {
    fn default() -> Self {
        Self::new()
    }
}
