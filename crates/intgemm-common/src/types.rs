//! Descriptors for matrices living in a linear buffer.

use serde::{Deserialize, Serialize};

/// Quantization parameters mapping f32 values onto int8.
///
/// Applied only when the source matrix is f32. For int8 sources they are
/// carried through the call unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizationParams {
    pub scale: f32,
    pub zero_point: f32,
}

impl QuantizationParams {
    pub const fn new(scale: f32, zero_point: f32) -> Self {
        Self { scale, zero_point }
    }

    /// `round(value / scale) + zero_point`, clamped to `[-128, 127]`.
    ///
    /// Rounds half to even, matching the vector rounding mode. NaN maps to 0.
    #[inline]
    pub fn quantize(&self, value: f32) -> i8 {
        let q = (value / self.scale).round_ties_even() + self.zero_point;
        q.clamp(-128.0, 127.0) as i8
    }
}

impl Default for QuantizationParams {
    fn default() -> Self {
        Self { scale: 1.0, zero_point: 0.0 }
    }
}

/// Element encoding of a source matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    I8,
    F32,
}

impl ElementType {
    pub const fn size_bytes(self) -> u64 {
        match self {
            Self::I8 => 1,
            Self::F32 => 4,
        }
    }
}

/// Traversal order of a source matrix in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    RowMajor,
    /// The caller transposed the logical matrix before writing it.
    ColumnMajor,
}

/// A `rows × cols` matrix at a byte offset of the linear buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixDescriptor {
    pub offset: u32,
    pub rows: u32,
    pub cols: u32,
}

impl MatrixDescriptor {
    pub const fn new(offset: u32, rows: u32, cols: u32) -> Self {
        Self { offset, rows, cols }
    }

    pub fn elements(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }

    /// Byte length when stored with `element` encoding. `None` on overflow.
    pub fn byte_len(&self, element: ElementType) -> Option<u64> {
        self.elements().checked_mul(element.size_bytes())
    }
}
