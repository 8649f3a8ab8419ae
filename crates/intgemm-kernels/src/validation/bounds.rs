//! Span and alignment checks for buffer regions.

use intgemm_common::{ARRAY_ALIGNMENT, Fault, Operand};

/// A byte span of the linear buffer referenced by one operand.
///
/// `len` is `None` when computing the size overflowed `u64`; such a region
/// never fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub operand: Operand,
    pub offset: u32,
    pub len: Option<u64>,
}

impl Region {
    pub const fn new(operand: Operand, offset: u32, len: Option<u64>) -> Self {
        Self { operand, offset, len }
    }

    /// Region of `elements` values of `elem_size` bytes each.
    pub fn of(operand: Operand, offset: u32, elements: u64, elem_size: u64) -> Self {
        Self::new(operand, offset, elements.checked_mul(elem_size))
    }

    /// Exclusive end, if it is representable.
    pub fn end(&self) -> Option<u64> {
        self.len.and_then(|len| u64::from(self.offset).checked_add(len))
    }
}

/// `[offset, offset + len)` must lie within `[0, buffer_len)`.
pub fn check_bounds(region: &Region, buffer_len: usize) -> Result<(), Fault> {
    let buffer_len = buffer_len as u64;
    match region.end() {
        Some(end) if end <= buffer_len => Ok(()),
        _ => Err(Fault::Bounds {
            operand: region.operand,
            offset: u64::from(region.offset),
            len: region.len.unwrap_or(u64::MAX),
            buffer_len,
        }),
    }
}

/// `offset` must be a multiple of [`ARRAY_ALIGNMENT`].
pub fn check_alignment(region: &Region) -> Result<(), Fault> {
    if region.offset % ARRAY_ALIGNMENT != 0 {
        return Err(Fault::Alignment {
            operand: region.operand,
            offset: region.offset,
            alignment: ARRAY_ALIGNMENT,
        });
    }
    Ok(())
}
