//! Dimension checks against tiling constants.

use intgemm_common::{Dimension, Fault};

/// One dimension argument and the tiling constant it must be a multiple of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionCheck {
    pub dimension: Dimension,
    pub value: u32,
    pub multiple: u32,
}

impl DimensionCheck {
    pub const fn new(dimension: Dimension, value: u32, multiple: u32) -> Self {
        Self { dimension, value, multiple }
    }
}

/// `value` must be positive and an integral multiple of `multiple`.
pub fn check_dimension(check: &DimensionCheck) -> Result<(), Fault> {
    let DimensionCheck { dimension, value, multiple } = *check;
    if value == 0 || value % multiple != 0 {
        return Err(Fault::Shape { dimension, value, multiple });
    }
    Ok(())
}

/// First failing check, in order.
pub fn check_dimensions(checks: &[DimensionCheck]) -> Result<(), Fault> {
    checks.iter().try_for_each(check_dimension)
}
