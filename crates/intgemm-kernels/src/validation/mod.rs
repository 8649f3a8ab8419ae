//! Boundary contract of a kernel call.
//!
//! A call's contract is its list of dimension checks plus the buffer regions
//! it reads and writes. [`validate`] runs the whole contract in one pass
//! before the kernel touches memory:
//!
//! 1. every dimension (shape faults win over everything else),
//! 2. every region's span against the buffer length,
//! 3. every region's alignment.
//!
//! The first failure is returned; nothing after it is evaluated.

pub mod bounds;
pub mod shape;

pub use bounds::{Region, check_alignment, check_bounds};
pub use shape::{DimensionCheck, check_dimension, check_dimensions};

use intgemm_common::Fault;

#[derive(Debug, Clone, Copy)]
pub struct CallContract<'a> {
    pub dimensions: &'a [DimensionCheck],
    pub regions: &'a [Region],
}

impl<'a> CallContract<'a> {
    pub const fn new(dimensions: &'a [DimensionCheck], regions: &'a [Region]) -> Self {
        Self { dimensions, regions }
    }
}

pub fn validate(contract: &CallContract<'_>, buffer_len: usize) -> Result<(), Fault> {
    check_dimensions(contract.dimensions)?;
    for region in contract.regions {
        check_bounds(region, buffer_len)?;
    }
    for region in contract.regions {
        check_alignment(region)?;
    }
    Ok(())
}
