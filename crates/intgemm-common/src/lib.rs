//! Common types, constants, and utilities for the intgemm preparation kernels
//!
//! This crate provides the foundational pieces shared by the kernel crate and
//! by hosts embedding it: the tiling constants callers must respect, the fault
//! taxonomy raised at the kernel boundary, the page-granular linear buffer the
//! kernels operate on, and configuration.

pub mod buffer;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use buffer::LinearBuffer;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use types::*;
