//! Fault and error types for the kernel boundary.
//!
//! A [`Fault`] is the tagged result of a rejected kernel call. There are
//! exactly three kinds and all of them are fatal to the call that raised
//! them: the kernel never writes before it has decided a call is valid.
//! [`IntGemmError`] wraps faults together with the failures of the
//! surrounding plumbing (buffer growth, configuration, I/O).

use std::fmt;

use thiserror::Error;

/// Matrix dimension argument named in a [`Fault::Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    RowsA,
    ColsA,
    RowsB,
    ColsB,
    SelectedColumns,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RowsA => "rowsA",
            Self::ColsA => "colsA",
            Self::RowsB => "rowsB",
            Self::ColsB => "colsB",
            Self::SelectedColumns => "sizeColIndexList",
        };
        f.write_str(name)
    }
}

/// Memory operand named in an alignment or bounds fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    InputMatrixA,
    InputMatrixB,
    InputMatrixBTransposed,
    PreparedMatrixB,
    ColumnIndexList,
    InputBias,
    Output,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InputMatrixA => "inputMatrixA",
            Self::InputMatrixB => "inputMatrixB",
            Self::InputMatrixBTransposed => "inputMatrixBTransposed",
            Self::PreparedMatrixB => "inputMatrixBPrepared",
            Self::ColumnIndexList => "colIndexList",
            Self::InputBias => "inputBias",
            Self::Output => "output",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`Fault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    Shape,
    Alignment,
    Bounds,
}

/// A rejected kernel call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("invalid dimension {dimension}:{value} (should be a positive multiple of {multiple})")]
    Shape { dimension: Dimension, value: u32, multiple: u32 },

    #[error("unaligned access for {operand}:{offset:#x} (should be {alignment} aligned)")]
    Alignment { operand: Operand, offset: u32, alignment: u32 },

    #[error(
        "memory out of bounds for {operand}: [{offset:#x}, +{len}) exceeds \
         buffer of {buffer_len} bytes"
    )]
    Bounds { operand: Operand, offset: u64, len: u64, buffer_len: u64 },

    /// A column index addresses memory past the end of its matrix.
    #[error("column index {index} at position {position} out of bounds for {cols} columns")]
    ColumnOutOfRange { index: u32, position: u32, cols: u32 },
}

impl Fault {
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::Shape { .. } => FaultKind::Shape,
            Self::Alignment { .. } => FaultKind::Alignment,
            Self::Bounds { .. } | Self::ColumnOutOfRange { .. } => FaultKind::Bounds,
        }
    }
}

/// Linear buffer growth failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("cannot grow from {current} by {delta} pages: maximum is {maximum}")]
    MaximumExceeded { current: u32, delta: u32, maximum: u32 },

    #[error("{pages} pages exceed the 32-bit address space")]
    AddressSpace { pages: u64 },

    #[error("initial size of {initial} pages exceeds maximum of {maximum}")]
    InitialExceedsMaximum { initial: u32, maximum: u32 },
}

/// Top-level error type.
#[derive(Error, Debug)]
pub enum IntGemmError {
    #[error("kernel fault: {0}")]
    Fault(#[from] Fault),

    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntGemmError {
    /// The fault kind, when this error is a kernel fault.
    pub fn fault_kind(&self) -> Option<FaultKind> {
        match self {
            Self::Fault(fault) => Some(fault.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IntGemmError>;
