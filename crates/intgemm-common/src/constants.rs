//! Constants fixed by the kernel contract and visible to callers.

/// Byte alignment required for every offset passed to a kernel.
pub const ARRAY_ALIGNMENT: u32 = 64;

/// Row granularity of the activation matrix A.
pub const ROWS_A_MULTIPLIER: u32 = 1;

/// Column granularity of A; also the K granularity shared with B.
pub const COLUMNS_A_MULTIPLIER: u32 = 64;

/// Row granularity of B. Equals [`COLUMNS_A_MULTIPLIER`] because B's rows are
/// the shared inner dimension.
pub const ROWS_B_MULTIPLIER: u32 = COLUMNS_A_MULTIPLIER;

/// Column granularity of B.
pub const COLUMNS_B_MULTIPLIER: u32 = 8;

/// Granularity of the column index list accepted by column selection.
pub const SELECTED_COLUMNS_B_MULTIPLIER: u32 = 8;

/// Linear buffer growth granularity (one wasm page).
pub const PAGE_SIZE_BYTES: usize = 65536;

/// Largest page count a linear buffer may reach (4 GiB of 32-bit address space).
pub const MAX_PAGES: u32 = 65536;

/// Offset added to quantized activations to make them unsigned.
pub const A_SHIFT: i32 = 128;

/// Rows in one packed B tile.
pub const TILE_ROWS: usize = ROWS_B_MULTIPLIER as usize;

/// Columns in one packed B tile.
pub const TILE_COLS: usize = COLUMNS_B_MULTIPLIER as usize;

/// Bytes in one packed B tile.
pub const TILE_BYTES: usize = TILE_ROWS * TILE_COLS;
