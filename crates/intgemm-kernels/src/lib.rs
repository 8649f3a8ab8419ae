//! Validated int8 GEMM preparation kernels
//!
//! Every kernel reads its operands from, and writes its result into, one
//! caller-owned [`LinearBuffer`] addressed by byte offsets. A call is first
//! checked against its contract (dimensions, bounds, alignment) and only then
//! executed, so a rejected call never writes.
//!
//! ```
//! use intgemm_common::{LinearBuffer, ROWS_B_MULTIPLIER, COLUMNS_B_MULTIPLIER};
//! use intgemm_kernels::IntGemm;
//!
//! let gemm = IntGemm::new();
//! let mut memory = LinearBuffer::default();
//! let (rows, cols) = (ROWS_B_MULTIPLIER, COLUMNS_B_MULTIPLIER);
//! let source: Vec<i8> = (0..rows * cols).map(|i| i as i8).collect();
//! memory.write_i8(0, &source);
//!
//! gemm.prepare_b_from_quantized(&mut memory, 0, 1.0, 0.0, rows, cols, 1024).unwrap();
//!
//! let unpacked = intgemm_kernels::tiling::unpack_b(memory.read_bytes(1024, 512), 64, 8);
//! assert_eq!(unpacked, source);
//! ```

// Entry points mirror the host's flat argument lists.
#![allow(clippy::too_many_arguments)]

use intgemm_common::{ProviderPreference, QuantizationParams};
use std::sync::OnceLock;

pub mod bias;
pub mod cpu;
pub mod intrinsics;
mod memory;
pub mod prepare;
pub mod select;
pub mod tiling;
pub mod validation;

pub use cpu::FallbackKernel;
#[cfg(target_arch = "x86_64")]
pub use cpu::Avx2Kernel;
pub use intgemm_common::LinearBuffer;
pub use intrinsics::IntGemm;

/// Kernel provider trait
///
/// A provider implements the element-wise step of preparation that benefits
/// from vectorization. Every provider must produce output byte-identical to
/// [`FallbackKernel`].
pub trait KernelProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn is_available(&self) -> bool;
    /// Quantize `input` into `output` element-wise with
    /// [`QuantizationParams::quantize`] semantics.
    ///
    /// # Panics
    ///
    /// If `input` and `output` differ in length.
    fn quantize(&self, input: &[f32], output: &mut [i8], params: QuantizationParams);
}

/// Kernel manager for selecting optimal kernels with cached selection
pub struct KernelManager {
    providers: Vec<Box<dyn KernelProvider>>,
    selected: OnceLock<usize>,
}

impl KernelManager {
    pub fn new() -> Self {
        Self::with_preference(ProviderPreference::Auto)
    }

    /// Build the provider list for `preference`. The fallback kernel is always last.
    pub fn with_preference(preference: ProviderPreference) -> Self {
        let mut providers: Vec<Box<dyn KernelProvider>> = vec![Box::new(cpu::FallbackKernel)];

        match preference {
            ProviderPreference::Fallback => {
                log::debug!("Kernel provider pinned to fallback");
            }
            ProviderPreference::Auto | ProviderPreference::Avx2 => {
                #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
                {
                    if is_x86_feature_detected!("avx2") {
                        providers.insert(0, Box::new(cpu::Avx2Kernel));
                    }
                }
                if preference == ProviderPreference::Avx2 && providers.len() == 1 {
                    log::warn!("AVX2 kernel requested but not available, using fallback");
                }
            }
        }

        Self { providers, selected: OnceLock::new() }
    }

    /// Select the best available kernel provider with caching
    pub fn select_best(&self) -> &dyn KernelProvider {
        let selected_idx = self.selected.get_or_init(|| {
            // Providers are ordered by preference
            for (i, provider) in self.providers.iter().enumerate() {
                if provider.is_available() {
                    log::info!("Selected kernel provider: {}", provider.name());
                    return i;
                }
            }
            self.providers.len() - 1
        });
        self.providers[*selected_idx].as_ref()
    }

    /// Get the name of the currently selected kernel provider
    pub fn selected_provider_name(&self) -> Option<&'static str> {
        self.selected.get().and_then(|&idx| self.providers.get(idx)).map(|provider| provider.name())
    }

    /// List all available kernel providers
    pub fn list_available_providers(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .filter(|provider| provider.is_available())
            .map(|provider| provider.name())
            .collect()
    }

    /// Force reselection of kernel provider (for testing)
    #[cfg(test)]
    pub fn reset_selection(&mut self) {
        self.selected = OnceLock::new();
    }
}

impl Default for KernelManager {
    fn default() -> Self {
        Self::new()
    }
}
