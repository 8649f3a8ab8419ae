//! Fallback CPU kernel implementation
//!
//! Scalar implementation of the element-wise kernel operations. It works on
//! any architecture and is the reference every vectorized provider must
//! match byte for byte.

use crate::KernelProvider;
use intgemm_common::QuantizationParams;

/// Fallback CPU kernel that works on any architecture
pub struct FallbackKernel;

impl KernelProvider for FallbackKernel {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn quantize(&self, input: &[f32], output: &mut [i8], params: QuantizationParams) {
        assert_eq!(input.len(), output.len(), "quantize: input and output lengths differ");
        for (dst, &value) in output.iter_mut().zip(input) {
            *dst = params.quantize(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_always_available() {
        let kernel = FallbackKernel;
        assert!(kernel.is_available());
        assert_eq!(kernel.name(), "fallback");
    }

    #[test]
    #[should_panic(expected = "lengths differ")]
    fn test_quantize_rejects_mismatched_lengths() {
        let input = [1.0f32; 8];
        let mut output = [0i8; 7];
        FallbackKernel.quantize(&input, &mut output, QuantizationParams::default());
    }

    #[test]
    fn test_quantize_elementwise() {
        let input = [0.0, 1.0, -1.0, 2.5, 3.5, 100.0, -100.0, 0.24];
        let mut output = [0i8; 8];
        FallbackKernel.quantize(&input, &mut output, QuantizationParams::new(0.25, 1.0));
        assert_eq!(output, [1, 5, -3, 11, 15, 127, -128, 2]);
    }
}
