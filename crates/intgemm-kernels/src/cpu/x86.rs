//! x86/x86_64 CPU kernels with AVX2 optimizations
#![allow(unsafe_op_in_unsafe_fn)]

use crate::{KernelProvider, cpu::fallback::FallbackKernel};
use intgemm_common::QuantizationParams;
use std::arch::x86_64::*;

/// AVX2 optimized CPU kernel for x86_64
///
/// Quantizes eight f32 lanes per iteration with 256-bit vectors.
pub struct Avx2Kernel;

impl KernelProvider for Avx2Kernel {
    fn name(&self) -> &'static str {
        "avx2"
    }

    fn is_available(&self) -> bool {
        is_x86_feature_detected!("avx2")
    }

    fn quantize(&self, input: &[f32], output: &mut [i8], params: QuantizationParams) {
        assert_eq!(input.len(), output.len(), "quantize: input and output lengths differ");
        if !self.is_available() {
            return FallbackKernel.quantize(input, output, params);
        }

        // Safety: We checked AVX2 is available
        unsafe { quantize_avx2(input, output, params) }
    }
}

#[target_feature(enable = "avx2")]
unsafe fn quantize_avx2(input: &[f32], output: &mut [i8], params: QuantizationParams) {
    let len = input.len();
    let chunks = len / 8;

    let scale = _mm256_set1_ps(params.scale);
    let zero_point = _mm256_set1_ps(params.zero_point);
    let lo = _mm256_set1_ps(-128.0);
    let hi = _mm256_set1_ps(127.0);
    let mut lanes = [0i32; 8];

    for chunk in 0..chunks {
        let base = chunk * 8;
        let v = _mm256_loadu_ps(input.as_ptr().add(base));
        let scaled = _mm256_div_ps(v, scale);
        let rounded = _mm256_round_ps::<{ _MM_FROUND_TO_NEAREST_INT | _MM_FROUND_NO_EXC }>(scaled);
        let shifted = _mm256_add_ps(rounded, zero_point);
        // max/min return their second operand on NaN, so NaN reaches the
        // conversion and becomes i32::MIN, whose low byte is 0.
        let clamped = _mm256_min_ps(hi, _mm256_max_ps(lo, shifted));
        // Truncating conversion, like the scalar `as` cast, for fractional zero points.
        let ints = _mm256_cvttps_epi32(clamped);
        _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, ints);

        for (dst, &q) in output[base..base + 8].iter_mut().zip(&lanes) {
            *dst = q as i8;
        }
    }

    // Scalar tail
    let tail = chunks * 8;
    FallbackKernel.quantize(&input[tail..len], &mut output[tail..len], params);
}
