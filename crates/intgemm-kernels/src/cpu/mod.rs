//! CPU kernel implementations

pub mod fallback;
#[cfg(target_arch = "x86_64")]
pub mod x86;

pub use fallback::FallbackKernel;
#[cfg(target_arch = "x86_64")]
pub use x86::Avx2Kernel;
