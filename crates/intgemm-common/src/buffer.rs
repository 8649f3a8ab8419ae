//! Page-granular linear memory shared by the host and the kernels.
//!
//! All kernel arguments are byte offsets into one [`LinearBuffer`]. The
//! buffer only ever grows, by whole pages, and never beyond its maximum.
//! Multi-byte values are little-endian.

use crate::config::BufferConfig;
use crate::constants::{MAX_PAGES, PAGE_SIZE_BYTES};
use crate::error::{BufferError, Result};

#[derive(Debug, Clone)]
pub struct LinearBuffer {
    bytes: Vec<u8>,
    maximum_pages: Option<u32>,
}

impl LinearBuffer {
    /// Allocate `initial_pages` zeroed pages, growable up to `maximum_pages`.
    pub fn new(initial_pages: u32, maximum_pages: Option<u32>) -> Result<Self> {
        if let Some(maximum) = maximum_pages {
            if initial_pages > maximum {
                return Err(
                    BufferError::InitialExceedsMaximum { initial: initial_pages, maximum }.into()
                );
            }
        }
        if initial_pages > MAX_PAGES {
            return Err(BufferError::AddressSpace { pages: u64::from(initial_pages) }.into());
        }
        Ok(Self { bytes: vec![0; initial_pages as usize * PAGE_SIZE_BYTES], maximum_pages })
    }

    pub fn from_config(config: &BufferConfig) -> Result<Self> {
        Self::new(config.initial_pages, config.maximum_pages)
    }

    /// Current size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn pages(&self) -> u32 {
        (self.bytes.len() / PAGE_SIZE_BYTES) as u32
    }

    pub fn maximum_pages(&self) -> Option<u32> {
        self.maximum_pages
    }

    /// Grow by `delta` pages, returning the previous page count.
    ///
    /// New pages are zeroed.
    pub fn grow(&mut self, delta: u32) -> Result<u32> {
        let current = self.pages();
        let target = u64::from(current) + u64::from(delta);
        if let Some(maximum) = self.maximum_pages {
            if target > u64::from(maximum) {
                return Err(BufferError::MaximumExceeded { current, delta, maximum }.into());
            }
        }
        if target > u64::from(MAX_PAGES) {
            return Err(BufferError::AddressSpace { pages: target }.into());
        }
        self.bytes.resize(target as usize * PAGE_SIZE_BYTES, 0);
        log::debug!("linear buffer grew from {current} to {target} pages");
        Ok(current)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Copy `data` to `offset`. Panics if the span is out of range, like slice indexing.
    pub fn write_bytes(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn write_i8(&mut self, offset: usize, data: &[i8]) {
        for (dst, &v) in self.bytes[offset..offset + data.len()].iter_mut().zip(data) {
            *dst = v as u8;
        }
    }

    pub fn write_f32(&mut self, offset: usize, data: &[f32]) {
        let span = &mut self.bytes[offset..offset + data.len() * 4];
        for (chunk, &v) in span.chunks_exact_mut(4).zip(data) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
    }

    pub fn write_u32(&mut self, offset: usize, data: &[u32]) {
        let span = &mut self.bytes[offset..offset + data.len() * 4];
        for (chunk, &v) in span.chunks_exact_mut(4).zip(data) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }

    pub fn read_i8(&self, offset: usize, len: usize) -> Vec<i8> {
        self.bytes[offset..offset + len].iter().map(|&b| b as i8).collect()
    }

    pub fn read_f32(&self, offset: usize, len: usize) -> Vec<f32> {
        self.bytes[offset..offset + len * 4]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    /// Set every byte of `[offset, offset + len)` to `value`.
    pub fn fill(&mut self, offset: usize, len: usize, value: u8) {
        self.bytes[offset..offset + len].fill(value);
    }
}

impl Default for LinearBuffer {
    /// One page, not growable, as the host test harness allocates.
    fn default() -> Self {
        Self { bytes: vec![0; PAGE_SIZE_BYTES], maximum_pages: Some(1) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntGemmError;

    #[test]
    fn default_is_one_page() {
        let buf = LinearBuffer::default();
        assert_eq!(buf.len(), PAGE_SIZE_BYTES);
        assert_eq!(buf.pages(), 1);
        assert_eq!(buf.maximum_pages(), Some(1));
    }

    #[test]
    fn grow_returns_previous_size() {
        let mut buf = LinearBuffer::new(1, Some(4)).unwrap();
        assert_eq!(buf.grow(2).unwrap(), 1);
        assert_eq!(buf.pages(), 3);
        assert!(buf.as_slice()[PAGE_SIZE_BYTES..].iter().all(|&b| b == 0));
    }

    #[test]
    fn grow_past_maximum_fails_without_resizing() {
        let mut buf = LinearBuffer::new(1, Some(2)).unwrap();
        let err = buf.grow(2).unwrap_err();
        assert!(matches!(
            err,
            IntGemmError::Buffer(BufferError::MaximumExceeded { current: 1, delta: 2, maximum: 2 })
        ));
        assert_eq!(buf.pages(), 1);
    }

    #[test]
    fn initial_above_maximum_is_rejected() {
        assert!(LinearBuffer::new(3, Some(2)).is_err());
    }

    #[test]
    fn typed_access_is_little_endian() {
        let mut buf = LinearBuffer::default();
        buf.write_u32(64, &[0x0403_0201]);
        assert_eq!(buf.read_bytes(64, 4), &[1, 2, 3, 4]);

        buf.write_f32(128, &[1.5, -2.0]);
        assert_eq!(buf.read_f32(128, 2), vec![1.5, -2.0]);

        buf.write_i8(256, &[-1, 127]);
        assert_eq!(buf.read_bytes(256, 2), &[0xff, 0x7f]);
        assert_eq!(buf.read_i8(256, 2), vec![-1, 127]);
    }
}
