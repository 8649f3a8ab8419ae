//! Little-endian element access into validated buffer spans.

#[inline]
pub(crate) fn load_f32(memory: &[u8], at: usize) -> f32 {
    let b = &memory[at..at + 4];
    f32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[inline]
pub(crate) fn store_f32(memory: &mut [u8], at: usize, value: f32) {
    memory[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn load_u32(memory: &[u8], at: usize) -> u32 {
    let b = &memory[at..at + 4];
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}
