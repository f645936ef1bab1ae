//! Coding primitives
//!
//! Varint32 length prefixes and fixed-width little-endian integers used by
//! the internal entry format.

/// Maximum number of bytes a varint32 occupies
pub const MAX_VARINT32_LEN: usize = 5;

/// Number of bytes `value` takes when varint-encoded
pub fn varint32_len(mut value: u32) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

/// Write `value` as a varint32 at the start of `dst`
///
/// Returns the number of bytes written, or `None` if `dst` is too short.
pub fn put_varint32(dst: &mut [u8], mut value: u32) -> Option<usize> {
    let needed = varint32_len(value);
    if dst.len() < needed {
        return None;
    }

    let mut i = 0;
    while value >= 0x80 {
        dst[i] = (value as u8) | 0x80;
        value >>= 7;
        i += 1;
    }
    dst[i] = value as u8;
    Some(needed)
}

/// Read a varint32 from the start of `src`
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// input is truncated or longer than five bytes.
pub fn get_varint32(src: &[u8]) -> Option<(u32, usize)> {
    let mut result: u32 = 0;
    for (i, &byte) in src.iter().take(MAX_VARINT32_LEN).enumerate() {
        let shift = 7 * i as u32;
        let bits = (byte & 0x7f) as u32;

        // The fifth byte may only carry the top four bits
        if i == MAX_VARINT32_LEN - 1 && bits > 0x0f {
            return None;
        }

        result |= bits << shift;
        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }
    }
    None
}

/// Write `value` as 8 little-endian bytes at the start of `dst`
pub fn put_fixed64(dst: &mut [u8], value: u64) -> Option<usize> {
    let slot = dst.get_mut(..8)?;
    slot.copy_from_slice(&value.to_le_bytes());
    Some(8)
}

/// Read 8 little-endian bytes from the start of `src`
pub fn get_fixed64(src: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = src.get(..8)?.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}
