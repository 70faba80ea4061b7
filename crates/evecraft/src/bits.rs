//! Low-level bit and byte helpers shared by the codec and the layout resolver.
//!
//! All multi-byte values on the wire are little-endian.

/// Rounds `offset` up to the next multiple of `size`. A `size` of 0 leaves `offset` unchanged.
pub fn align(offset: usize, size: usize) -> usize {
    if size == 0 {
        return offset;
    }

    match offset % size {
        0 => offset,
        rem => offset + size - rem,
    }
}

/// Rounds `offset` up to the next 4-byte boundary.
pub fn align4(offset: usize) -> usize {
    align(offset, 4)
}

/// Mask covering the low `bits` bits (up to 32).
pub fn mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Inclusive range of integers representable in `bits` bits.
pub fn value_range(bits: u32, signed: bool) -> (i64, i64) {
    if signed {
        let half = 1i64 << (bits - 1);
        (-half, half - 1)
    } else {
        (0, (1i64 << bits) - 1)
    }
}

/// Reads a little-endian `u16` at `offset`, or `None` if it does not fit in `data`.
pub fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Reads a little-endian `u32` at `offset`, or `None` if it does not fit in `data`.
pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Extends `out` with zero bytes until its length is `len`.
pub fn pad_to(out: &mut Vec<u8>, len: usize) {
    if out.len() < len {
        out.resize(len, 0);
    }
}
