//! Exact-size buffer growth.
//!
//! Before `expand` runs, the stage makes sure the message buffer can hold
//! `offset + encoded_len` bytes. Growth reallocates to exactly the required
//! size and carries over only the already-written prefix (`..offset`);
//! anything the old buffer held past the cursor is discarded.

use crate::error::CodecError;

/// Returns a buffer of at least `offset + length` bytes.
///
/// - If `buf` is already large enough it is returned unchanged, with the
///   same allocation.
/// - An empty `buf` is treated as no buffer: a zeroed buffer of exactly the
///   required length is allocated.
/// - Otherwise a zeroed buffer of exactly the required length is allocated
///   and `buf[..offset]` (clamped to `buf.len()`) is copied into it.
///
/// Fails only if `offset + length` overflows.
pub fn grow(buf: Vec<u8>, offset: usize, length: usize) -> Result<Vec<u8>, CodecError> {
    let required = offset
        .checked_add(length)
        .ok_or(CodecError::LengthOverflow { offset, length })?;

    if required <= buf.len() {
        return Ok(buf);
    }
    if buf.is_empty() {
        return Ok(vec![0; required]);
    }

    let mut grown = vec![0; required];
    let prefix = offset.min(buf.len());
    grown[..prefix].copy_from_slice(&buf[..prefix]);
    Ok(grown)
}
