//! Timestamp key encoding
//!
//! Keys are zig-zag encoded signed varints: small magnitudes of either sign
//! take few bytes, and the layout matches Go's `binary.PutVarint`.

use crate::error::KeyError;

/// Longest encoding of a 64-bit value
pub const MAX_KEY_LEN: usize = 10;

/// Encode a timestamp as a signed varint
#[must_use]
pub fn encode(timestamp: i64) -> Vec<u8> {
    #[allow(clippy::cast_sign_loss)]
    let mut ux = (timestamp as u64) << 1;
    if timestamp < 0 {
        ux = !ux;
    }

    let mut buf = Vec::with_capacity(MAX_KEY_LEN);
    while ux >= 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        buf.push((ux as u8) | 0x80);
        ux >>= 7;
    }
    #[allow(clippy::cast_possible_truncation)]
    buf.push(ux as u8);
    buf
}

/// Decode a key produced by [`encode`]
///
/// # Errors
/// Returns an error for empty, truncated, overlong, or trailing input.
pub fn decode(raw: &[u8]) -> Result<i64, KeyError> {
    if raw.is_empty() {
        return Err(KeyError::Empty);
    }

    let mut ux: u64 = 0;
    let mut shift = 0u32;

    for (i, &byte) in raw.iter().enumerate() {
        if i == MAX_KEY_LEN - 1 && byte > 1 {
            return Err(KeyError::Overflow);
        }

        if byte < 0x80 {
            if i + 1 != raw.len() {
                return Err(KeyError::TrailingBytes);
            }
            ux |= u64::from(byte) << shift;

            #[allow(clippy::cast_possible_wrap)]
            let x = (ux >> 1) as i64;
            return Ok(if ux & 1 == 0 { x } else { !x });
        }

        ux |= u64::from(byte & 0x7f) << shift;
        shift += 7;
    }

    Err(KeyError::Truncated)
}
