//! LEB128 reading and writing
//!
//! DWARF encodes most variable-length integers as LEB128: seven payload
//! bits per byte, least significant group first, with the high bit of
//! each byte marking continuation. Readers take a byte slice and a start
//! position and return the decoded value together with the number of
//! bytes consumed, so callers can advance their own cursors.

use symdb_error::{codes, Error, ErrorCategory, Result};

use crate::prelude::Vec;

const fn truncated() -> Error {
    Error::new(ErrorCategory::Parse, codes::MALFORMED_LEB128, "Truncated LEB128 integer")
}

const fn oversized() -> Error {
    Error::new(ErrorCategory::Parse, codes::MALFORMED_LEB128, "LEB128 integer too large")
}

/// Read an unsigned LEB128 integer.
///
/// Returns the value and the number of bytes consumed. Errors on
/// truncation and on sequences that would exceed 64 bits.
pub fn read_uleb128(bytes: &[u8], pos: usize) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0u32;
    let mut offset = 0usize;

    loop {
        let byte = *bytes.get(pos + offset).ok_or_else(truncated)?;
        offset += 1;

        result |= u64::from(byte & 0x7f) << shift;

        if byte & 0x80 == 0 {
            break;
        }

        shift += 7;
        if shift >= 64 {
            return Err(oversized());
        }
    }

    Ok((result, offset))
}

/// Read a signed LEB128 integer.
///
/// Identical to the unsigned reader except that the result is
/// sign-extended when bit 0x40 of the final byte is set and fewer than
/// 64 bits were consumed.
pub fn read_sleb128(bytes: &[u8], pos: usize) -> Result<(i64, usize)> {
    let mut result = 0i64;
    let mut shift = 0u32;
    let mut offset = 0usize;
    let mut byte;

    loop {
        byte = *bytes.get(pos + offset).ok_or_else(truncated)?;
        offset += 1;

        if shift < 64 {
            result |= i64::from(byte & 0x7f) << shift;
        } else {
            return Err(oversized());
        }
        shift += 7;

        if byte & 0x80 == 0 {
            break;
        }
    }

    if shift < 64 && byte & 0x40 != 0 {
        result |= -1i64 << shift;
    }

    Ok((result, offset))
}

/// Encode an unsigned integer as LEB128.
pub fn write_uleb128(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
    out
}

/// Encode a signed integer as LEB128.
pub fn write_sleb128(mut value: i64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        let sign_clear = byte & 0x40 == 0;
        let done = (value == 0 && sign_clear) || (value == -1 && !sign_clear);
        out.push(if done { byte } else { byte | 0x80 });
        if done {
            break;
        }
    }
    out
}
