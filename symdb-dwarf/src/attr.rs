//! Attribute value decoding
//!
//! Debug entries do not store decoded attributes; they store the byte
//! position where each value starts, and values are decoded on demand
//! against the form recorded in the abbreviation declaration. The same
//! form discriminant drives both this decoder and the skip path in
//! [`crate::cursor::SectionCursor::skip_form`].

use log::warn;
use symdb_error::{codes, Error, ErrorCategory, Result};

use crate::constants::forms;
use crate::cursor::SectionCursor;
use crate::strings::StrSection;

/// A decoded attribute value, tagged by form class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrValue<'a> {
    /// A runtime address (`DW_FORM_ADDR`)
    Address(u32),
    /// An unsigned constant or flag
    Unsigned(u64),
    /// A signed constant (`DW_FORM_SDATA`)
    Signed(i64),
    /// A string, inline or from the string section
    Str(&'a str),
    /// A length-prefixed byte range
    Block(&'a [u8]),
    /// A byte offset into the debug section
    Reference(u32),
}

impl<'a> AttrValue<'a> {
    /// The value as an unsigned integer, if it is numeric
    #[must_use]
    pub fn unsigned(&self) -> Option<u64> {
        match *self {
            Self::Unsigned(v) => Some(v),
            Self::Address(a) => Some(u64::from(a)),
            Self::Signed(v) => Some(v as u64),
            _ => None,
        }
    }

    /// The value as a signed integer, if it is numeric
    #[must_use]
    pub fn signed(&self) -> Option<i64> {
        match *self {
            Self::Signed(v) => Some(v),
            Self::Unsigned(v) => Some(v as i64),
            Self::Address(a) => Some(i64::from(a)),
            _ => None,
        }
    }

    /// The value as a string
    #[must_use]
    pub fn string(&self) -> Option<&'a str> {
        match *self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a debug-section offset
    #[must_use]
    pub fn reference(&self) -> Option<u32> {
        match *self {
            Self::Reference(off) => Some(off),
            _ => None,
        }
    }

    /// The value interpreted as a boolean flag
    #[must_use]
    pub fn flag(&self) -> bool {
        self.unsigned().is_some_and(|v| v != 0)
    }
}

/// Decode one attribute value.
///
/// `pos` is the byte position of the value in the debug section, `form`
/// its wire encoding, and `unit_base` the section offset of the owning
/// compilation unit (reference forms are unit-relative on the wire).
pub fn decode_at<'a>(
    debug: &'a [u8],
    pos: usize,
    form: u16,
    address_size: u8,
    unit_base: u32,
    strings: &StrSection<'a>,
) -> Result<AttrValue<'a>> {
    let mut cursor = SectionCursor::new(debug, address_size);
    cursor.seek(pos)?;

    let value = match form {
        forms::DW_FORM_ADDR => AttrValue::Address(cursor.read_address()?),
        forms::DW_FORM_DATA1 | forms::DW_FORM_FLAG => {
            AttrValue::Unsigned(u64::from(cursor.read_u8()?))
        }
        forms::DW_FORM_DATA2 => AttrValue::Unsigned(u64::from(cursor.read_u16()?)),
        forms::DW_FORM_DATA4 => AttrValue::Unsigned(u64::from(cursor.read_u32()?)),
        forms::DW_FORM_DATA8 => {
            warn!("Unhandled 64-bit support: DW_FORM_DATA8 value left zero");
            cursor.skip(8)?;
            AttrValue::Unsigned(0)
        }
        forms::DW_FORM_UDATA => AttrValue::Unsigned(cursor.read_uleb128()?),
        forms::DW_FORM_SDATA => AttrValue::Signed(cursor.read_sleb128()?),
        forms::DW_FORM_STRING => AttrValue::Str(cursor.read_inline_str()?),
        forms::DW_FORM_STRP => {
            let offset = cursor.read_u32()?;
            match strings.get(offset) {
                Some(s) => AttrValue::Str(s),
                None => {
                    warn!("String offset {offset:#x} is outside the string section");
                    AttrValue::Str("")
                }
            }
        }
        forms::DW_FORM_BLOCK => {
            let len = cursor.read_uleb128()? as usize;
            AttrValue::Block(cursor.read_bytes(len)?)
        }
        forms::DW_FORM_BLOCK1 => {
            let len = cursor.read_u8()? as usize;
            AttrValue::Block(cursor.read_bytes(len)?)
        }
        forms::DW_FORM_BLOCK2 => {
            let len = cursor.read_u16()? as usize;
            AttrValue::Block(cursor.read_bytes(len)?)
        }
        forms::DW_FORM_BLOCK4 => {
            let len = cursor.read_u32()? as usize;
            AttrValue::Block(cursor.read_bytes(len)?)
        }
        forms::DW_FORM_REF1 => {
            AttrValue::Reference(unit_base + u32::from(cursor.read_u8()?))
        }
        forms::DW_FORM_REF2 => {
            AttrValue::Reference(unit_base + u32::from(cursor.read_u16()?))
        }
        forms::DW_FORM_REF4 => AttrValue::Reference(unit_base + cursor.read_u32()?),
        forms::DW_FORM_REF8 => {
            warn!("Unhandled 64-bit support: DW_FORM_REF8 value left zero");
            cursor.skip(8)?;
            AttrValue::Reference(0)
        }
        forms::DW_FORM_REF_UDATA => {
            AttrValue::Reference(unit_base + cursor.read_uleb128()? as u32)
        }
        // ref_addr is relative to the start of the debug section
        forms::DW_FORM_REF_ADDR => AttrValue::Reference(cursor.read_address()?),
        forms::DW_FORM_INDIRECT => {
            let actual = cursor.read_uleb128()? as u16;
            if actual == forms::DW_FORM_INDIRECT {
                return Err(Error::parse_error("Indirect form resolves to itself"));
            }
            return decode_at(debug, cursor.position(), actual, address_size, unit_base, strings);
        }
        _ => {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::UNKNOWN_FORM,
                "Attribute carries an unknown form",
            ))
        }
    };

    Ok(value)
}
