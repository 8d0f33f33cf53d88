//! Section cursor for zero-copy parsing
//!
//! All section reads go through [`SectionCursor`]: fixed-width
//! little-endian integers, addresses sized by the owning compilation
//! unit, LEB128 via `symdb-format`, inline strings, and the per-form
//! skip used when walking a debug entry without decoding it.

use symdb_error::{codes, Error, ErrorCategory, Result};
use symdb_format::{read_sleb128, read_uleb128};

use crate::constants::forms;

const fn eof() -> Error {
    Error::new(ErrorCategory::Parse, codes::UNEXPECTED_END, "Unexpected end of section data")
}

/// Parsing cursor over one debug section
#[derive(Clone)]
pub struct SectionCursor<'a> {
    /// Data being parsed
    data: &'a [u8],
    /// Current position
    pos: usize,
    /// Address size of the owning compilation unit
    address_size: u8,
}

impl<'a> SectionCursor<'a> {
    /// Create a cursor at the start of `data`
    #[must_use]
    pub fn new(data: &'a [u8], address_size: u8) -> Self {
        Self { data, pos: 0, address_size }
    }

    /// Get current position
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute position
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(eof());
        }
        self.pos = pos;
        Ok(())
    }

    /// Check if the cursor is at the end of its data
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Address size of the owning unit
    #[must_use]
    pub fn address_size(&self) -> u8 {
        self.address_size
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let value = *self.data.get(self.pos).ok_or_else(eof)?;
        self.pos += 1;
        Ok(value)
    }

    /// Read a 16-bit value (little-endian)
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.data.get(self.pos..self.pos + 2).ok_or_else(eof)?;
        self.pos += 2;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a 32-bit value (little-endian)
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.data.get(self.pos..self.pos + 4).ok_or_else(eof)?;
        self.pos += 4;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an address of the unit's declared size.
    ///
    /// Only 4-byte addresses are supported; any other size fails the
    /// read with an unsupported-address-size error.
    pub fn read_address(&mut self) -> Result<u32> {
        if self.address_size != 4 {
            return Err(Error::new(
                ErrorCategory::Unsupported,
                codes::UNSUPPORTED_ADDRESS_SIZE,
                "Only 4-byte addresses are supported",
            ));
        }
        self.read_u32()
    }

    /// Read an unsigned LEB128
    pub fn read_uleb128(&mut self) -> Result<u64> {
        let (value, consumed) = read_uleb128(self.data, self.pos)?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read a signed LEB128
    pub fn read_sleb128(&mut self) -> Result<i64> {
        let (value, consumed) = read_sleb128(self.data, self.pos)?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read a slice of bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let slice = self.data.get(self.pos..self.pos + count).ok_or_else(eof)?;
        self.pos += count;
        Ok(slice)
    }

    /// Read an inline NUL-terminated string
    pub fn read_inline_str(&mut self) -> Result<&'a str> {
        let remaining = &self.data[self.pos.min(self.data.len())..];
        let end = remaining.iter().position(|&b| b == 0).ok_or(Error::new(
            ErrorCategory::Parse,
            codes::UNTERMINATED_STRING,
            "String is not NUL-terminated",
        ))?;
        let value = core::str::from_utf8(&remaining[..end])
            .map_err(|_| Error::parse_error("String is not valid UTF-8"))?;
        self.pos += end + 1;
        Ok(value)
    }

    /// Skip a number of bytes
    pub fn skip(&mut self, count: usize) -> Result<()> {
        if self.pos + count > self.data.len() {
            return Err(eof());
        }
        self.pos += count;
        Ok(())
    }

    /// Skip one attribute value of the given form without decoding it.
    ///
    /// Unknown forms are an error; the caller abandons the containing
    /// debug entry (and with it the unit).
    pub fn skip_form(&mut self, form: u16) -> Result<()> {
        match form {
            forms::DW_FORM_ADDR | forms::DW_FORM_REF_ADDR => self.skip(self.address_size as usize),
            forms::DW_FORM_DATA1 | forms::DW_FORM_REF1 | forms::DW_FORM_FLAG => self.skip(1),
            forms::DW_FORM_DATA2 | forms::DW_FORM_REF2 => self.skip(2),
            forms::DW_FORM_DATA4 | forms::DW_FORM_REF4 | forms::DW_FORM_STRP => self.skip(4),
            forms::DW_FORM_DATA8 | forms::DW_FORM_REF8 => self.skip(8),
            forms::DW_FORM_UDATA | forms::DW_FORM_SDATA | forms::DW_FORM_REF_UDATA => {
                self.read_uleb128().map(|_| ())
            }
            forms::DW_FORM_STRING => self.read_inline_str().map(|_| ()),
            forms::DW_FORM_BLOCK => {
                let len = self.read_uleb128()? as usize;
                self.skip(len)
            }
            forms::DW_FORM_BLOCK1 => {
                let len = self.read_u8()? as usize;
                self.skip(len)
            }
            forms::DW_FORM_BLOCK2 => {
                let len = self.read_u16()? as usize;
                self.skip(len)
            }
            forms::DW_FORM_BLOCK4 => {
                let len = self.read_u32()? as usize;
                self.skip(len)
            }
            forms::DW_FORM_INDIRECT => {
                let actual = self.read_uleb128()? as u16;
                if actual == forms::DW_FORM_INDIRECT {
                    return Err(Error::parse_error("Indirect form resolves to itself"));
                }
                self.skip_form(actual)
            }
            _ => Err(Error::new(
                ErrorCategory::Parse,
                codes::UNKNOWN_FORM,
                "Attribute carries an unknown form",
            )),
        }
    }
}
