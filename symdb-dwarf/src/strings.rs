//! String section access
//!
//! `DW_FORM_STRP` attributes reference NUL-terminated strings by offset
//! into the string section. Bad offsets yield `None` rather than failing
//! the containing debug entry.

/// Zero-copy view of the string section
#[derive(Debug, Clone, Copy)]
pub struct StrSection<'a> {
    data: &'a [u8],
}

impl<'a> StrSection<'a> {
    /// Create a view over string-section bytes
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Extract the NUL-terminated string at `offset`.
    ///
    /// Returns `None` when the offset is out of bounds, the string is
    /// unterminated, or the bytes are not valid UTF-8.
    #[must_use]
    pub fn get(&self, offset: u32) -> Option<&'a str> {
        let remaining = self.data.get(offset as usize..)?;
        let end = remaining.iter().position(|&b| b == 0)?;
        core::str::from_utf8(&remaining[..end]).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &[u8] = b"\0int\0unsigned char\0";

    #[test]
    fn lookup_by_offset() {
        let strings = StrSection::new(DATA);
        assert_eq!(strings.get(0), Some(""));
        assert_eq!(strings.get(1), Some("int"));
        assert_eq!(strings.get(5), Some("unsigned char"));
        assert_eq!(strings.get(14), Some("char"));
    }

    #[test]
    fn bad_offsets_yield_none() {
        let strings = StrSection::new(DATA);
        assert_eq!(strings.get(100), None);
        assert_eq!(StrSection::new(b"no terminator").get(0), None);
    }
}
