//! Input section set
//!
//! The parser consumes four contiguous debug sections extracted from an
//! object file by the caller. The line section is the only one that may
//! legitimately be absent, and absence is an `Option`, not a sentinel
//! pointer.

/// The debug sections of one module
#[derive(Debug, Clone, Copy)]
pub struct SectionSet<'a> {
    /// `.debug_info` bytes
    pub debug: &'a [u8],
    /// `.debug_abbrev` bytes
    pub abbrev: &'a [u8],
    /// `.debug_str` bytes
    pub strings: &'a [u8],
    /// `.debug_line` bytes, if the section exists
    pub line: Option<&'a [u8]>,
}

impl<'a> SectionSet<'a> {
    /// Bundle the four section byte ranges
    #[must_use]
    pub fn new(
        debug: &'a [u8],
        abbrev: &'a [u8],
        strings: &'a [u8],
        line: Option<&'a [u8]>,
    ) -> Self {
        Self { debug, abbrev, strings, line }
    }
}
