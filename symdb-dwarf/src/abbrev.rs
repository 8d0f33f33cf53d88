//! Abbreviation table parsing
//!
//! Every compilation unit references a set of abbreviation declarations
//! in the abbreviation section. Each declaration gives the template for
//! a class of debug entries: its tag, whether entries own children, and
//! the ordered `(attribute, form)` pairs their payload carries.

use symdb_error::{codes, Error, ErrorCategory, Result};

use crate::cursor::SectionCursor;
use crate::prelude::{BTreeMap, Vec};

/// One `(attribute, form)` pair of an abbreviation declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbbrevAttribute {
    /// Attribute identifier (`DW_AT_*`)
    pub attr: u16,
    /// Wire form of the value (`DW_FORM_*`)
    pub form: u16,
}

/// An abbreviation declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbrevEntry {
    /// Debug-entry tag (`DW_TAG_*`)
    pub tag: u16,
    /// Whether entries using this declaration own children
    pub has_children: bool,
    /// Attribute specifications, in payload order
    pub attrs: Vec<AbbrevAttribute>,
}

/// The abbreviation set of one compilation unit, keyed by entry code
#[derive(Debug, Default)]
pub struct AbbrevTable {
    entries: BTreeMap<u64, AbbrevEntry>,
}

impl AbbrevTable {
    /// Parse the abbreviation set starting at `offset` in the
    /// abbreviation section. The set ends at a zero entry code.
    pub fn parse(abbrev: &[u8], offset: u32) -> Result<Self> {
        let data = abbrev.get(offset as usize..).ok_or(Error::new(
            ErrorCategory::Parse,
            codes::UNEXPECTED_END,
            "Abbreviation offset is outside the section",
        ))?;
        let mut cursor = SectionCursor::new(data, 4);
        let mut entries = BTreeMap::new();

        loop {
            let code = cursor.read_uleb128()?;
            if code == 0 {
                break;
            }

            let tag = cursor.read_uleb128()? as u16;
            let has_children = cursor.read_u8()? != 0;

            let mut attrs = Vec::new();
            loop {
                let attr = cursor.read_uleb128()? as u16;
                let form = cursor.read_uleb128()? as u16;
                if attr == 0 && form == 0 {
                    break;
                }
                attrs.push(AbbrevAttribute { attr, form });
            }

            entries.insert(code, AbbrevEntry { tag, has_children, attrs });
        }

        Ok(Self { entries })
    }

    /// Find a declaration by entry code
    #[must_use]
    pub fn find(&self, code: u64) -> Option<&AbbrevEntry> {
        self.entries.get(&code)
    }

    /// Number of declarations in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
