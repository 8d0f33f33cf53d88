//! Compilation-unit and debug-entry tree building
//!
//! A [`Unit`] owns everything scoped to one compilation unit: its header
//! fields, its abbreviation table, and the arena of debug entries built
//! by walking the unit's payload. Entries are addressable by their byte
//! offset in the debug section, which is how cross-references resolve,
//! and carry a nullable back-pointer to the database symbol they have
//! been translated into.

use log::warn;
use symdb_error::{codes, Error, ErrorCategory, Result};
use symdb_sym::SymbolId;

use crate::abbrev::AbbrevTable;
use crate::attr::{decode_at, AttrValue};
use crate::constants::attributes;
use crate::cursor::SectionCursor;
use crate::prelude::{BTreeMap, Vec};
use crate::sections::SectionSet;
use crate::strings::StrSection;

/// Index of a debug entry in its unit's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieId(u32);

impl DieId {
    /// Arena index of this entry
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One debug entry
#[derive(Debug)]
pub struct DebugEntry {
    /// Byte offset of the entry in the debug section
    pub offset: u32,
    /// Abbreviation entry code
    pub code: u64,
    /// Tag from the abbreviation declaration
    pub tag: u16,
    /// Byte position of each attribute value, in declaration order
    pub attr_data: Vec<u32>,
    /// Child entries, in payload order
    pub children: Vec<DieId>,
    /// Database symbol this entry resolved into, once built
    pub symbol: Option<SymbolId>,
}

/// Header prefixing each compilation unit in the debug section
#[derive(Debug, Clone, Copy)]
pub struct UnitHeader {
    /// Bytes in the unit, excluding this field
    pub unit_length: u32,
    /// DWARF version of the unit
    pub version: u16,
    /// Offset of the unit's abbreviation set in the abbreviation section
    pub abbrev_offset: u32,
    /// Native word size of the unit
    pub address_size: u8,
}

/// Encoded size of a unit header
pub const UNIT_HEADER_SIZE: u32 = 11;

impl UnitHeader {
    /// Read a unit header
    pub fn read(cursor: &mut SectionCursor<'_>) -> Result<Self> {
        let unit_length = cursor.read_u32()?;
        if unit_length == 0xffff_ffff {
            return Err(Error::new(
                ErrorCategory::Unsupported,
                codes::UNSUPPORTED_DWARF64,
                "64-bit DWARF is not supported",
            ));
        }
        let version = cursor.read_u16()?;
        let abbrev_offset = cursor.read_u32()?;
        let address_size = cursor.read_u8()?;
        Ok(Self { unit_length, version, abbrev_offset, address_size })
    }
}

/// One compilation unit with its built debug-entry tree
#[derive(Debug)]
pub struct Unit<'a> {
    /// DWARF version from the header
    pub version: u16,
    /// Address size from the header
    pub address_size: u8,
    /// Section offset of the unit header start; reference attribute
    /// values are relative to this
    pub base: u32,
    /// Section offset one past the end of the unit
    pub end: u32,
    abbrev: AbbrevTable,
    entries: Vec<DebugEntry>,
    by_offset: BTreeMap<u32, DieId>,
    root: Option<DieId>,
    sections: SectionSet<'a>,
    strings: StrSection<'a>,
}

impl<'a> Unit<'a> {
    /// Build the debug-entry tree of the unit starting at `base`.
    ///
    /// The abbreviation set is loaded first; every entry code the
    /// payload references must resolve in it or the unit fails.
    pub fn build(sections: SectionSet<'a>, base: u32, header: &UnitHeader) -> Result<Self> {
        let abbrev = AbbrevTable::parse(sections.abbrev, header.abbrev_offset)?;

        let mut unit = Self {
            version: header.version,
            address_size: header.address_size,
            base,
            end: base + 4 + header.unit_length,
            abbrev,
            entries: Vec::new(),
            by_offset: BTreeMap::new(),
            root: None,
            sections,
            strings: StrSection::new(sections.strings),
        };

        let mut cursor = SectionCursor::new(sections.debug, header.address_size);
        cursor.seek((base + UNIT_HEADER_SIZE) as usize)?;
        unit.root = unit.build_entry(&mut cursor)?;
        Ok(unit)
    }

    fn build_entry(&mut self, cursor: &mut SectionCursor<'a>) -> Result<Option<DieId>> {
        if cursor.position() >= self.end as usize {
            return Err(Error::parse_error("Debug entry outside the unit bounds"));
        }
        let offset = cursor.position() as u32;

        let code = cursor.read_uleb128()?;
        if code == 0 {
            // End of a sibling list
            return Ok(None);
        }

        let decl = self.abbrev.find(code).ok_or(Error::new(
            ErrorCategory::Parse,
            codes::MISSING_ABBREVIATION,
            "Entry code missing from the abbreviation table",
        ))?;
        let tag = decl.tag;
        let has_children = decl.has_children;
        let specs = decl.attrs.clone();

        let mut attr_data = Vec::with_capacity(specs.len());
        for spec in &specs {
            attr_data.push(cursor.position() as u32);
            cursor.skip_form(spec.form)?;
        }

        let id = DieId(self.entries.len() as u32);
        self.entries.push(DebugEntry {
            offset,
            code,
            tag,
            attr_data,
            children: Vec::new(),
            symbol: None,
        });
        self.by_offset.insert(offset, id);

        if has_children {
            let mut children = Vec::new();
            while let Some(child) = self.build_entry(cursor)? {
                children.push(child);
            }
            self.entries[id.index()].children = children;
        }

        // The sibling attribute is a resync hint: if present and the
        // cursor is not already there, jump to the indicated offset.
        if let Some(AttrValue::Reference(target)) =
            self.find_attribute(id, attributes::DW_AT_SIBLING)?
        {
            if cursor.position() != target as usize {
                if target >= self.base + UNIT_HEADER_SIZE && target <= self.end {
                    cursor.seek(target as usize)?;
                } else {
                    warn!("Sibling target {target:#x} is outside the unit, ignoring");
                }
            }
        }

        Ok(Some(id))
    }

    /// Root entry of the unit, if the payload held one
    #[must_use]
    pub fn root(&self) -> Option<DieId> {
        self.root
    }

    /// Look up an entry by id
    #[must_use]
    pub fn entry(&self, id: DieId) -> &DebugEntry {
        &self.entries[id.index()]
    }

    /// Child ids of an entry
    #[must_use]
    pub fn children(&self, id: DieId) -> &[DieId] {
        &self.entries[id.index()].children
    }

    /// Number of entries in the unit
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the unit holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a debug-section offset to the entry built at it
    #[must_use]
    pub fn entry_at_offset(&self, offset: u32) -> Option<DieId> {
        self.by_offset.get(&offset).copied()
    }

    /// Database symbol an entry resolved into, if already built
    #[must_use]
    pub fn symbol(&self, id: DieId) -> Option<SymbolId> {
        self.entries[id.index()].symbol
    }

    /// Record the database symbol an entry resolved into
    pub fn set_symbol(&mut self, id: DieId, symbol: SymbolId) {
        self.entries[id.index()].symbol = Some(symbol);
    }

    /// Decode the value of attribute `at` on `die`, walking the
    /// abbreviation declaration in lockstep with the stored value
    /// positions. `Ok(None)` when the entry does not carry `at`.
    pub fn find_attribute(&self, die: DieId, at: u16) -> Result<Option<AttrValue<'a>>> {
        let entry = &self.entries[die.index()];
        let decl = self.abbrev.find(entry.code).ok_or(Error::new(
            ErrorCategory::Parse,
            codes::MISSING_ABBREVIATION,
            "Entry code missing from the abbreviation table",
        ))?;

        for (spec, &pos) in decl.attrs.iter().zip(&entry.attr_data) {
            if spec.attr == at {
                return decode_at(
                    self.sections.debug,
                    pos as usize,
                    spec.form,
                    self.address_size,
                    self.base,
                    &self.strings,
                )
                .map(Some);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use symdb_format::write_uleb128;

    use crate::constants::{forms, tags};

    use super::*;

    fn uleb(out: &mut Vec<u8>, value: u64) {
        out.extend_from_slice(&write_uleb128(value));
    }

    // compile_unit(name: string) with children; base_type(name: string,
    // byte_size: data1); variable(name: string, type: ref4)
    fn abbrev_section() -> Vec<u8> {
        let mut out = Vec::new();
        uleb(&mut out, 1);
        uleb(&mut out, u64::from(tags::DW_TAG_COMPILE_UNIT));
        out.push(1);
        uleb(&mut out, 0x03);
        uleb(&mut out, u64::from(forms::DW_FORM_STRING));
        uleb(&mut out, 0);
        uleb(&mut out, 0);

        uleb(&mut out, 2);
        uleb(&mut out, u64::from(tags::DW_TAG_BASE_TYPE));
        out.push(0);
        uleb(&mut out, 0x03);
        uleb(&mut out, u64::from(forms::DW_FORM_STRING));
        uleb(&mut out, 0x0b);
        uleb(&mut out, u64::from(forms::DW_FORM_DATA1));
        uleb(&mut out, 0);
        uleb(&mut out, 0);

        uleb(&mut out, 3);
        uleb(&mut out, u64::from(tags::DW_TAG_VARIABLE));
        out.push(0);
        uleb(&mut out, 0x03);
        uleb(&mut out, u64::from(forms::DW_FORM_STRING));
        uleb(&mut out, 0x49);
        uleb(&mut out, u64::from(forms::DW_FORM_REF4));
        uleb(&mut out, 0);
        uleb(&mut out, 0);

        uleb(&mut out, 0);
        out
    }

    fn info_section() -> Vec<u8> {
        let mut body = Vec::new();
        uleb(&mut body, 1); // compile_unit
        body.extend_from_slice(b"a.c\0");

        // base_type "int" at unit-relative offset of this position
        uleb(&mut body, 2);
        body.extend_from_slice(b"int\0");
        body.push(4);

        uleb(&mut body, 3); // variable referencing the base type
        body.extend_from_slice(b"v\0");
        body.extend_from_slice(&16u32.to_le_bytes()); // unit-relative ref

        uleb(&mut body, 0); // end of compile_unit children

        let mut out = Vec::new();
        out.extend_from_slice(&(7 + body.len() as u32).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.push(4);
        out.extend_from_slice(&body);
        out
    }

    fn build<'a>(debug: &'a [u8], abbrev: &'a [u8]) -> Unit<'a> {
        let sections = SectionSet::new(debug, abbrev, &[], None);
        let mut cursor = SectionCursor::new(debug, 4);
        let header = UnitHeader::read(&mut cursor).unwrap();
        Unit::build(sections, 0, &header).unwrap()
    }

    #[test]
    fn builds_the_unit_tree() {
        let abbrev = abbrev_section();
        let debug = info_section();
        let unit = build(&debug, &abbrev);

        let root = unit.root().unwrap();
        assert_eq!(unit.entry(root).tag, tags::DW_TAG_COMPILE_UNIT);
        assert_eq!(unit.children(root).len(), 2);
        assert_eq!(unit.len(), 3);

        let name = unit.find_attribute(root, 0x03).unwrap().unwrap();
        assert_eq!(name.string(), Some("a.c"));
    }

    #[test]
    fn entries_are_addressable_by_offset() {
        let abbrev = abbrev_section();
        let debug = info_section();
        let unit = build(&debug, &abbrev);

        for idx in 0..unit.len() {
            let id = DieId(idx as u32);
            let offset = unit.entry(id).offset;
            assert_eq!(unit.entry_at_offset(offset), Some(id));
        }
    }

    #[test]
    fn references_resolve_to_entries() {
        let abbrev = abbrev_section();
        let debug = info_section();
        let unit = build(&debug, &abbrev);

        let root = unit.root().unwrap();
        let var = unit.children(root)[1];
        assert_eq!(unit.entry(var).tag, tags::DW_TAG_VARIABLE);

        let type_ref = unit.find_attribute(var, 0x49).unwrap().unwrap();
        let target = unit.entry_at_offset(type_ref.reference().unwrap()).unwrap();
        assert_eq!(unit.entry(target).tag, tags::DW_TAG_BASE_TYPE);
    }

    #[test]
    fn missing_abbreviation_fails_the_unit() {
        let abbrev = abbrev_section();
        let mut body = Vec::new();
        uleb(&mut body, 9); // no such entry code
        let mut debug = Vec::new();
        debug.extend_from_slice(&(7 + body.len() as u32).to_le_bytes());
        debug.extend_from_slice(&2u16.to_le_bytes());
        debug.extend_from_slice(&0u32.to_le_bytes());
        debug.push(4);
        debug.extend_from_slice(&body);

        let sections = SectionSet::new(&debug, &abbrev, &[], None);
        let mut cursor = SectionCursor::new(&debug, 4);
        let header = UnitHeader::read(&mut cursor).unwrap();
        let err = Unit::build(sections, 0, &header).unwrap_err();
        assert_eq!(err.code, codes::MISSING_ABBREVIATION);
    }
}
