//! DWARF 2 debug-information parsing for symdb
//!
//! This crate consumes the raw bytes of the four debug sections of an
//! object file (`.debug_info`, `.debug_abbrev`, `.debug_str`,
//! `.debug_line`) and materializes compilation units, types, functions,
//! variables, lexical blocks and source-line records into a
//! [`symdb_sym::Module`].
//!
//! The pipeline per compilation unit: load the abbreviation table the
//! unit references, build the debug-entry tree from the unit payload,
//! translate the tree into database symbols (resolving type
//! cross-references lazily and evaluating location expressions), then
//! run the unit's line-number program and attach the emitted rows to
//! the functions covering them.
//!
//! Failures are unit-scoped: a unit with an unsupported version, a
//! missing abbreviation or an unknown attribute form is skipped with a
//! warning and the remaining units still parse. Only absent mandatory
//! sections fail [`parse`] itself.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(feature = "std"))]
extern crate alloc;

use log::warn;
use symdb_error::{codes, Error, ErrorCategory, Result};
use symdb_sym::{DebugCapabilities, Module, RegisterMapping, Symbol, ThunkRange};

/// Abbreviation-table loading
pub mod abbrev;
/// Attribute value decoding
pub mod attr;
/// DWARF 2 wire-format constants
pub mod constants;
/// Section cursor and per-form skipping
pub mod cursor;
/// Compilation units and the debug-entry tree
pub mod die;
/// Location-expression evaluation
pub mod location;
/// Input section set
pub mod sections;
/// String section access
pub mod strings;

mod line;
mod loader;

pub mod prelude;

#[cfg(test)]
mod test;

pub use abbrev::{AbbrevAttribute, AbbrevEntry, AbbrevTable};
pub use attr::AttrValue;
pub use cursor::SectionCursor;
pub use die::{DebugEntry, DieId, Unit, UnitHeader};
pub use sections::SectionSet;
pub use strings::StrSection;

use crate::constants::attributes;
use crate::die::UNIT_HEADER_SIZE;
use crate::loader::UnitLoader;

/// Symbol-format tag recorded on a module after a successful parse
pub const DEBUG_FORMAT: &str = "DIA";
/// Signature bytes recorded on a module after a successful parse
pub const DEBUG_SIGNATURE: [u8; 4] = *b"DWAR";

/// Parse the debug sections of one object file into `module`.
///
/// `thunks` is the caller's sorted table of synthetic code regions;
/// subprograms starting inside one are not materialized. `registers`
/// translates DWARF register numbers to the target ABI.
///
/// Unit-scoped failures degrade to warnings and missing symbols. The
/// only hard failure is an absent debug or abbreviation section. On
/// return the module is annotated with the reader tag, signature and
/// capability flags describing what the parse produced.
pub fn parse(
    module: &mut Module,
    thunks: &[ThunkRange],
    registers: &dyn RegisterMapping,
    sections: &SectionSet<'_>,
) -> Result<()> {
    if sections.debug.is_empty() || sections.abbrev.is_empty() {
        return Err(Error::new(
            ErrorCategory::Validation,
            codes::MISSING_SECTION,
            "Debug and abbreviation sections are mandatory",
        ));
    }

    let mut synthetic_names = 0u32;
    let mut pos = 0u32;

    while pos as usize + UNIT_HEADER_SIZE as usize <= sections.debug.len() {
        let mut cursor = SectionCursor::new(sections.debug, 4);
        cursor.seek(pos as usize)?;
        let header = match UnitHeader::read(&mut cursor) {
            Ok(header) => header,
            Err(err) => {
                warn!("Unit header at {pos:#x} failed: {err}");
                break;
            }
        };

        let next = pos + 4 + header.unit_length;
        if header.unit_length < UNIT_HEADER_SIZE - 4 || next as usize > sections.debug.len() {
            warn!("Unit at {pos:#x} declares an invalid length, stopping");
            break;
        }

        if header.version != 2 {
            warn!("Unit at {pos:#x} has unsupported DWARF version {}, skipping", header.version);
            pos = next;
            continue;
        }
        if header.address_size != 4 {
            warn!(
                "Unit at {pos:#x} has unsupported address size {}, skipping",
                header.address_size
            );
            pos = next;
            continue;
        }

        match die::Unit::build(*sections, pos, &header) {
            Ok(mut unit) => {
                let loaded = UnitLoader::new(
                    &mut unit,
                    module,
                    registers,
                    thunks,
                    &mut synthetic_names,
                )
                .load();
                match loaded {
                    Ok(_) => run_line_program(module, sections, &unit),
                    Err(err) => warn!("Unit at {pos:#x} failed to translate: {err}"),
                }
            }
            Err(err) => warn!("Unit at {pos:#x} failed to parse: {err}"),
        }

        pos = next;
    }

    module.set_debug_info(DEBUG_FORMAT, DEBUG_SIGNATURE, capabilities(module));
    Ok(())
}

/// Run the unit's line program, if it declares one and the line section
/// is available
fn run_line_program(module: &mut Module, sections: &SectionSet<'_>, unit: &Unit<'_>) {
    let Some(line_bytes) = sections.line else {
        return;
    };
    let Some(root) = unit.root() else {
        return;
    };

    let stmt_list = match unit.find_attribute(root, attributes::DW_AT_STMT_LIST) {
        Ok(Some(value)) => value.unsigned(),
        Ok(None) => None,
        Err(err) => {
            warn!("Cannot read the statement-list attribute: {err}");
            None
        }
    };
    let Some(offset) = stmt_list else {
        return;
    };

    let comp_dir = unit
        .find_attribute(root, attributes::DW_AT_COMP_DIR)
        .ok()
        .flatten()
        .and_then(|v| v.string())
        .unwrap_or("");

    if let Err(err) =
        line::run_program(module, line_bytes, offset as u32, comp_dir, unit.address_size)
    {
        warn!("Line program at {offset:#x} failed: {err}");
    }
}

/// Derive the capability flags from what the parse materialized
fn capabilities(module: &Module) -> DebugCapabilities {
    let mut caps = DebugCapabilities::default();
    for symbol in module.symbols() {
        match symbol {
            Symbol::Function { lines, .. } => {
                caps.global_symbols = true;
                if !lines.is_empty() {
                    caps.line_numbers = true;
                }
            }
            Symbol::Variable { .. } => caps.global_symbols = true,
            Symbol::BasicType { .. }
            | Symbol::PointerType { .. }
            | Symbol::ArrayType { .. }
            | Symbol::Typedef { .. }
            | Symbol::EnumType { .. }
            | Symbol::Udt { .. }
            | Symbol::FunctionSignature { .. } => caps.type_info = true,
            Symbol::Compiland { .. } => {}
        }
    }
    caps.source_indexed = module.source_count() > 0;
    caps
}
