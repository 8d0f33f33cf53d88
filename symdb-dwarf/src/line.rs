//! Line-number program evaluation
//!
//! The line section carries, per compilation unit, a bytecode program
//! for a dedicated state machine whose emitted rows map runtime
//! addresses to (file, line) pairs. This module runs that program and
//! attaches each row to the function covering its address; rows outside
//! every known function are dropped.

use log::warn;
use symdb_error::Result;
use symdb_sym::{LineRecord, Module, SourceId, Symbol};

use crate::constants::line_ops;
use crate::cursor::SectionCursor;
use crate::prelude::{format, ToString, Vec};

/// Header fields that parameterize the state machine
struct ProgramHeader {
    minimum_instruction_length: u8,
    default_is_stmt: bool,
    line_base: i8,
    line_range: u8,
    opcode_base: u8,
    standard_opcode_lengths: Vec<u8>,
    files: Vec<SourceId>,
}

/// The state-machine registers
struct LineState {
    address: u32,
    file: u64,
    line: i64,
    is_stmt: bool,
    basic_block: bool,
    end_sequence: bool,
}

impl LineState {
    fn reset(header: &ProgramHeader) -> Self {
        Self {
            address: 0,
            file: 1,
            line: 1,
            is_stmt: header.default_is_stmt,
            basic_block: false,
            end_sequence: false,
        }
    }
}

/// Run the line program at `offset` in the line section and attach the
/// emitted rows to the module's functions.
pub(crate) fn run_program(
    module: &mut Module,
    line_section: &[u8],
    offset: u32,
    comp_dir: &str,
    address_size: u8,
) -> Result<()> {
    let Some(data) = line_section.get(offset as usize..) else {
        warn!("Line-program offset {offset:#x} is outside the line section");
        return Ok(());
    };

    let mut cursor = SectionCursor::new(data, address_size);
    let total_length = cursor.read_u32()? as usize;
    let end = (cursor.position() + total_length).min(data.len());

    let _version = cursor.read_u16()?;
    let _header_length = cursor.read_u32()?;

    let minimum_instruction_length = cursor.read_u8()?;
    let default_is_stmt = cursor.read_u8()? != 0;
    let line_base = cursor.read_u8()? as i8;
    let line_range = cursor.read_u8()?;
    let opcode_base = cursor.read_u8()?;

    let mut standard_opcode_lengths = Vec::with_capacity(opcode_base.saturating_sub(1) as usize);
    for _ in 1..opcode_base {
        standard_opcode_lengths.push(cursor.read_u8()?);
    }

    // Include directories; index 0 is the compilation directory
    let mut directories = Vec::new();
    directories.push(if comp_dir.is_empty() { ".".to_string() } else { comp_dir.to_string() });
    loop {
        let dir = cursor.read_inline_str()?;
        if dir.is_empty() {
            break;
        }
        if dir.starts_with('/') {
            directories.push(dir.to_string());
        } else {
            directories.push(format!("{}/{}", directories[0], dir));
        }
    }

    // File-name table; file numbering starts at 1
    let mut files = Vec::new();
    loop {
        let file = cursor.read_inline_str()?;
        if file.is_empty() {
            break;
        }
        let dir_index = cursor.read_uleb128()? as usize;
        let _mod_time = cursor.read_uleb128()?;
        let _length = cursor.read_uleb128()?;
        let dir = directories.get(dir_index).unwrap_or_else(|| {
            warn!("Directory index {dir_index} is out of range, using the compilation directory");
            &directories[0]
        });
        files.push(module.add_source(dir, file));
    }

    let header = ProgramHeader {
        minimum_instruction_length,
        default_is_stmt,
        line_base,
        line_range,
        opcode_base,
        standard_opcode_lengths,
        files,
    };
    if header.line_range == 0 {
        warn!("Line program declares a zero line range, skipping");
        return Ok(());
    }

    let mut state = LineState::reset(&header);
    while cursor.position() < end {
        let opcode = cursor.read_u8()?;

        if opcode >= header.opcode_base {
            // Special opcode: one row per opcode
            let delta = opcode - header.opcode_base;
            state.address = state.address.wrapping_add(
                u32::from(delta / header.line_range)
                    * u32::from(header.minimum_instruction_length),
            );
            state.line +=
                i64::from(header.line_base) + i64::from(delta % header.line_range);
            emit(module, &header, &state);
            continue;
        }

        match opcode {
            0 => {
                // Extended opcode; the length is recorded but unused
                let length = cursor.read_uleb128()?;
                let sub_opcode = cursor.read_u8()?;
                match sub_opcode {
                    line_ops::DW_LNE_END_SEQUENCE => {
                        state.end_sequence = true;
                        emit(module, &header, &state);
                        state = LineState::reset(&header);
                    }
                    line_ops::DW_LNE_SET_ADDRESS => {
                        let word = cursor.read_address()?;
                        state.address = module.load_address().wrapping_add(word);
                    }
                    line_ops::DW_LNE_DEFINE_FILE => {
                        let _name = cursor.read_inline_str()?;
                        let _dir = cursor.read_uleb128()?;
                        let _mod_time = cursor.read_uleb128()?;
                        let _file_length = cursor.read_uleb128()?;
                        warn!("DW_LNE_define_file is not implemented");
                    }
                    other => {
                        warn!("Unsupported extended line opcode {other:#x}, skipping");
                        cursor.skip((length as usize).saturating_sub(1))?;
                    }
                }
            }
            line_ops::DW_LNS_COPY => {
                emit(module, &header, &state);
                state.basic_block = false;
            }
            line_ops::DW_LNS_ADVANCE_PC => {
                state.address = state.address.wrapping_add(
                    cursor.read_uleb128()? as u32
                        * u32::from(header.minimum_instruction_length),
                );
            }
            line_ops::DW_LNS_ADVANCE_LINE => {
                state.line += cursor.read_sleb128()?;
            }
            line_ops::DW_LNS_SET_FILE => {
                state.file = cursor.read_uleb128()?;
            }
            line_ops::DW_LNS_SET_COLUMN => {
                let _column = cursor.read_uleb128()?;
            }
            line_ops::DW_LNS_NEGATE_STMT => {
                state.is_stmt = !state.is_stmt;
            }
            line_ops::DW_LNS_SET_BASIC_BLOCK => {
                state.basic_block = true;
            }
            line_ops::DW_LNS_CONST_ADD_PC => {
                let delta = 255 - header.opcode_base;
                state.address = state.address.wrapping_add(
                    u32::from(delta / header.line_range)
                        * u32::from(header.minimum_instruction_length),
                );
            }
            line_ops::DW_LNS_FIXED_ADVANCE_PC => {
                state.address = state.address.wrapping_add(u32::from(cursor.read_u16()?));
            }
            other => {
                // Unknown standard opcode: skip its declared operands
                let count = header
                    .standard_opcode_lengths
                    .get((other - 1) as usize)
                    .copied()
                    .unwrap_or(0);
                warn!("Unsupported standard line opcode {other:#x}, skipping {count} operands");
                for _ in 0..count {
                    cursor.read_uleb128()?;
                }
            }
        }
    }

    Ok(())
}

/// Attach one emitted row to the function covering its address
fn emit(module: &mut Module, header: &ProgramHeader, state: &LineState) {
    let Some(func) = module.function_covering(state.address) else {
        return;
    };
    let Symbol::Function { address, .. } = module.symbol(func) else {
        return;
    };
    let func_address = *address;

    let Some(&source) = (state.file as usize)
        .checked_sub(1)
        .and_then(|idx| header.files.get(idx))
    else {
        warn!("Line row references file {} outside the file table", state.file);
        return;
    };

    let record = LineRecord {
        offset: state.address.wrapping_sub(func_address),
        source,
        line: state.line.max(0) as u32,
    };
    if let Err(err) = module.add_line_record(func, record) {
        warn!("Cannot attach line record: {err}");
    }
}
