//! Location-expression evaluation
//!
//! A location attribute is either a numeric constant (the offset
//! directly) or a block of DWARF expression opcodes run on a small
//! stack. The evaluator tracks the register disposition on the side and
//! returns the [`Location`] sum type; the wire format's sentinel
//! register numbers never leave this module.

use log::warn;
use symdb_error::{codes, Error, ErrorCategory, Result};
use symdb_sym::Location;

use crate::attr::AttrValue;
use crate::constants::ops;
use crate::cursor::SectionCursor;

/// Expression stack capacity; deeper expressions are a decoding error
const STACK_SIZE: usize = 64;

/// Evaluate a location attribute value.
///
/// Numeric constants resolve directly to an absolute offset; blocks are
/// run through the expression machine. Any other value class is
/// rejected (a `data4` location-list reference decodes as a constant
/// and therefore resolves absolute, which callers treat as "no
/// register").
pub fn evaluate(value: &AttrValue<'_>, address_size: u8) -> Result<Location> {
    match value {
        AttrValue::Unsigned(v) => Ok(Location::Absolute { offset: *v as i64 }),
        AttrValue::Signed(v) => Ok(Location::Absolute { offset: *v }),
        AttrValue::Address(a) => Ok(Location::Absolute { offset: i64::from(*a) }),
        AttrValue::Block(bytes) => evaluate_block(bytes, address_size),
        AttrValue::Str(_) | AttrValue::Reference(_) => {
            Err(Error::parse_error("Location attribute is neither constant nor block"))
        }
    }
}

struct Stack {
    slots: [i64; STACK_SIZE],
    depth: usize,
}

impl Stack {
    fn push(&mut self, value: i64) -> Result<()> {
        if self.depth == STACK_SIZE {
            return Err(Error::new(
                ErrorCategory::Capacity,
                codes::EVALUATION_STACK_OVERFLOW,
                "Location-expression stack overflow",
            ));
        }
        self.slots[self.depth] = value;
        self.depth += 1;
        Ok(())
    }

    // An empty stack pops zero; `plus_uconst 0` leads many
    // data-member-location blocks.
    fn pop(&mut self) -> i64 {
        if self.depth == 0 {
            return 0;
        }
        self.depth -= 1;
        self.slots[self.depth]
    }

    fn top(&self) -> i64 {
        if self.depth == 0 { 0 } else { self.slots[self.depth - 1] }
    }
}

fn evaluate_block(bytes: &[u8], address_size: u8) -> Result<Location> {
    let mut cursor = SectionCursor::new(bytes, address_size);
    let mut stack = Stack { slots: [0; STACK_SIZE], depth: 0 };

    let mut register: Option<u16> = None;
    let mut frame_relative = false;
    let mut deref = false;
    let mut piece_emitted = false;

    while !cursor.is_at_end() {
        let op = cursor.read_u8()?;
        match op {
            ops::DW_OP_ADDR => stack.push(i64::from(cursor.read_address()?))?,
            ops::DW_OP_CONST1U => stack.push(i64::from(cursor.read_u8()?))?,
            ops::DW_OP_CONST1S => stack.push(i64::from(cursor.read_u8()? as i8))?,
            ops::DW_OP_CONST2U => stack.push(i64::from(cursor.read_u16()?))?,
            ops::DW_OP_CONST2S => stack.push(i64::from(cursor.read_u16()? as i16))?,
            ops::DW_OP_CONST4U => stack.push(i64::from(cursor.read_u32()?))?,
            ops::DW_OP_CONST4S => stack.push(i64::from(cursor.read_u32()? as i32))?,
            ops::DW_OP_CONSTU => stack.push(cursor.read_uleb128()? as i64)?,
            ops::DW_OP_CONSTS => stack.push(cursor.read_sleb128()?)?,
            ops::DW_OP_PLUS_UCONST => {
                let addend = cursor.read_uleb128()? as i64;
                let top = stack.pop();
                stack.push(top.wrapping_add(addend))?;
            }
            ops::DW_OP_REG0..=ops::DW_OP_REG31 => {
                let reg = u16::from(op - ops::DW_OP_REG0);
                // A piece splits one object across registers; the first
                // selected register stays in effect.
                if piece_emitted && register.is_some() {
                    continue;
                }
                register = Some(reg);
                frame_relative = false;
                deref = false;
            }
            ops::DW_OP_BREG0..=ops::DW_OP_BREG31 => {
                register = Some(u16::from(op - ops::DW_OP_BREG0));
                frame_relative = false;
                deref = true;
                stack.push(cursor.read_sleb128()?)?;
            }
            ops::DW_OP_FBREG => {
                frame_relative = true;
                deref = true;
                stack.push(cursor.read_sleb128()?)?;
            }
            ops::DW_OP_PIECE => {
                let size = cursor.read_uleb128()?;
                warn!("DW_OP_piece ({size} bytes) is not composed, keeping first location");
                piece_emitted = true;
            }
            _ => {
                warn!("Unsupported location opcode {op:#04x}, returning partial result");
                break;
            }
        }
    }

    let offset = stack.top();
    if frame_relative {
        Ok(Location::FrameRelative { offset })
    } else if let Some(register) = register {
        Ok(Location::Register { register, deref, offset })
    } else {
        Ok(Location::Absolute { offset })
    }
}
