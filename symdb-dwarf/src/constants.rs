//! DWARF 2 wire-format constants
//!
//! Only the subset the parser consumes. Values are from the DWARF 2
//! standard; each family lives in its own module so call sites read as
//! `tags::DW_TAG_SUBPROGRAM`, `forms::DW_FORM_DATA4` and so on.

#![allow(missing_docs)]

/// Debug-entry tags
pub mod tags {
    pub const DW_TAG_ARRAY_TYPE: u16 = 0x01;
    pub const DW_TAG_CLASS_TYPE: u16 = 0x02;
    pub const DW_TAG_ENUMERATION_TYPE: u16 = 0x04;
    pub const DW_TAG_FORMAL_PARAMETER: u16 = 0x05;
    pub const DW_TAG_LABEL: u16 = 0x0a;
    pub const DW_TAG_LEXICAL_BLOCK: u16 = 0x0b;
    pub const DW_TAG_MEMBER: u16 = 0x0d;
    pub const DW_TAG_POINTER_TYPE: u16 = 0x0f;
    pub const DW_TAG_REFERENCE_TYPE: u16 = 0x10;
    pub const DW_TAG_COMPILE_UNIT: u16 = 0x11;
    pub const DW_TAG_STRUCTURE_TYPE: u16 = 0x13;
    pub const DW_TAG_SUBROUTINE_TYPE: u16 = 0x15;
    pub const DW_TAG_TYPEDEF: u16 = 0x16;
    pub const DW_TAG_UNION_TYPE: u16 = 0x17;
    pub const DW_TAG_UNSPECIFIED_PARAMETERS: u16 = 0x18;
    pub const DW_TAG_INLINED_SUBROUTINE: u16 = 0x1d;
    pub const DW_TAG_SUBRANGE_TYPE: u16 = 0x21;
    pub const DW_TAG_BASE_TYPE: u16 = 0x24;
    pub const DW_TAG_CONST_TYPE: u16 = 0x26;
    pub const DW_TAG_ENUMERATOR: u16 = 0x28;
    pub const DW_TAG_SUBPROGRAM: u16 = 0x2e;
    pub const DW_TAG_VARIABLE: u16 = 0x34;
    pub const DW_TAG_VOLATILE_TYPE: u16 = 0x35;
}

/// Debug-entry attributes
pub mod attributes {
    pub const DW_AT_SIBLING: u16 = 0x01;
    pub const DW_AT_LOCATION: u16 = 0x02;
    pub const DW_AT_NAME: u16 = 0x03;
    pub const DW_AT_BYTE_SIZE: u16 = 0x0b;
    pub const DW_AT_BIT_OFFSET: u16 = 0x0c;
    pub const DW_AT_BIT_SIZE: u16 = 0x0d;
    pub const DW_AT_STMT_LIST: u16 = 0x10;
    pub const DW_AT_LOW_PC: u16 = 0x11;
    pub const DW_AT_HIGH_PC: u16 = 0x12;
    pub const DW_AT_COMP_DIR: u16 = 0x1b;
    pub const DW_AT_CONST_VALUE: u16 = 0x1c;
    pub const DW_AT_INLINE: u16 = 0x20;
    pub const DW_AT_LOWER_BOUND: u16 = 0x22;
    pub const DW_AT_UPPER_BOUND: u16 = 0x2f;
    pub const DW_AT_COUNT: u16 = 0x37;
    pub const DW_AT_DATA_MEMBER_LOCATION: u16 = 0x38;
    pub const DW_AT_DECLARATION: u16 = 0x3c;
    pub const DW_AT_ENCODING: u16 = 0x3e;
    pub const DW_AT_EXTERNAL: u16 = 0x3f;
    pub const DW_AT_FRAME_BASE: u16 = 0x40;
    pub const DW_AT_TYPE: u16 = 0x49;
}

/// Attribute forms
pub mod forms {
    pub const DW_FORM_ADDR: u16 = 0x01;
    pub const DW_FORM_BLOCK2: u16 = 0x03;
    pub const DW_FORM_BLOCK4: u16 = 0x04;
    pub const DW_FORM_DATA2: u16 = 0x05;
    pub const DW_FORM_DATA4: u16 = 0x06;
    pub const DW_FORM_DATA8: u16 = 0x07;
    pub const DW_FORM_STRING: u16 = 0x08;
    pub const DW_FORM_BLOCK: u16 = 0x09;
    pub const DW_FORM_BLOCK1: u16 = 0x0a;
    pub const DW_FORM_DATA1: u16 = 0x0b;
    pub const DW_FORM_FLAG: u16 = 0x0c;
    pub const DW_FORM_SDATA: u16 = 0x0d;
    pub const DW_FORM_STRP: u16 = 0x0e;
    pub const DW_FORM_UDATA: u16 = 0x0f;
    pub const DW_FORM_REF_ADDR: u16 = 0x10;
    pub const DW_FORM_REF1: u16 = 0x11;
    pub const DW_FORM_REF2: u16 = 0x12;
    pub const DW_FORM_REF4: u16 = 0x13;
    pub const DW_FORM_REF8: u16 = 0x14;
    pub const DW_FORM_REF_UDATA: u16 = 0x15;
    pub const DW_FORM_INDIRECT: u16 = 0x16;
}

/// Base-type encodings
pub mod encodings {
    pub const DW_ATE_VOID: u64 = 0x00;
    pub const DW_ATE_ADDRESS: u64 = 0x01;
    pub const DW_ATE_BOOLEAN: u64 = 0x02;
    pub const DW_ATE_COMPLEX_FLOAT: u64 = 0x03;
    pub const DW_ATE_FLOAT: u64 = 0x04;
    pub const DW_ATE_SIGNED: u64 = 0x05;
    pub const DW_ATE_SIGNED_CHAR: u64 = 0x06;
    pub const DW_ATE_UNSIGNED: u64 = 0x07;
    pub const DW_ATE_UNSIGNED_CHAR: u64 = 0x08;
}

/// Location-expression opcodes
pub mod ops {
    pub const DW_OP_ADDR: u8 = 0x03;
    pub const DW_OP_CONST1U: u8 = 0x08;
    pub const DW_OP_CONST1S: u8 = 0x09;
    pub const DW_OP_CONST2U: u8 = 0x0a;
    pub const DW_OP_CONST2S: u8 = 0x0b;
    pub const DW_OP_CONST4U: u8 = 0x0c;
    pub const DW_OP_CONST4S: u8 = 0x0d;
    pub const DW_OP_CONSTU: u8 = 0x10;
    pub const DW_OP_CONSTS: u8 = 0x11;
    pub const DW_OP_PLUS_UCONST: u8 = 0x23;
    pub const DW_OP_REG0: u8 = 0x50;
    pub const DW_OP_REG31: u8 = 0x6f;
    pub const DW_OP_BREG0: u8 = 0x70;
    pub const DW_OP_BREG31: u8 = 0x8f;
    pub const DW_OP_FBREG: u8 = 0x91;
    pub const DW_OP_PIECE: u8 = 0x93;
}

/// Line-number program opcodes
pub mod line_ops {
    pub const DW_LNS_COPY: u8 = 1;
    pub const DW_LNS_ADVANCE_PC: u8 = 2;
    pub const DW_LNS_ADVANCE_LINE: u8 = 3;
    pub const DW_LNS_SET_FILE: u8 = 4;
    pub const DW_LNS_SET_COLUMN: u8 = 5;
    pub const DW_LNS_NEGATE_STMT: u8 = 6;
    pub const DW_LNS_SET_BASIC_BLOCK: u8 = 7;
    pub const DW_LNS_CONST_ADD_PC: u8 = 8;
    pub const DW_LNS_FIXED_ADVANCE_PC: u8 = 9;

    pub const DW_LNE_END_SEQUENCE: u8 = 1;
    pub const DW_LNE_SET_ADDRESS: u8 = 2;
    pub const DW_LNE_DEFINE_FILE: u8 = 3;
}
