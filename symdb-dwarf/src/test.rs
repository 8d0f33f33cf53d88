//! Whole-pipeline tests over hand-assembled debug sections

use symdb_format::{write_sleb128, write_uleb128};
use symdb_sym::{
    BasicKind, DataKind, Linkage, Module, Symbol, ThunkRange, UdtKind, VarStorage, X86RegisterMap,
};

use crate::constants::{attributes as at, forms, line_ops, ops, tags};
use crate::die::UNIT_HEADER_SIZE;
use crate::sections::SectionSet;
use crate::{parse, DEBUG_FORMAT, DEBUG_SIGNATURE};

/// Byte-wise section builder
#[derive(Default)]
struct SectionBuilder {
    bytes: Vec<u8>,
}

impl SectionBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    fn u16(&mut self, value: u16) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    fn uleb(&mut self, value: u64) -> &mut Self {
        self.bytes.extend_from_slice(&write_uleb128(value));
        self
    }

    fn sleb(&mut self, value: i64) -> &mut Self {
        self.bytes.extend_from_slice(&write_sleb128(value));
        self
    }

    fn str(&mut self, value: &str) -> &mut Self {
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(0);
        self
    }

    fn raw(&mut self, value: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(value);
        self
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// One abbreviation declaration
fn abbrev_decl(
    out: &mut SectionBuilder,
    code: u64,
    tag: u16,
    has_children: bool,
    attrs: &[(u16, u16)],
) {
    out.uleb(code).uleb(u64::from(tag)).u8(u8::from(has_children));
    for &(attr, form) in attrs {
        out.uleb(u64::from(attr)).uleb(u64::from(form));
    }
    out.uleb(0).uleb(0);
}

/// Wrap a unit body into a compilation unit at the given section start
fn unit(body: &[u8], version: u16, abbrev_offset: u32) -> Vec<u8> {
    let mut out = SectionBuilder::new();
    out.u32((UNIT_HEADER_SIZE - 4) + body.len() as u32);
    out.u16(version);
    out.u32(abbrev_offset);
    out.u8(4);
    out.raw(body);
    out.bytes
}

fn parse_into(module: &mut Module, debug: &[u8], abbrev: &[u8], line: Option<&[u8]>) {
    let sections = SectionSet::new(debug, abbrev, &[], line);
    parse(module, &[], &X86RegisterMap, &sections).unwrap();
}

fn basic_types(module: &Module) -> Vec<&Symbol> {
    module
        .symbols()
        .iter()
        .filter(|s| matches!(s, Symbol::BasicType { .. }))
        .collect()
}

#[test]
fn minimal_unit_creates_a_compiland() {
    let mut abbrev = SectionBuilder::new();
    abbrev_decl(&mut abbrev, 1, tags::DW_TAG_COMPILE_UNIT, false, &[(
        at::DW_AT_NAME,
        forms::DW_FORM_STRING,
    )]);
    abbrev.uleb(0);

    let mut body = SectionBuilder::new();
    body.uleb(1).str("foo.c");

    let mut module = Module::new(0);
    parse_into(&mut module, &unit(&body.bytes, 2, 0), &abbrev.bytes, None);

    let compilands: Vec<_> = module
        .symbols()
        .iter()
        .filter_map(|s| match s {
            Symbol::Compiland { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(compilands, ["foo.c"]);
    assert_eq!(module.debug_format(), Some(DEBUG_FORMAT));
    assert_eq!(module.debug_signature(), DEBUG_SIGNATURE);
}

#[test]
fn base_type_and_pointer_over_it() {
    let mut abbrev = SectionBuilder::new();
    abbrev_decl(&mut abbrev, 1, tags::DW_TAG_COMPILE_UNIT, true, &[(
        at::DW_AT_NAME,
        forms::DW_FORM_STRING,
    )]);
    abbrev_decl(&mut abbrev, 2, tags::DW_TAG_BASE_TYPE, false, &[
        (at::DW_AT_NAME, forms::DW_FORM_STRING),
        (at::DW_AT_BYTE_SIZE, forms::DW_FORM_DATA1),
        (at::DW_AT_ENCODING, forms::DW_FORM_DATA1),
    ]);
    abbrev_decl(&mut abbrev, 3, tags::DW_TAG_POINTER_TYPE, false, &[
        (at::DW_AT_TYPE, forms::DW_FORM_REF4),
        (at::DW_AT_BYTE_SIZE, forms::DW_FORM_DATA1),
    ]);
    abbrev.uleb(0);

    let mut body = SectionBuilder::new();
    body.uleb(1).str("ptr.c");
    let int_offset = UNIT_HEADER_SIZE + body.len() as u32;
    body.uleb(2).str("int").u8(4).u8(5); // signed, 4 bytes
    body.uleb(3).u32(int_offset).u8(4);
    body.uleb(0);

    let mut module = Module::new(0);
    parse_into(&mut module, &unit(&body.bytes, 2, 0), &abbrev.bytes, None);

    let ints = basic_types(&module);
    assert_eq!(ints.len(), 1);
    let Symbol::BasicType { name, kind, size } = ints[0] else { unreachable!() };
    assert_eq!(name, "int");
    assert_eq!(*kind, BasicKind::Int);
    assert_eq!(*size, 4);

    let pointers: Vec<_> = module
        .symbols()
        .iter()
        .filter_map(|s| match s {
            Symbol::PointerType { referent } => Some(referent),
            _ => None,
        })
        .collect();
    assert_eq!(pointers.len(), 1);
    let referent = pointers[0].expect("pointer must resolve its referent");
    assert!(matches!(module.symbol(referent), Symbol::BasicType { .. }));
    assert!(module.capabilities().type_info);
}

#[test]
fn struct_bit_field_is_renumbered_from_the_lsb() {
    let mut abbrev = SectionBuilder::new();
    abbrev_decl(&mut abbrev, 1, tags::DW_TAG_COMPILE_UNIT, true, &[(
        at::DW_AT_NAME,
        forms::DW_FORM_STRING,
    )]);
    abbrev_decl(&mut abbrev, 2, tags::DW_TAG_BASE_TYPE, false, &[
        (at::DW_AT_NAME, forms::DW_FORM_STRING),
        (at::DW_AT_BYTE_SIZE, forms::DW_FORM_DATA1),
        (at::DW_AT_ENCODING, forms::DW_FORM_DATA1),
    ]);
    abbrev_decl(&mut abbrev, 3, tags::DW_TAG_STRUCTURE_TYPE, true, &[
        (at::DW_AT_NAME, forms::DW_FORM_STRING),
        (at::DW_AT_BYTE_SIZE, forms::DW_FORM_DATA1),
    ]);
    abbrev_decl(&mut abbrev, 4, tags::DW_TAG_MEMBER, false, &[
        (at::DW_AT_NAME, forms::DW_FORM_STRING),
        (at::DW_AT_TYPE, forms::DW_FORM_REF4),
        (at::DW_AT_DATA_MEMBER_LOCATION, forms::DW_FORM_BLOCK1),
        (at::DW_AT_BIT_OFFSET, forms::DW_FORM_DATA1),
        (at::DW_AT_BIT_SIZE, forms::DW_FORM_DATA1),
    ]);
    abbrev.uleb(0);

    let mut body = SectionBuilder::new();
    body.uleb(1).str("s.c");
    let uint_offset = UNIT_HEADER_SIZE + body.len() as u32;
    body.uleb(2).str("unsigned int").u8(4).u8(7);
    body.uleb(3).str("S").u8(4);
    {
        // member f: data_member_location [plus_uconst 0], bits 20..24
        body.uleb(4).str("f").u32(uint_offset);
        body.u8(2).u8(ops::DW_OP_PLUS_UCONST).u8(0);
        body.u8(20).u8(4);
    }
    body.uleb(0); // end of struct children
    body.uleb(0); // end of unit children

    let mut module = Module::new(0);
    parse_into(&mut module, &unit(&body.bytes, 2, 0), &abbrev.bytes, None);

    let udts: Vec<_> = module
        .symbols()
        .iter()
        .filter(|s| matches!(s, Symbol::Udt { .. }))
        .collect();
    assert_eq!(udts.len(), 1);
    let Symbol::Udt { name, kind, size, members } = udts[0] else { unreachable!() };
    assert_eq!(name, "S");
    assert_eq!(*kind, UdtKind::Struct);
    assert_eq!(*size, 4);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "f");
    // 4 * 8 - 20 - 4
    assert_eq!(members[0].bit_offset, 8);
    assert_eq!(members[0].bit_size, Some(4));
}

/// Abbreviations shared by the subprogram-shaped tests: compile unit
/// (optionally carrying a line program), subprogram with frame base,
/// and a variable with a location block.
fn subprogram_abbrevs(with_lines: bool) -> SectionBuilder {
    let mut abbrev = SectionBuilder::new();
    if with_lines {
        abbrev_decl(&mut abbrev, 1, tags::DW_TAG_COMPILE_UNIT, true, &[
            (at::DW_AT_NAME, forms::DW_FORM_STRING),
            (at::DW_AT_COMP_DIR, forms::DW_FORM_STRING),
            (at::DW_AT_STMT_LIST, forms::DW_FORM_DATA4),
        ]);
    } else {
        abbrev_decl(&mut abbrev, 1, tags::DW_TAG_COMPILE_UNIT, true, &[(
            at::DW_AT_NAME,
            forms::DW_FORM_STRING,
        )]);
    }
    abbrev_decl(&mut abbrev, 2, tags::DW_TAG_SUBPROGRAM, true, &[
        (at::DW_AT_NAME, forms::DW_FORM_STRING),
        (at::DW_AT_LOW_PC, forms::DW_FORM_ADDR),
        (at::DW_AT_HIGH_PC, forms::DW_FORM_ADDR),
        (at::DW_AT_FRAME_BASE, forms::DW_FORM_BLOCK1),
    ]);
    abbrev_decl(&mut abbrev, 3, tags::DW_TAG_VARIABLE, false, &[
        (at::DW_AT_NAME, forms::DW_FORM_STRING),
        (at::DW_AT_LOCATION, forms::DW_FORM_BLOCK1),
    ]);
    abbrev.uleb(0);
    abbrev
}

#[test]
fn breg_local_binds_to_the_mapped_register() {
    let abbrev = subprogram_abbrevs(false);

    let mut body = SectionBuilder::new();
    body.uleb(1).str("main.c");
    body.uleb(2).str("main").u32(0x1000).u32(0x1100);
    body.u8(2).u8(ops::DW_OP_BREG0 + 5).sleb(8); // frame base: ebp + 8
    {
        let mut loc = SectionBuilder::new();
        loc.u8(ops::DW_OP_BREG0 + 5).sleb(-16);
        body.uleb(3).str("x").u8(loc.len() as u8).raw(&loc.bytes);
    }
    body.uleb(0); // end of subprogram children
    body.uleb(0); // end of unit children

    let mut module = Module::new(0);
    parse_into(&mut module, &unit(&body.bytes, 2, 0), &abbrev.bytes, None);

    let func = module.function_covering(0x1000).expect("main must exist");
    let Symbol::Function { name, address, size, frame, locals, .. } = module.symbol(func) else {
        unreachable!()
    };
    assert_eq!(name, "main");
    assert_eq!(*address, 0x1000);
    assert_eq!(*size, 0x100);
    // DWARF register 5 is ebp, CodeView 22
    assert_eq!(frame.register, 22);
    assert_eq!(frame.offset, 8);

    assert_eq!(locals.len(), 1);
    assert_eq!(locals[0].name, "x");
    assert!(!locals[0].is_parameter);
    assert_eq!(
        locals[0].storage,
        VarStorage::Register { register: 22, deref: true, offset: -16 }
    );
}

#[test]
fn fbreg_local_rebases_onto_the_frame_register() {
    let abbrev = subprogram_abbrevs(false);

    let mut body = SectionBuilder::new();
    body.uleb(1).str("main.c");
    body.uleb(2).str("main").u32(0x1000).u32(0x1100);
    body.u8(2).u8(ops::DW_OP_BREG0 + 5).sleb(8);
    {
        let mut loc = SectionBuilder::new();
        loc.u8(ops::DW_OP_FBREG).sleb(-12);
        body.uleb(3).str("y").u8(loc.len() as u8).raw(&loc.bytes);
    }
    body.uleb(0);
    body.uleb(0);

    let mut module = Module::new(0);
    parse_into(&mut module, &unit(&body.bytes, 2, 0), &abbrev.bytes, None);

    let func = module.function_covering(0x1000).unwrap();
    let Symbol::Function { locals, .. } = module.symbol(func) else { unreachable!() };
    // frame offset 8 is folded into the variable offset
    assert_eq!(
        locals[0].storage,
        VarStorage::Register { register: 22, deref: true, offset: -4 }
    );
}

#[test]
fn thunk_subprograms_are_excluded() {
    let abbrev = subprogram_abbrevs(false);

    let mut body = SectionBuilder::new();
    body.uleb(1).str("main.c");
    body.uleb(2).str("stub").u32(0x1000).u32(0x1010);
    body.u8(2).u8(ops::DW_OP_BREG0 + 5).sleb(8);
    body.uleb(0);
    body.uleb(0);

    let thunks = [ThunkRange { start: 0x0800, end: 0x1008 }];
    let mut module = Module::new(0);
    let debug = unit(&body.bytes, 2, 0);
    let sections = SectionSet::new(&debug, &abbrev.bytes, &[], None);
    parse(&mut module, &thunks, &X86RegisterMap, &sections).unwrap();

    assert!(module.functions().is_empty());
    assert!(!module.capabilities().global_symbols);
}

#[test]
fn type_lookups_are_memoized() {
    let mut abbrev = SectionBuilder::new();
    abbrev_decl(&mut abbrev, 1, tags::DW_TAG_COMPILE_UNIT, true, &[(
        at::DW_AT_NAME,
        forms::DW_FORM_STRING,
    )]);
    abbrev_decl(&mut abbrev, 2, tags::DW_TAG_BASE_TYPE, false, &[
        (at::DW_AT_NAME, forms::DW_FORM_STRING),
        (at::DW_AT_BYTE_SIZE, forms::DW_FORM_DATA1),
        (at::DW_AT_ENCODING, forms::DW_FORM_DATA1),
    ]);
    abbrev_decl(&mut abbrev, 3, tags::DW_TAG_VARIABLE, false, &[
        (at::DW_AT_NAME, forms::DW_FORM_STRING),
        (at::DW_AT_TYPE, forms::DW_FORM_REF4),
        (at::DW_AT_LOCATION, forms::DW_FORM_BLOCK1),
        (at::DW_AT_EXTERNAL, forms::DW_FORM_FLAG),
    ]);
    abbrev.uleb(0);

    let mut body = SectionBuilder::new();
    body.uleb(1).str("g.c");
    // Both globals reference the int type ahead of its definition
    let var = |body: &mut SectionBuilder, name: &str, int_offset: u32, addr: u32| {
        let mut loc = SectionBuilder::new();
        loc.u8(ops::DW_OP_ADDR).u32(addr);
        body.uleb(3).str(name).u32(int_offset);
        body.u8(loc.len() as u8).raw(&loc.bytes);
        body.u8(1);
    };
    // int sits after both variables: code(1) + name(2) + ref(4) +
    // location block(1 + 5) + flag(1) per variable
    let first = UNIT_HEADER_SIZE + body.len() as u32;
    let int_offset = first + 2 * 14;
    var(&mut body, "a", int_offset, 0x4000);
    var(&mut body, "b", int_offset, 0x4004);
    assert_eq!(UNIT_HEADER_SIZE + body.len() as u32, int_offset);
    body.uleb(2).str("int").u8(4).u8(5);
    body.uleb(0);

    let mut module = Module::new(0);
    parse_into(&mut module, &unit(&body.bytes, 2, 0), &abbrev.bytes, None);

    assert_eq!(basic_types(&module).len(), 1, "forward references share one symbol");

    let vars: Vec<_> = module
        .symbols()
        .iter()
        .filter_map(|s| match s {
            Symbol::Variable { name, ty, storage, linkage, kind } => {
                Some((name.as_str(), *ty, *storage, *linkage, *kind))
            }
            _ => None,
        })
        .collect();
    assert_eq!(vars.len(), 2);
    assert_eq!(vars[0].1, vars[1].1, "both variables resolve to the same type symbol");
    assert_eq!(vars[0].2, VarStorage::Memory { address: 0x4000 });
    assert_eq!(vars[0].3, Linkage::Global);
    assert_eq!(vars[0].4, DataKind::Global);
}

/// Standard line-program header with one file `a.c` in the compilation
/// directory, followed by `program`.
fn line_section(program: &[u8]) -> Vec<u8> {
    let mut header = SectionBuilder::new();
    header.u8(1); // minimum_instruction_length
    header.u8(1); // default_is_stmt
    header.u8(0xff); // line_base = -1
    header.u8(4); // line_range
    header.u8(13); // opcode_base
    header.raw(&[0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1]);
    header.u8(0); // no include directories
    header.str("a.c").uleb(0).uleb(0).uleb(0);
    header.u8(0); // end of file table

    let mut out = SectionBuilder::new();
    out.u32(2 + 4 + header.len() as u32 + program.len() as u32);
    out.u16(2);
    out.u32(header.len() as u32);
    out.raw(&header.bytes);
    out.raw(program);
    out.bytes
}

fn parse_with_line_program(program: &[u8]) -> Module {
    let abbrev = subprogram_abbrevs(true);

    let mut body = SectionBuilder::new();
    body.uleb(1).str("a.c").str("/src").u32(0);
    body.uleb(2).str("main").u32(0x1000).u32(0x1100);
    body.u8(2).u8(ops::DW_OP_BREG0 + 5).sleb(8);
    body.uleb(0);
    body.uleb(0);

    let mut module = Module::new(0);
    let line = line_section(program);
    parse_into(&mut module, &unit(&body.bytes, 2, 0), &abbrev.bytes, Some(&line));
    module
}

#[test]
fn line_program_special_opcodes_emit_rows() {
    let mut program = SectionBuilder::new();
    program.u8(0).uleb(5).u8(line_ops::DW_LNE_SET_ADDRESS).u32(0x1000);
    program.u8(line_ops::DW_LNS_COPY);
    program.u8(13 + 6); // +1 address, +1 line
    program.u8(0).uleb(1).u8(line_ops::DW_LNE_END_SEQUENCE);

    let module = parse_with_line_program(&program.bytes);

    let (src, line) = module.line_for_address(0x1000).expect("row at 0x1000");
    assert_eq!(line, 1);
    assert_eq!(module.source_path(src), Some("/src/a.c"));

    let (_, line) = module.line_for_address(0x1001).expect("row at 0x1001");
    assert_eq!(line, 2);

    assert!(module.capabilities().line_numbers);
    assert!(module.capabilities().source_indexed);
}

#[test]
fn special_opcodes_match_their_expansion() {
    // special(13 + 2*4 + 3): +2 addresses, -1 + 3 lines
    let mut special = SectionBuilder::new();
    special.u8(0).uleb(5).u8(line_ops::DW_LNE_SET_ADDRESS).u32(0x1000);
    special.u8(line_ops::DW_LNS_COPY);
    special.u8(13 + 2 * 4 + 3);
    special.u8(0).uleb(1).u8(line_ops::DW_LNE_END_SEQUENCE);

    let mut expanded = SectionBuilder::new();
    expanded.u8(0).uleb(5).u8(line_ops::DW_LNE_SET_ADDRESS).u32(0x1000);
    expanded.u8(line_ops::DW_LNS_COPY);
    expanded.u8(line_ops::DW_LNS_ADVANCE_PC).uleb(2);
    expanded.u8(line_ops::DW_LNS_ADVANCE_LINE).sleb(2);
    expanded.u8(line_ops::DW_LNS_COPY);
    expanded.u8(0).uleb(1).u8(line_ops::DW_LNE_END_SEQUENCE);

    let from_special = parse_with_line_program(&special.bytes);
    let from_expansion = parse_with_line_program(&expanded.bytes);

    let lines = |module: &Module| {
        let func = module.function_covering(0x1000).unwrap();
        let Symbol::Function { lines, .. } = module.symbol(func) else { unreachable!() };
        lines.clone()
    };
    assert_eq!(lines(&from_special), lines(&from_expansion));
}

#[test]
fn unsupported_version_units_are_skipped() {
    let mut abbrev = SectionBuilder::new();
    abbrev_decl(&mut abbrev, 1, tags::DW_TAG_COMPILE_UNIT, false, &[(
        at::DW_AT_NAME,
        forms::DW_FORM_STRING,
    )]);
    abbrev.uleb(0);

    let mut v3 = SectionBuilder::new();
    v3.uleb(1).str("new.c");
    let mut v2 = SectionBuilder::new();
    v2.uleb(1).str("old.c");

    let mut debug = unit(&v3.bytes, 3, 0);
    debug.extend_from_slice(&unit(&v2.bytes, 2, 0));

    let mut module = Module::new(0);
    parse_into(&mut module, &debug, &abbrev.bytes, None);

    let compilands: Vec<_> = module
        .symbols()
        .iter()
        .filter_map(|s| match s {
            Symbol::Compiland { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(compilands, ["old.c"]);
}

#[test]
fn missing_sections_fail_the_parse() {
    let mut module = Module::new(0);
    let sections = SectionSet::new(&[], &[], &[], None);
    assert!(parse(&mut module, &[], &X86RegisterMap, &sections).is_err());
    assert_eq!(module.debug_format(), None);
}
