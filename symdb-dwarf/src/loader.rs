//! Semantic loading of debug entries
//!
//! Translates the debug-entry tree of one compilation unit into symbol
//! database objects. Type construction is memoized through the entry's
//! symbol back-pointer, which makes the translation tolerant of forward
//! references and of cycles through pointer and qualifier chains:
//! aggregate and pointer symbols are created empty, recorded, and
//! patched once their referents resolve.
//!
//! Failures are entry-scoped. A handler that cannot translate its entry
//! logs a warning and leaves the back-pointer null; siblings are
//! unaffected.

use log::warn;
use symdb_error::Result;
use symdb_sym::{
    in_thunk_area, BasicKind, DataKind, FrameBase, Linkage, LocalVariable, Location, Module,
    RegisterMapping, Symbol, SymbolId, ThunkRange, UdtKind, UdtMember, VarStorage,
};

use crate::constants::{attributes, encodings, tags};
use crate::die::{DieId, Unit};
use crate::location;
use crate::prelude::{format, String, ToString, Vec};

fn is_type_tag(tag: u16) -> bool {
    matches!(
        tag,
        tags::DW_TAG_BASE_TYPE
            | tags::DW_TAG_TYPEDEF
            | tags::DW_TAG_POINTER_TYPE
            | tags::DW_TAG_REFERENCE_TYPE
            | tags::DW_TAG_CONST_TYPE
            | tags::DW_TAG_VOLATILE_TYPE
            | tags::DW_TAG_ARRAY_TYPE
            | tags::DW_TAG_ENUMERATION_TYPE
            | tags::DW_TAG_STRUCTURE_TYPE
            | tags::DW_TAG_CLASS_TYPE
            | tags::DW_TAG_UNION_TYPE
            | tags::DW_TAG_SUBROUTINE_TYPE
    )
}

/// Scope threaded through the children of a subprogram
#[derive(Clone, Copy)]
struct FunctionScope {
    func: SymbolId,
    signature: SymbolId,
    address: u32,
    frame: FrameBase,
    block: Option<usize>,
}

/// Translates one unit's entries into database symbols
pub(crate) struct UnitLoader<'a, 'ctx> {
    unit: &'ctx mut Unit<'a>,
    module: &'ctx mut Module,
    registers: &'ctx dyn RegisterMapping,
    thunks: &'ctx [ThunkRange],
    synthetic_names: &'ctx mut u32,
}

impl<'a, 'ctx> UnitLoader<'a, 'ctx> {
    pub(crate) fn new(
        unit: &'ctx mut Unit<'a>,
        module: &'ctx mut Module,
        registers: &'ctx dyn RegisterMapping,
        thunks: &'ctx [ThunkRange],
        synthetic_names: &'ctx mut u32,
    ) -> Self {
        Self { unit, module, registers, thunks, synthetic_names }
    }

    /// Translate the whole unit. Returns the compiland, or `None` when
    /// the unit root is not a compile unit.
    pub(crate) fn load(&mut self) -> Result<Option<SymbolId>> {
        let Some(root) = self.unit.root() else {
            return Ok(None);
        };
        if self.unit.entry(root).tag != tags::DW_TAG_COMPILE_UNIT {
            warn!("Unit root entry is not a compile unit, skipping");
            return Ok(None);
        }

        let name = self.entry_name(root, "compiland")?;
        let compiland = self.module.add_symbol(Symbol::Compiland { name });
        self.unit.set_symbol(root, compiland);

        for die in self.unit.children(root).to_vec() {
            if let Err(err) = self.load_top_level(die) {
                warn!("Entry at {:#x} failed: {err}", self.unit.entry(die).offset);
            }
        }
        Ok(Some(compiland))
    }

    fn load_top_level(&mut self, die: DieId) -> Result<()> {
        let tag = self.unit.entry(die).tag;
        match tag {
            tags::DW_TAG_SUBPROGRAM => {
                self.load_subprogram(die)?;
            }
            tags::DW_TAG_VARIABLE => self.load_variable(die, None)?,
            t if is_type_tag(t) => {
                self.build_type(die)?;
            }
            other => warn!("Unhandled top-level tag {other:#x}"),
        }
        Ok(())
    }

    // ---- attribute conveniences -------------------------------------

    fn attr_unsigned(&self, die: DieId, at: u16) -> Result<Option<u64>> {
        Ok(self.unit.find_attribute(die, at)?.and_then(|v| v.unsigned()))
    }

    fn attr_signed(&self, die: DieId, at: u16) -> Result<Option<i64>> {
        Ok(self.unit.find_attribute(die, at)?.and_then(|v| v.signed()))
    }

    fn attr_flag(&self, die: DieId, at: u16) -> Result<bool> {
        Ok(self.unit.find_attribute(die, at)?.is_some_and(|v| v.flag()))
    }

    /// The entry's name, or a synthetic `<prefix>_<n>` when it has none
    fn entry_name(&mut self, die: DieId, prefix: &str) -> Result<String> {
        if let Some(value) = self.unit.find_attribute(die, attributes::DW_AT_NAME)? {
            if let Some(s) = value.string() {
                return Ok(s.to_string());
            }
        }
        let n = *self.synthetic_names;
        *self.synthetic_names += 1;
        Ok(format!("{prefix}_{n}"))
    }

    // ---- types ------------------------------------------------------

    /// Resolve the entry's type attribute to a database symbol, forcing
    /// the referenced entry's translation if it has not been built yet.
    /// Absent type attributes are the null type.
    fn lookup_type(&mut self, die: DieId) -> Result<Option<SymbolId>> {
        let Some(value) = self.unit.find_attribute(die, attributes::DW_AT_TYPE)? else {
            return Ok(None);
        };
        let Some(offset) = value.reference() else {
            warn!("Type attribute is not a reference");
            return Ok(None);
        };
        let Some(target) = self.unit.entry_at_offset(offset) else {
            warn!("Type reference {offset:#x} does not resolve to an entry");
            return Ok(None);
        };
        if let Some(existing) = self.unit.symbol(target) {
            return Ok(Some(existing));
        }
        self.build_type(target)
    }

    /// Translate a type entry, memoized
    fn build_type(&mut self, die: DieId) -> Result<Option<SymbolId>> {
        if let Some(existing) = self.unit.symbol(die) {
            return Ok(Some(existing));
        }
        match self.unit.entry(die).tag {
            tags::DW_TAG_BASE_TYPE => self.build_base_type(die).map(Some),
            tags::DW_TAG_TYPEDEF => self.build_typedef(die).map(Some),
            tags::DW_TAG_POINTER_TYPE | tags::DW_TAG_REFERENCE_TYPE => {
                self.build_pointer(die).map(Some)
            }
            // Qualifiers are not represented; the entry resolves
            // straight to the qualified type.
            tags::DW_TAG_CONST_TYPE | tags::DW_TAG_VOLATILE_TYPE => {
                let inner = self.lookup_type(die)?;
                if let Some(inner) = inner {
                    self.unit.set_symbol(die, inner);
                }
                Ok(inner)
            }
            tags::DW_TAG_ARRAY_TYPE => self.build_array(die),
            tags::DW_TAG_ENUMERATION_TYPE => self.build_enumeration(die).map(Some),
            tags::DW_TAG_STRUCTURE_TYPE => self.build_udt(die, UdtKind::Struct, true).map(Some),
            tags::DW_TAG_CLASS_TYPE => self.build_udt(die, UdtKind::Class, true).map(Some),
            tags::DW_TAG_UNION_TYPE => self.build_udt(die, UdtKind::Union, true).map(Some),
            tags::DW_TAG_SUBROUTINE_TYPE => self.build_subroutine_type(die).map(Some),
            other => {
                warn!("Unhandled type tag {other:#x}");
                Ok(None)
            }
        }
    }

    fn build_base_type(&mut self, die: DieId) -> Result<SymbolId> {
        let name = self.entry_name(die, "base_type")?;
        let size = self.attr_unsigned(die, attributes::DW_AT_BYTE_SIZE)?.unwrap_or(0) as u32;
        let kind = match self.attr_unsigned(die, attributes::DW_AT_ENCODING)? {
            Some(encodings::DW_ATE_VOID) => BasicKind::Void,
            Some(encodings::DW_ATE_ADDRESS) => BasicKind::ULong,
            Some(encodings::DW_ATE_BOOLEAN) => BasicKind::Bool,
            Some(encodings::DW_ATE_COMPLEX_FLOAT) => BasicKind::Complex,
            Some(encodings::DW_ATE_FLOAT) => BasicKind::Float,
            Some(encodings::DW_ATE_SIGNED) => BasicKind::Int,
            Some(encodings::DW_ATE_UNSIGNED) => BasicKind::UInt,
            Some(encodings::DW_ATE_SIGNED_CHAR) | Some(encodings::DW_ATE_UNSIGNED_CHAR) => {
                BasicKind::Char
            }
            _ => BasicKind::NoType,
        };
        let id = self.module.add_symbol(Symbol::BasicType { name, kind, size });
        self.unit.set_symbol(die, id);
        Ok(id)
    }

    fn build_typedef(&mut self, die: DieId) -> Result<SymbolId> {
        let name = self.entry_name(die, "typedef")?;
        let id = self.module.add_symbol(Symbol::Typedef { name, aliased: None });
        self.unit.set_symbol(die, id);
        let aliased = self.lookup_type(die)?;
        self.module.set_typedef_aliased(id, aliased)?;
        Ok(id)
    }

    fn build_pointer(&mut self, die: DieId) -> Result<SymbolId> {
        let id = self.module.add_symbol(Symbol::PointerType { referent: None });
        self.unit.set_symbol(die, id);
        let referent = self.lookup_type(die)?;
        self.module.set_pointer_referent(id, referent)?;
        Ok(id)
    }

    fn build_array(&mut self, die: DieId) -> Result<Option<SymbolId>> {
        let children = self.unit.children(die).to_vec();
        if children.is_empty() {
            warn!("Array type without subrange children");
            return Ok(None);
        }

        let mut lo = 0i64;
        let mut hi = 0i64;
        let mut index_type = None;
        for child in children {
            if self.unit.entry(child).tag != tags::DW_TAG_SUBRANGE_TYPE {
                continue;
            }
            lo = self.attr_signed(child, attributes::DW_AT_LOWER_BOUND)?.unwrap_or(0);
            hi = self.attr_signed(child, attributes::DW_AT_UPPER_BOUND)?.unwrap_or(0);
            if let Some(count) = self.attr_unsigned(child, attributes::DW_AT_COUNT)? {
                hi = lo + count as i64;
            }
            index_type = self.lookup_type(child)?;
        }

        let element = self.lookup_type(die)?;
        let id = self.module.add_symbol(Symbol::ArrayType { index_type, lo, hi, element });
        self.unit.set_symbol(die, id);
        Ok(Some(id))
    }

    fn build_enumeration(&mut self, die: DieId) -> Result<SymbolId> {
        let name = self.entry_name(die, "enumeration")?;
        let id = self.module.add_symbol(Symbol::EnumType { name, elements: Vec::new() });
        self.unit.set_symbol(die, id);

        for child in self.unit.children(die).to_vec() {
            if self.unit.entry(child).tag != tags::DW_TAG_ENUMERATOR {
                continue;
            }
            let element = self.entry_name(child, "enum_value")?;
            let value = self.attr_signed(child, attributes::DW_AT_CONST_VALUE)?.unwrap_or(0);
            self.module.add_enum_element(id, element, value)?;
        }
        Ok(id)
    }

    fn build_udt(&mut self, die: DieId, kind: UdtKind, with_members: bool) -> Result<SymbolId> {
        let name = self.entry_name(die, "udt")?;
        let size = self.attr_unsigned(die, attributes::DW_AT_BYTE_SIZE)?.unwrap_or(0) as u32;
        let id = self.module.add_symbol(Symbol::Udt { name, kind, size, members: Vec::new() });
        self.unit.set_symbol(die, id);

        if !with_members {
            return Ok(id);
        }
        for child in self.unit.children(die).to_vec() {
            let tag = self.unit.entry(child).tag;
            match tag {
                tags::DW_TAG_MEMBER => self.load_udt_member(child, id)?,
                // Nested aggregates get a shell symbol; their bodies are
                // not parsed here.
                tags::DW_TAG_STRUCTURE_TYPE => {
                    self.build_udt(child, UdtKind::Struct, false)?;
                }
                tags::DW_TAG_CLASS_TYPE => {
                    self.build_udt(child, UdtKind::Class, false)?;
                }
                tags::DW_TAG_UNION_TYPE => {
                    self.build_udt(child, UdtKind::Union, false)?;
                }
                t if is_type_tag(t) => {
                    self.build_type(child)?;
                }
                other => warn!("Unhandled tag {other:#x} inside a user-defined type"),
            }
        }
        Ok(id)
    }

    fn load_udt_member(&mut self, die: DieId, udt: SymbolId) -> Result<()> {
        let name = self.entry_name(die, "member")?;
        let ty = self.lookup_type(die)?;

        let byte_offset = match self.unit.find_attribute(die, attributes::DW_AT_DATA_MEMBER_LOCATION)? {
            Some(value) => match location::evaluate(&value, self.unit.address_size) {
                Ok(Location::Absolute { offset }) => offset,
                Ok(_) => {
                    warn!("Member location of {name} is not a constant offset, placing at 0");
                    0
                }
                Err(err) => {
                    warn!("Cannot evaluate member location of {name}: {err}");
                    0
                }
            },
            None => 0,
        };

        let raw_bit_offset = self.attr_unsigned(die, attributes::DW_AT_BIT_OFFSET)?;
        let bit_size = self.attr_unsigned(die, attributes::DW_AT_BIT_SIZE)?;
        let bit_offset = match bit_size {
            // Bit-fields renumber from the container's LSB
            Some(bits) => {
                let container = match self.attr_unsigned(die, attributes::DW_AT_BYTE_SIZE)? {
                    Some(size) => size as u32,
                    None => ty.and_then(|t| self.module.type_size(t)).unwrap_or(0),
                };
                (byte_offset << 3)
                    + (i64::from(container) * 8
                        - raw_bit_offset.unwrap_or(0) as i64
                        - bits as i64)
            }
            None => (byte_offset << 3) + raw_bit_offset.unwrap_or(0) as i64,
        };

        self.module.add_udt_member(
            udt,
            UdtMember {
                name,
                ty,
                bit_offset: bit_offset.max(0) as u32,
                bit_size: bit_size.map(|b| b as u32),
            },
        )
    }

    fn build_subroutine_type(&mut self, die: DieId) -> Result<SymbolId> {
        let id = self
            .module
            .add_symbol(Symbol::FunctionSignature { return_type: None, params: Vec::new() });
        self.unit.set_symbol(die, id);

        let ret = self.lookup_type(die)?;
        self.module.set_signature_return(id, ret)?;

        for child in self.unit.children(die).to_vec() {
            if self.unit.entry(child).tag == tags::DW_TAG_FORMAL_PARAMETER {
                let param = self.lookup_type(child)?;
                self.module.append_signature_param(id, param)?;
            }
        }
        Ok(id)
    }

    // ---- subprograms ------------------------------------------------

    fn load_subprogram(&mut self, die: DieId) -> Result<Option<SymbolId>> {
        if let Some(existing) = self.unit.symbol(die) {
            return Ok(Some(existing));
        }

        let low = self.attr_unsigned(die, attributes::DW_AT_LOW_PC)?.unwrap_or(0) as u32;
        let high = self.attr_unsigned(die, attributes::DW_AT_HIGH_PC)?.unwrap_or(0) as u32;
        let address = self.module.load_address().wrapping_add(low);

        if in_thunk_area(address, self.thunks).is_some() {
            return Ok(None);
        }

        let declaration = self.attr_flag(die, attributes::DW_AT_DECLARATION)?;
        let inlined = self.attr_flag(die, attributes::DW_AT_INLINE)?;
        if declaration || inlined {
            // No body, but nested type definitions are still wanted
            for child in self.unit.children(die).to_vec() {
                if is_type_tag(self.unit.entry(child).tag) {
                    if let Err(err) = self.build_type(child) {
                        warn!("Nested type in declaration failed: {err}");
                    }
                }
            }
            return Ok(None);
        }

        let frame = match self.unit.find_attribute(die, attributes::DW_AT_FRAME_BASE)? {
            Some(value) => match location::evaluate(&value, self.unit.address_size) {
                Ok(Location::Register { register, offset, .. }) => FrameBase {
                    register: self.registers.map_register(register),
                    offset: offset as i32,
                },
                // A bare constant here is a location-list reference;
                // the frame stays unknown.
                Ok(_) => FrameBase::default(),
                Err(err) => {
                    warn!("Cannot evaluate frame base: {err}");
                    FrameBase::default()
                }
            },
            None => FrameBase::default(),
        };

        let name = self.entry_name(die, "subprogram")?;
        let return_type = self.lookup_type(die)?;
        let signature = self
            .module
            .add_symbol(Symbol::FunctionSignature { return_type, params: Vec::new() });
        let func = self.module.add_symbol(Symbol::Function {
            name,
            address,
            size: high.wrapping_sub(low),
            signature,
            frame,
            blocks: Vec::new(),
            locals: Vec::new(),
            points: Vec::new(),
            lines: Vec::new(),
        });
        self.unit.set_symbol(die, func);

        let scope = FunctionScope { func, signature, address, frame, block: None };
        for child in self.unit.children(die).to_vec() {
            if let Err(err) = self.load_subprogram_child(child, scope) {
                warn!("Entry at {:#x} failed: {err}", self.unit.entry(child).offset);
            }
        }

        self.module.normalize_function(func)?;
        Ok(Some(func))
    }

    fn load_subprogram_child(&mut self, die: DieId, scope: FunctionScope) -> Result<()> {
        let tag = self.unit.entry(die).tag;
        match tag {
            tags::DW_TAG_FORMAL_PARAMETER | tags::DW_TAG_VARIABLE => {
                self.load_variable(die, Some(scope))
            }
            tags::DW_TAG_LEXICAL_BLOCK => self.load_lexical_block(die, scope),
            // Inline bodies are not materialized, but labels and
            // variables inside them belong to the enclosing function.
            tags::DW_TAG_INLINED_SUBROUTINE => {
                for child in self.unit.children(die).to_vec() {
                    self.load_subprogram_child(child, scope)?;
                }
                Ok(())
            }
            tags::DW_TAG_LABEL => {
                let name = self.entry_name(die, "label")?;
                let low = self.attr_unsigned(die, attributes::DW_AT_LOW_PC)?.unwrap_or(0) as u32;
                let addr = self.module.load_address().wrapping_add(low);
                self.module.add_point(scope.func, name, addr.wrapping_sub(scope.address))
            }
            tags::DW_TAG_UNSPECIFIED_PARAMETERS => {
                warn!("Unspecified parameters are not recorded");
                Ok(())
            }
            // Types nested in a function body resolve on reference
            t if is_type_tag(t) => Ok(()),
            other => {
                warn!("Unhandled tag {other:#x} inside a subprogram");
                Ok(())
            }
        }
    }

    fn load_lexical_block(&mut self, die: DieId, scope: FunctionScope) -> Result<()> {
        let low = self.attr_unsigned(die, attributes::DW_AT_LOW_PC)?.unwrap_or(0) as u32;
        let high = self.attr_unsigned(die, attributes::DW_AT_HIGH_PC)?.unwrap_or(0) as u32;
        let base = self.module.load_address();
        let block = self.module.add_block(
            scope.func,
            scope.block,
            base.wrapping_add(low),
            base.wrapping_add(high),
        )?;

        let inner = FunctionScope { block: Some(block), ..scope };
        for child in self.unit.children(die).to_vec() {
            if let Err(err) = self.load_subprogram_child(child, inner) {
                warn!("Entry at {:#x} failed: {err}", self.unit.entry(child).offset);
            }
        }
        Ok(())
    }

    // ---- variables --------------------------------------------------

    fn load_variable(&mut self, die: DieId, scope: Option<FunctionScope>) -> Result<()> {
        let name = self.entry_name(die, "variable")?;
        let ty = self.lookup_type(die)?;
        let is_parameter = self.unit.entry(die).tag == tags::DW_TAG_FORMAL_PARAMETER;

        if let Some(value) = self.unit.find_attribute(die, attributes::DW_AT_LOCATION)? {
            match location::evaluate(&value, self.unit.address_size) {
                Ok(Location::Absolute { offset }) => {
                    let external = self.attr_flag(die, attributes::DW_AT_EXTERNAL)?;
                    let address = self.module.load_address().wrapping_add(offset as u32);
                    let kind = if scope.is_some() {
                        DataKind::StaticLocal
                    } else if external {
                        DataKind::Global
                    } else {
                        DataKind::FileStatic
                    };
                    let id = self.module.add_symbol(Symbol::Variable {
                        name,
                        ty,
                        storage: VarStorage::Memory { address },
                        linkage: if external { Linkage::Global } else { Linkage::Local },
                        kind,
                    });
                    self.unit.set_symbol(die, id);
                }
                Ok(Location::FrameRelative { offset }) => match scope {
                    Some(s) => {
                        let storage = VarStorage::Register {
                            register: s.frame.register,
                            deref: true,
                            offset: (offset + i64::from(s.frame.offset)) as i32,
                        };
                        self.module.add_local(s.func, LocalVariable {
                            name,
                            ty,
                            storage,
                            is_parameter,
                            block: s.block,
                        })?;
                    }
                    None => warn!("Frame-relative variable outside a function"),
                },
                Ok(Location::Register { register, deref, offset }) => match scope {
                    Some(s) => {
                        let storage = VarStorage::Register {
                            register: self.registers.map_register(register),
                            deref,
                            offset: offset as i32,
                        };
                        self.module.add_local(s.func, LocalVariable {
                            name,
                            ty,
                            storage,
                            is_parameter,
                            block: s.block,
                        })?;
                    }
                    None => warn!("Register-bound variable outside a function"),
                },
                // Falls through; a parameter's type still reaches the
                // signature below
                Err(err) => warn!("Cannot evaluate variable location: {err}"),
            }
        } else if self.unit.find_attribute(die, attributes::DW_AT_CONST_VALUE)?.is_some() {
            // TODO: materialize compile-time constants once the database
            // grows a constant-symbol kind
            warn!("Constant-valued variable is not materialized");
        }

        if is_parameter {
            if let Some(s) = scope {
                self.module.append_signature_param(s.signature, ty)?;
            }
        }
        Ok(())
    }
}
