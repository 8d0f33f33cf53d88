//! The module descriptor and symbol arena
//!
//! A [`Module`] owns every symbol materialized from one object file's
//! debug information, an address-sorted index of its functions, and the
//! registry of source files referenced by line records. Parsers populate
//! it through the narrow mutation API below; debuggers query it through
//! the lookup API.

use symdb_error::{codes, Error, ErrorCategory, Result};

use crate::prelude::{format, BTreeMap, String, ToString, Vec};
use crate::symbol::{Block, LineRecord, LocalVariable, Symbol, SymbolId};

/// Index of a registered source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceId(u32);

impl SourceId {
    /// Registry index of this source
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kinds of debug information a parse produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugCapabilities {
    /// Line records were attached to functions
    pub line_numbers: bool,
    /// Global symbols were materialized
    pub global_symbols: bool,
    /// Type information was materialized
    pub type_info: bool,
    /// Source files were registered
    pub source_indexed: bool,
}

fn not_a_function() -> Error {
    Error::new(ErrorCategory::Validation, codes::VALIDATION_ERROR, "symbol is not a function")
}

/// A module and everything its debug information resolved into
#[derive(Debug)]
pub struct Module {
    load_address: u32,
    debug_format: Option<&'static str>,
    debug_signature: [u8; 4],
    capabilities: DebugCapabilities,
    symbols: Vec<Symbol>,
    // (address, id), kept sorted by address
    functions: Vec<(u32, SymbolId)>,
    sources: Vec<String>,
    source_index: BTreeMap<String, SourceId>,
}

impl Module {
    /// Create an empty module loaded at `load_address`
    #[must_use]
    pub fn new(load_address: u32) -> Self {
        Self {
            load_address,
            debug_format: None,
            debug_signature: [0; 4],
            capabilities: DebugCapabilities::default(),
            symbols: Vec::new(),
            functions: Vec::new(),
            sources: Vec::new(),
            source_index: BTreeMap::new(),
        }
    }

    /// Base address the module was loaded at
    #[must_use]
    pub fn load_address(&self) -> u32 {
        self.load_address
    }

    /// Insert a symbol into the arena and return its id.
    ///
    /// Functions are additionally indexed by address for
    /// [`Self::find_nearest_function`].
    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        if let Symbol::Function { address, .. } = &symbol {
            let address = *address;
            let at = self.functions.partition_point(|&(a, _)| a <= address);
            self.functions.insert(at, (address, id));
        }
        self.symbols.push(symbol);
        id
    }

    /// Look up a symbol by id
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// All symbols in insertion order
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The address-sorted `(address, id)` function index
    #[must_use]
    pub fn functions(&self) -> &[(u32, SymbolId)] {
        &self.functions
    }

    /// Append a parameter type to a function-signature symbol
    pub fn append_signature_param(&mut self, sig: SymbolId, ty: Option<SymbolId>) -> Result<()> {
        match &mut self.symbols[sig.index()] {
            Symbol::FunctionSignature { params, .. } => {
                params.push(ty);
                Ok(())
            }
            _ => Err(Error::new(
                ErrorCategory::Validation,
                codes::VALIDATION_ERROR,
                "symbol is not a function signature",
            )),
        }
    }

    /// Patch the referent of a pointer-type symbol.
    ///
    /// Pointer symbols are created empty and patched once the referent
    /// resolves, so cyclic type graphs terminate.
    pub fn set_pointer_referent(&mut self, ptr: SymbolId, referent: Option<SymbolId>) -> Result<()> {
        match &mut self.symbols[ptr.index()] {
            Symbol::PointerType { referent: slot } => {
                *slot = referent;
                Ok(())
            }
            _ => Err(Error::new(
                ErrorCategory::Validation,
                codes::VALIDATION_ERROR,
                "symbol is not a pointer type",
            )),
        }
    }

    /// Patch the aliased type of a typedef symbol
    pub fn set_typedef_aliased(&mut self, td: SymbolId, aliased: Option<SymbolId>) -> Result<()> {
        match &mut self.symbols[td.index()] {
            Symbol::Typedef { aliased: slot, .. } => {
                *slot = aliased;
                Ok(())
            }
            _ => Err(Error::new(
                ErrorCategory::Validation,
                codes::VALIDATION_ERROR,
                "symbol is not a typedef",
            )),
        }
    }

    /// Patch the return type of a function-signature symbol
    pub fn set_signature_return(&mut self, sig: SymbolId, ret: Option<SymbolId>) -> Result<()> {
        match &mut self.symbols[sig.index()] {
            Symbol::FunctionSignature { return_type, .. } => {
                *return_type = ret;
                Ok(())
            }
            _ => Err(Error::new(
                ErrorCategory::Validation,
                codes::VALIDATION_ERROR,
                "symbol is not a function signature",
            )),
        }
    }

    /// Append a named value to an enumeration symbol
    pub fn add_enum_element(&mut self, en: SymbolId, name: String, value: i64) -> Result<()> {
        match &mut self.symbols[en.index()] {
            Symbol::EnumType { elements, .. } => {
                elements.push((name, value));
                Ok(())
            }
            _ => Err(Error::new(
                ErrorCategory::Validation,
                codes::VALIDATION_ERROR,
                "symbol is not an enumeration",
            )),
        }
    }

    /// Append a member to a user-defined-type symbol
    pub fn add_udt_member(&mut self, udt: SymbolId, member: crate::symbol::UdtMember) -> Result<()> {
        match &mut self.symbols[udt.index()] {
            Symbol::Udt { members, .. } => {
                members.push(member);
                Ok(())
            }
            _ => Err(Error::new(
                ErrorCategory::Validation,
                codes::VALIDATION_ERROR,
                "symbol is not a user-defined type",
            )),
        }
    }

    /// Open a lexical block in a function; returns the block index
    pub fn add_block(
        &mut self,
        func: SymbolId,
        parent: Option<usize>,
        start: u32,
        end: u32,
    ) -> Result<usize> {
        match &mut self.symbols[func.index()] {
            Symbol::Function { blocks, .. } => {
                blocks.push(Block { start, end, parent });
                Ok(blocks.len() - 1)
            }
            _ => Err(not_a_function()),
        }
    }

    /// Attach a local variable or parameter to a function
    pub fn add_local(&mut self, func: SymbolId, local: LocalVariable) -> Result<()> {
        match &mut self.symbols[func.index()] {
            Symbol::Function { locals, .. } => {
                locals.push(local);
                Ok(())
            }
            _ => Err(not_a_function()),
        }
    }

    /// Attach a label to a function
    pub fn add_point(&mut self, func: SymbolId, name: String, offset: u32) -> Result<()> {
        match &mut self.symbols[func.index()] {
            Symbol::Function { points, .. } => {
                points.push(crate::symbol::FunctionPoint { name, offset });
                Ok(())
            }
            _ => Err(not_a_function()),
        }
    }

    /// Attach a source-line record to a function
    pub fn add_line_record(&mut self, func: SymbolId, record: LineRecord) -> Result<()> {
        match &mut self.symbols[func.index()] {
            Symbol::Function { lines, .. } => {
                lines.push(record);
                Ok(())
            }
            _ => Err(not_a_function()),
        }
    }

    /// Normalize a fully-built function: line records sorted by offset,
    /// block ranges clamped to the body, size derived from the blocks
    /// when the subprogram did not declare one.
    pub fn normalize_function(&mut self, func: SymbolId) -> Result<()> {
        match &mut self.symbols[func.index()] {
            Symbol::Function { address, size, blocks, lines, .. } => {
                lines.sort_by_key(|l| l.offset);
                if *size == 0 {
                    *size = blocks
                        .iter()
                        .map(|b| b.end.saturating_sub(*address))
                        .max()
                        .unwrap_or(0);
                }
                let end = *address + *size;
                for block in blocks.iter_mut() {
                    block.start = block.start.clamp(*address, end);
                    block.end = block.end.clamp(block.start, end);
                }
                Ok(())
            }
            _ => Err(not_a_function()),
        }
    }

    /// Function with the greatest start address not above `addr`
    #[must_use]
    pub fn find_nearest_function(&self, addr: u32) -> Option<SymbolId> {
        let idx = self.functions.partition_point(|&(a, _)| a <= addr);
        if idx == 0 {
            return None;
        }
        Some(self.functions[idx - 1].1)
    }

    /// Function whose body covers `addr`
    #[must_use]
    pub fn function_covering(&self, addr: u32) -> Option<SymbolId> {
        let id = self.find_nearest_function(addr)?;
        match self.symbol(id) {
            Symbol::Function { address, size, .. } if addr < address + size => Some(id),
            _ => None,
        }
    }

    /// Resolve `addr` to a source file and line, if any function covering
    /// it carries line records.
    #[must_use]
    pub fn line_for_address(&self, addr: u32) -> Option<(SourceId, u32)> {
        let id = self.function_covering(addr)?;
        let Symbol::Function { address, lines, .. } = self.symbol(id) else {
            return None;
        };
        let offset = addr - address;
        let idx = lines.partition_point(|l| l.offset <= offset);
        if idx == 0 {
            return None;
        }
        let record = &lines[idx - 1];
        Some((record.source, record.line))
    }

    /// Register a source file, composing `dir` and `name` and
    /// de-duplicating by the composed path.
    pub fn add_source(&mut self, dir: &str, name: &str) -> SourceId {
        let path = if name.starts_with('/') || dir.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", dir.trim_end_matches('/'), name)
        };
        if let Some(&id) = self.source_index.get(&path) {
            return id;
        }
        let id = SourceId(self.sources.len() as u32);
        self.source_index.insert(path.clone(), id);
        self.sources.push(path);
        id
    }

    /// Composed path of a registered source
    #[must_use]
    pub fn source_path(&self, id: SourceId) -> Option<&str> {
        self.sources.get(id.index()).map(String::as_str)
    }

    /// Number of registered sources
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Record which debug reader produced this module's symbols
    pub fn set_debug_info(
        &mut self,
        format: &'static str,
        signature: [u8; 4],
        capabilities: DebugCapabilities,
    ) {
        self.debug_format = Some(format);
        self.debug_signature = signature;
        self.capabilities = capabilities;
    }

    /// Debug-reader tag, if a parse completed
    #[must_use]
    pub fn debug_format(&self) -> Option<&'static str> {
        self.debug_format
    }

    /// Debug-reader signature bytes
    #[must_use]
    pub fn debug_signature(&self) -> [u8; 4] {
        self.debug_signature
    }

    /// Capability flags recorded by the parse
    #[must_use]
    pub fn capabilities(&self) -> DebugCapabilities {
        self.capabilities
    }

    /// Size in bytes of a type symbol, if it has one
    #[must_use]
    pub fn type_size(&self, id: SymbolId) -> Option<u32> {
        match self.symbol(id) {
            Symbol::BasicType { size, .. } | Symbol::Udt { size, .. } => Some(*size),
            // Pointers match the only supported address size
            Symbol::PointerType { .. } => Some(4),
            Symbol::EnumType { .. } => Some(4),
            Symbol::Typedef { aliased, .. } => aliased.and_then(|t| self.type_size(t)),
            Symbol::ArrayType { lo, hi, element, .. } => {
                let count = u32::try_from(hi - lo + 1).ok()?;
                let elem = element.and_then(|e| self.type_size(e))?;
                Some(count * elem)
            }
            _ => None,
        }
    }
}
