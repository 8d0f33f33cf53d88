//! Symbol definitions
//!
//! One [`Symbol`] variant per database object the parsers can create.
//! Cross-references between symbols are [`SymbolId`] indices into the
//! owning module's arena; `Option<SymbolId>` where the reference may be
//! the null type (e.g. a `void` return).

use crate::module::SourceId;
use crate::prelude::{String, Vec};

/// Index of a symbol in its module's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Arena index of this symbol
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interpretation of a basic (built-in) type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicKind {
    /// No known interpretation
    NoType,
    /// The `void` type
    Void,
    /// Boolean
    Bool,
    /// Character (signed or unsigned)
    Char,
    /// Signed integer
    Int,
    /// Unsigned integer
    UInt,
    /// Machine address
    ULong,
    /// Floating point
    Float,
    /// Complex floating point
    Complex,
}

/// Flavor of a user-defined aggregate type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UdtKind {
    /// `struct`
    Struct,
    /// `class`
    Class,
    /// `union`
    Union,
}

/// Member of a user-defined type
#[derive(Debug, Clone)]
pub struct UdtMember {
    /// Member name
    pub name: String,
    /// Member type
    pub ty: Option<SymbolId>,
    /// Offset of the member from the start of the aggregate, in bits
    pub bit_offset: u32,
    /// Width in bits for bit-field members; `None` for ordinary members
    pub bit_size: Option<u32>,
}

/// Linkage of a global variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Visible only inside its compiland
    Local,
    /// Visible across the module
    Global,
}

/// Classification of a variable symbol by the scope it was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// Module-visible global
    Global,
    /// Compiland-scoped static
    FileStatic,
    /// Function-scoped static
    StaticLocal,
}

/// Frame-base disposition of a function
///
/// Frame-relative variable locations are rebased onto this register and
/// offset. A function whose frame base could not be resolved carries
/// register 0 and offset 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameBase {
    /// Target-ABI register number
    pub register: u16,
    /// Offset from the register value
    pub offset: i32,
}

/// Where a local variable or parameter lives at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarStorage {
    /// A fixed memory address
    Memory {
        /// Runtime address
        address: u32,
    },
    /// A register, possibly dereferenced with an offset
    Register {
        /// Target-ABI register number
        register: u16,
        /// Whether the value is indirect through the register
        deref: bool,
        /// Offset applied after dereferencing
        offset: i32,
    },
}

/// A local variable or formal parameter of a function
#[derive(Debug, Clone)]
pub struct LocalVariable {
    /// Variable name
    pub name: String,
    /// Variable type
    pub ty: Option<SymbolId>,
    /// Runtime location
    pub storage: VarStorage,
    /// Whether this local is a formal parameter
    pub is_parameter: bool,
    /// Enclosing lexical block, if not function scope
    pub block: Option<usize>,
}

/// A lexical block inside a function
#[derive(Debug, Clone, Copy)]
pub struct Block {
    /// First runtime address covered
    pub start: u32,
    /// One past the last runtime address covered
    pub end: u32,
    /// Enclosing block, if nested
    pub parent: Option<usize>,
}

/// A named point inside a function (a label)
#[derive(Debug, Clone)]
pub struct FunctionPoint {
    /// Label name
    pub name: String,
    /// Offset from the function start
    pub offset: u32,
}

/// A source-line record attached to a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord {
    /// Offset from the function start
    pub offset: u32,
    /// Source file
    pub source: SourceId,
    /// Line number
    pub line: u32,
}

/// A symbol in the module arena
#[derive(Debug, Clone)]
pub enum Symbol {
    /// A compilation unit
    Compiland {
        /// Compiland name (usually the primary source file)
        name: String,
    },
    /// A built-in type
    BasicType {
        /// Type name
        name: String,
        /// Interpretation
        kind: BasicKind,
        /// Size in bytes
        size: u32,
    },
    /// A pointer (or reference) type
    PointerType {
        /// Pointed-to type
        referent: Option<SymbolId>,
    },
    /// An array type
    ArrayType {
        /// Type of the index
        index_type: Option<SymbolId>,
        /// Lowest valid index
        lo: i64,
        /// Highest valid index
        hi: i64,
        /// Element type
        element: Option<SymbolId>,
    },
    /// A type alias
    Typedef {
        /// Alias name
        name: String,
        /// Aliased type
        aliased: Option<SymbolId>,
    },
    /// An enumeration type
    EnumType {
        /// Enum name
        name: String,
        /// `(name, value)` pairs
        elements: Vec<(String, i64)>,
    },
    /// A user-defined aggregate type
    Udt {
        /// Type name
        name: String,
        /// struct / class / union
        kind: UdtKind,
        /// Size in bytes
        size: u32,
        /// Members in declaration order
        members: Vec<UdtMember>,
    },
    /// A function-signature type
    FunctionSignature {
        /// Return type
        return_type: Option<SymbolId>,
        /// Parameter types in order
        params: Vec<Option<SymbolId>>,
    },
    /// A function with a body
    Function {
        /// Function name
        name: String,
        /// Runtime start address
        address: u32,
        /// Size in bytes of the body
        size: u32,
        /// Signature type
        signature: SymbolId,
        /// Frame-base disposition
        frame: FrameBase,
        /// Lexical blocks
        blocks: Vec<Block>,
        /// Locals and parameters
        locals: Vec<LocalVariable>,
        /// Labels
        points: Vec<FunctionPoint>,
        /// Source-line records
        lines: Vec<LineRecord>,
    },
    /// A global or static variable
    Variable {
        /// Variable name
        name: String,
        /// Variable type
        ty: Option<SymbolId>,
        /// Runtime location
        storage: VarStorage,
        /// Linkage
        linkage: Linkage,
        /// Declaring scope
        kind: DataKind,
    },
}

impl Symbol {
    /// Name of the symbol, if it carries one
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Compiland { name }
            | Self::BasicType { name, .. }
            | Self::Typedef { name, .. }
            | Self::EnumType { name, .. }
            | Self::Udt { name, .. }
            | Self::Function { name, .. }
            | Self::Variable { name, .. } => Some(name),
            Self::PointerType { .. } | Self::ArrayType { .. } | Self::FunctionSignature { .. } => {
                None
            }
        }
    }
}
