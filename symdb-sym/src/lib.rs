//! Symbol database for symdb
//!
//! The debug-information parsers in this workspace translate wire formats
//! into the objects defined here: modules, compilands, types, functions,
//! variables and line records. Parser state is transient and scoped to a
//! compilation unit; the objects in this crate are what outlives a parse
//! and what symbolic debuggers and backtrace formatters query.
//!
//! Symbols live in a per-module arena and refer to each other through
//! [`SymbolId`] indices, which keeps the forward-referencing,
//! possibly-cyclic type graph representable without reference counting.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(feature = "std"))]
extern crate alloc;

/// Variable location descriptions
pub mod location;
/// The module descriptor and symbol arena
pub mod module;
/// Register-number mapping between DWARF and the target ABI
pub mod registers;
/// Symbol definitions
pub mod symbol;
/// Synthetic code regions excluded from symbol materialization
pub mod thunk;

pub mod prelude;

pub use location::Location;
pub use module::{DebugCapabilities, Module, SourceId};
pub use registers::{RegisterMapping, X86RegisterMap};
pub use symbol::{
    BasicKind, Block, DataKind, FrameBase, FunctionPoint, LineRecord, Linkage, LocalVariable,
    Symbol, SymbolId, UdtKind, UdtMember, VarStorage,
};
pub use thunk::{in_thunk_area, ThunkRange};
