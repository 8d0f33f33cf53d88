//! Prelude for symdb-sym
//!
//! Unified imports for std and no_std builds. Collection types come
//! from here so individual modules never gate on the `std` feature
//! themselves; the crate's public surface is re-exported alongside.

// Re-export from alloc when no_std
#[cfg(not(feature = "std"))]
pub use alloc::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
// Re-export from std when the std feature is enabled
#[cfg(feature = "std")]
pub use std::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

pub use crate::location::Location;
pub use crate::module::{DebugCapabilities, Module, SourceId};
pub use crate::registers::{RegisterMapping, X86RegisterMap};
pub use crate::symbol::{
    BasicKind, Block, DataKind, FrameBase, FunctionPoint, LineRecord, Linkage, LocalVariable,
    Symbol, SymbolId, UdtKind, UdtMember, VarStorage,
};
pub use crate::thunk::{in_thunk_area, ThunkRange};
pub use symdb_error::{Error, ErrorCategory, Result};
