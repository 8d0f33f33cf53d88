//! Prelude for symdb-dwarf
//!
//! Unified imports for std and no_std builds. Collection types come
//! from here so individual modules never gate on the `std` feature
//! themselves. For consumers: the entry point, the input section set,
//! and the database types a caller needs to hold the result.

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

pub use crate::{parse, SectionSet, DEBUG_FORMAT, DEBUG_SIGNATURE};
pub use symdb_error::{Error, ErrorCategory, Result};
pub use symdb_sym::{
    DebugCapabilities, Module, RegisterMapping, Symbol, SymbolId, ThunkRange, X86RegisterMap,
};
