//! Prelude for symdb-format
//!
//! Unified imports for std and no_std builds. Collection types come
//! from here so individual modules never gate on the `std` feature
//! themselves; the crate's public surface is re-exported alongside.

// Re-export from alloc when no_std
#[cfg(not(feature = "std"))]
pub use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
// Re-export from std when the std feature is enabled
#[cfg(feature = "std")]
pub use std::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

pub use crate::binary::{read_sleb128, read_uleb128, write_sleb128, write_uleb128};
pub use symdb_error::{codes, Error, ErrorCategory, Result};
