//! Binary wire-format primitives for symdb
//!
//! The DWARF sections consumed by `symdb-dwarf` mix fixed-width
//! little-endian integers with LEB128 variable-length integers. The
//! fixed-width reads live on the section cursor in `symdb-dwarf`; the
//! LEB128 codecs live here so they can be tested (and reused by fixture
//! builders) independently of any cursor.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(feature = "std"))]
extern crate alloc;

/// LEB128 readers and writers
pub mod binary;

pub mod prelude;

pub use binary::{read_sleb128, read_uleb128, write_sleb128, write_uleb128};
