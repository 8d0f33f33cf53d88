//! Prelude for symdb-error
//!
//! Unified imports for std and no_std builds: the core formatting
//! machinery the error type is built on, plus the crate's whole error
//! vocabulary in one `use`.

pub use core::fmt;
pub use core::fmt::{Debug, Display};

pub use crate::{codes, Error, ErrorCategory, Result};
