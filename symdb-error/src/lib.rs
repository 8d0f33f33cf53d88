//! symdb error handling library
//!
//! This library provides the error handling system shared by the symdb
//! crates. Errors are organized into categories, each with its own range
//! of numeric codes:
//!
//! - Parse errors (1000s): malformed wire data
//! - Capacity errors (2000s): fixed bounds exceeded
//! - Unsupported errors (3000s): inputs the library declines to handle
//! - Validation errors (4000s): caller-contract violations
//! - System errors (5000s): everything else
//!
//! # Usage
//!
//! ```
//! use symdb_error::{codes, Error, ErrorCategory};
//!
//! let error = Error::new(
//!     ErrorCategory::Parse,
//!     codes::UNKNOWN_FORM,
//!     "attribute carries an unknown form",
//! );
//! assert_eq!(error.code, codes::UNKNOWN_FORM);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

extern crate core;

/// Error codes for symdb
pub mod codes;
/// Error and error-category types
pub mod errors;

pub mod prelude;

pub use errors::{Error, ErrorCategory};

/// A specialized `Result` type for symdb operations.
pub type Result<T> = core::result::Result<T, Error>;
