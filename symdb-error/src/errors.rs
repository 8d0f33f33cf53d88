//! Unified error type for symdb
//!
//! Every fallible operation across the workspace reports an [`Error`]
//! carrying a category, a numeric code from [`crate::codes`] and a static
//! message. Messages are `&'static str` so the type stays allocation-free
//! and usable from `no_std` members.

use core::fmt;

use crate::codes;

/// Error categories for symdb operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed wire data
    Parse = 1,
    /// A fixed bound was exceeded
    Capacity = 2,
    /// Well-formed input the library deliberately does not handle
    Unsupported = 3,
    /// Inputs that violate the caller contract
    Validation = 4,
    /// Everything else
    System = 5,
}

/// symdb error type
///
/// Categorized errors with numeric codes and a static message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    /// Error category
    pub category: ErrorCategory,
    /// Error code
    pub code: u16,
    /// Error message
    pub message: &'static str,
}

impl Error {
    /// Create a new error
    #[must_use]
    pub const fn new(category: ErrorCategory, code: u16, message: &'static str) -> Self {
        Self { category, code, message }
    }

    /// Create a parse error with the generic parse code
    #[must_use]
    pub const fn parse_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Parse, codes::PARSE_ERROR, message)
    }

    /// Create a capacity error with the generic capacity code
    #[must_use]
    pub const fn capacity_exceeded(message: &'static str) -> Self {
        Self::new(ErrorCategory::Capacity, codes::CAPACITY_EXCEEDED, message)
    }

    /// Create an unsupported-input error with the generic unsupported code
    #[must_use]
    pub const fn unsupported(message: &'static str) -> Self {
        Self::new(ErrorCategory::Unsupported, codes::UNSUPPORTED, message)
    }

    /// Create a validation error with the generic validation code
    #[must_use]
    pub const fn validation_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Validation, codes::VALIDATION_ERROR, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
