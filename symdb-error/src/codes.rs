//! Error codes for symdb
//!
//! Codes are grouped by category range: parse errors in the 1000s,
//! capacity errors in the 2000s, unsupported-input errors in the 3000s,
//! validation errors in the 4000s and system errors in the 5000s.

/// Generic parse error
pub const PARSE_ERROR: u16 = 1000;
/// Read or skip past the end of a section
pub const UNEXPECTED_END: u16 = 1001;
/// A LEB128 sequence was truncated or exceeded the target width
pub const MALFORMED_LEB128: u16 = 1002;
/// An attribute carried a form the reader does not know
pub const UNKNOWN_FORM: u16 = 1003;
/// A debug entry referenced an abbreviation code not present in its table
pub const MISSING_ABBREVIATION: u16 = 1004;
/// A string was not NUL-terminated inside its section
pub const UNTERMINATED_STRING: u16 = 1005;

/// Generic capacity error
pub const CAPACITY_EXCEEDED: u16 = 2000;
/// The location-expression stack overflowed
pub const EVALUATION_STACK_OVERFLOW: u16 = 2001;

/// Generic unsupported-input error
pub const UNSUPPORTED: u16 = 3000;
/// Compilation unit version other than DWARF 2
pub const UNSUPPORTED_VERSION: u16 = 3001;
/// Address size other than 4 bytes
pub const UNSUPPORTED_ADDRESS_SIZE: u16 = 3002;
/// 64-bit DWARF format markers
pub const UNSUPPORTED_DWARF64: u16 = 3003;

/// Generic validation error
pub const VALIDATION_ERROR: u16 = 4000;
/// A mandatory input section was absent
pub const MISSING_SECTION: u16 = 4001;

/// Generic system error
pub const SYSTEM_ERROR: u16 = 5000;
