//! CLI command implementations

pub mod check;
pub mod passes;

mod reporting;

/// Exit code when at least one document has validation errors.
pub const EXIT_VALIDATION_FAILURE: u8 = 1;

/// Exit code when a document could not be read or parsed.
pub const EXIT_LOAD_FAILURE: u8 = 2;
