//! Purpose: Define the public Rust API boundary for bookshelf.
//! Exports: Record, store, validation, and error types used by the CLI and tests.
//! Role: Additive-only surface; front ends drive the catalog through these types only.
//! Invariants: Front ends never touch the catalog file directly; `Library` is the sole writer.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::library::Library;
pub use crate::core::record::{Book, STATUS_AVAILABLE, STATUS_CHECKED_OUT, Status};
pub use crate::core::validate::{
    ValidationIssue, ValidationReport, ValidationStatus, validate_catalog,
};
