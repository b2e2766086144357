//! Purpose: Library crate backing the `bookshelf` CLI and tests.
//! Exports: `api` (stable surface) and `core` (records, catalog storage, validation, errors).
//! Role: Owns all catalog semantics; the binary is presentation only.
//! Invariants: Every mutation rewrites the whole catalog file before returning.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
