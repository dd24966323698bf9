//! Whole-collection export and destructive import.
//!
//! # Responsibility
//! - Render the stored collection as a JSON interchange document.
//! - Parse a candidate document, report pre-flight counts, and replace the
//!   stored collection on explicit commit.
//!
//! # Invariants
//! - Nothing is written before `commit_import`; parse and preview are pure.
//! - A commit performs one batch delete followed by all inserts, in
//!   document order, inside a single store transaction.
//! - Document field names are fixed for compatibility with prior exports.

pub mod document;
pub mod error;
pub mod policy;
pub mod service;
