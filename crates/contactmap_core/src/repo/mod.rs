//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the contact store contract consumed by services and interchange.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repository writes must validate coordinates before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod contact_repo;
