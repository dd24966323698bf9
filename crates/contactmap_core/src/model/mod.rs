//! Domain model for person-met records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep coordinate and identity types shared by storage, spatial and
//!   interchange layers.
//!
//! # Invariants
//! - Every stored contact is identified by a stable `ContactId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod contact;
