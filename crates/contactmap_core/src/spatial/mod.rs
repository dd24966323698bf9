//! Spatial contact-set queries.
//!
//! # Responsibility
//! - Decide which stored contacts are relevant for the current map viewport
//!   or the "near me" radius.
//!
//! # Invariants
//! - Rectangle and radius membership are separate algorithms: rectangle
//!   follows the map's flat degree box, radius is great-circle distance.
//! - Filters are stable: output is a subsequence of input in input order.
//! - Queries never fail; bad input degrades to an empty set.

pub mod geo;
pub mod indexer;
pub mod query;
