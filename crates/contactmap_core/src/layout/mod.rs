//! Map pin decluttering.
//!
//! # Responsibility
//! - Fan out pins whose coordinates nearly coincide so each stays tappable.
//!
//! # Invariants
//! - Layout is a pure function of the visible snapshot and config; no state
//!   survives between frames.
//! - A pin without neighbours keeps a `(0, 0)` offset.

pub mod overlap;
