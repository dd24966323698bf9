//! Mobile-shell bindings for ContactMap core.

pub mod api;
