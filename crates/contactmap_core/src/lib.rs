//! Core domain logic for ContactMap.
//! This crate owns the contact store, the visible-set and pin-layout
//! computations, and the whole-collection interchange format.

pub mod db;
pub mod interchange;
pub mod layout;
pub mod location;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod spatial;

pub use interchange::document::{render_document, InterchangeRecord};
pub use interchange::error::{ExportError, ImportError, ParseError};
pub use interchange::policy::{
    MalformedRecord, PermissiveDefaults, RecordField, RecordPolicy, RejectMalformed,
};
pub use interchange::service::{
    export_contacts, plan_import, ContactInterchange, ImportPlan, ImportPreview,
};
pub use layout::overlap::{
    compute_offsets, compute_offsets_with, layout_pins, LayoutConfig, LayoutOffset,
    OverlapGrouping, PairwiseThreshold, PinPlacement, TransitiveClustering,
};
pub use location::{usable_fix, AuthorizationState, LocationSource, StaticLocation};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{Contact, ContactId, ContactValidationError, Coordinate};
pub use repo::contact_repo::{
    ContactPatch, ContactRepository, RepoError, RepoResult, ReplaceOutcome,
    SqliteContactRepository,
};
pub use service::contact_service::{ContactService, ContactServiceError, MapPin};
pub use spatial::geo::great_circle_distance_meters;
pub use spatial::indexer::{filter_by_radius, filter_by_rectangle, visible_set, VisibleSet};
pub use spatial::query::{RadiusQuery, RectangleQuery, ViewportQuery};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
