//! Location collaborator boundary.
//!
//! # Responsibility
//! - Describe the "last known fix" signal consumed by proximity queries.
//! - Keep permission negotiation outside core; only its outcome is seen here.
//!
//! # Invariants
//! - A fix is only usable while authorization is granted.

use crate::model::contact::Coordinate;
use serde::{Deserialize, Serialize};

/// Location permission outcome reported by the platform shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    #[default]
    NotDetermined,
    Denied,
    AuthorizedWhileActive,
}

impl AuthorizationState {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::AuthorizedWhileActive)
    }

    /// Parses the labels used across the FFI boundary.
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "not_determined" => Some(Self::NotDetermined),
            "denied" => Some(Self::Denied),
            "authorized_while_active" | "authorized" => Some(Self::AuthorizedWhileActive),
            _ => None,
        }
    }
}

/// Source of the device's best-known coordinate.
pub trait LocationSource {
    /// Returns the latest fix, or `None` when there is none yet.
    fn current_coordinate(&self) -> Option<Coordinate>;
    fn authorization_state(&self) -> AuthorizationState;
}

/// Location source holding a fix pushed in by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StaticLocation {
    pub coordinate: Option<Coordinate>,
    pub authorization: AuthorizationState,
}

impl StaticLocation {
    pub fn authorized(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            authorization: AuthorizationState::AuthorizedWhileActive,
        }
    }

    pub fn unavailable(authorization: AuthorizationState) -> Self {
        Self {
            coordinate: None,
            authorization,
        }
    }
}

impl LocationSource for StaticLocation {
    fn current_coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    fn authorization_state(&self) -> AuthorizationState {
        self.authorization
    }
}

/// Returns the current fix when permission is granted and the fix is valid.
pub fn usable_fix(source: &impl LocationSource) -> Option<Coordinate> {
    if !source.authorization_state().is_authorized() {
        return None;
    }
    source
        .current_coordinate()
        .filter(|coordinate| coordinate.is_valid())
}
