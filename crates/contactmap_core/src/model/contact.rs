//! Contact domain model.
//!
//! # Responsibility
//! - Define the canonical "person met, where, when" record.
//! - Provide validation used by create/edit and storage write paths.
//!
//! # Invariants
//! - `id` is stable and never reused for another contact.
//! - `timestamp` is set at creation and never edited afterwards.
//! - `description` is `None` rather than an empty string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a stored contact.
pub type ContactId = Uuid;

/// Geographic point in degrees (WGS84-style latitude/longitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns whether both axes are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validates latitude in `[-90, 90]` and longitude in `[-180, 180]`.
    ///
    /// NaN and infinities are rejected.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if !(self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude)) {
            return Err(ContactValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !(self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude)) {
            return Err(ContactValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// Validation failures for contact records.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactValidationError {
    EmptyName,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "contact name cannot be empty"),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
        }
    }
}

impl Error for ContactValidationError {}

/// One person-met event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Store-owned identity; opaque equality key for everything else.
    pub id: ContactId,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// `None` only for imported records whose timestamp failed to parse.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Contact {
    /// Creates a contact with a generated id.
    ///
    /// Blank descriptions are normalized to `None`. No validation happens
    /// here; callers decide between `validate()` and
    /// `coordinate().validate()`.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        coordinate: Coordinate,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, description, coordinate, timestamp)
    }

    /// Creates a contact with a caller-provided id.
    ///
    /// Used by storage read paths where identity already exists.
    pub fn with_id(
        id: ContactId,
        name: impl Into<String>,
        description: Option<String>,
        coordinate: Coordinate,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: normalize_description(description),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            timestamp,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Full create/edit validation: non-blank name plus a valid coordinate.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.name.trim().is_empty() {
            return Err(ContactValidationError::EmptyName);
        }
        self.coordinate().validate()
    }
}

/// Maps blank descriptions to `None`.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Contact, ContactValidationError, Coordinate};

    #[test]
    fn coordinate_rejects_out_of_range_and_nan() {
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert_eq!(
            Coordinate::new(90.5, 0.0).validate(),
            Err(ContactValidationError::LatitudeOutOfRange(90.5))
        );
        assert!(Coordinate::new(0.0, f64::NAN).validate().is_err());
        assert!(Coordinate::new(f64::INFINITY, 0.0).validate().is_err());
    }

    #[test]
    fn blank_name_fails_validation() {
        let contact = Contact::new("  ", None, Coordinate::new(1.0, 2.0), None);
        assert_eq!(contact.validate(), Err(ContactValidationError::EmptyName));
    }

    #[test]
    fn blank_description_is_normalized_to_none() {
        let contact = Contact::new(
            "Ada",
            Some("   ".to_string()),
            Coordinate::new(1.0, 2.0),
            None,
        );
        assert_eq!(contact.description, None);
    }
}
