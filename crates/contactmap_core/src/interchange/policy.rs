//! Per-record import policies.
//!
//! `PermissiveDefaults` keeps legacy behavior: a malformed field falls back
//! to a default (empty name, `0.0` coordinate, `None` timestamp) and the
//! record is still imported. `RejectMalformed` refuses the whole document
//! at the first malformed field instead. Both run before any store write.

use super::document::{json_kind, parse_timestamp, RawRecord};
use crate::model::contact::{Contact, Coordinate};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Name,
    DescriptionText,
    Latitude,
    Longitude,
    Timestamp,
}

impl RecordField {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DescriptionText => "descriptionText",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Timestamp => "timestamp",
        }
    }
}

/// A field that could not be read from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    pub index: usize,
    pub field: RecordField,
    pub reason: String,
}

impl Display for MalformedRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record #{} field `{}`: {}",
            self.index,
            self.field.wire_name(),
            self.reason
        )
    }
}

impl Error for MalformedRecord {}

/// A record converted into a fresh contact.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub contact: Contact,
    /// Fields that were replaced by a default value.
    pub defaulted: Vec<RecordField>,
}

/// Converts raw document records into contacts.
pub trait RecordPolicy {
    fn decode(&self, index: usize, record: &RawRecord) -> Result<DecodedRecord, MalformedRecord>;
}

/// Legacy per-field defaulting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveDefaults;

impl RecordPolicy for PermissiveDefaults {
    fn decode(&self, index: usize, record: &RawRecord) -> Result<DecodedRecord, MalformedRecord> {
        let fields = read_fields(index, record);
        let mut defaulted = Vec::new();

        let name = fields.name.unwrap_or_else(|_| {
            defaulted.push(RecordField::Name);
            String::new()
        });
        let description = fields.description.unwrap_or_else(|_| {
            defaulted.push(RecordField::DescriptionText);
            None
        });
        let latitude = fields.latitude.unwrap_or_else(|_| {
            defaulted.push(RecordField::Latitude);
            0.0
        });
        let longitude = fields.longitude.unwrap_or_else(|_| {
            defaulted.push(RecordField::Longitude);
            0.0
        });
        let timestamp = fields.timestamp.unwrap_or_else(|_| {
            defaulted.push(RecordField::Timestamp);
            None
        });

        Ok(DecodedRecord {
            contact: Contact::new(
                name,
                description,
                Coordinate::new(latitude, longitude),
                timestamp,
            ),
            defaulted,
        })
    }
}

/// Rejects the document at the first malformed field.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectMalformed;

impl RecordPolicy for RejectMalformed {
    fn decode(&self, index: usize, record: &RawRecord) -> Result<DecodedRecord, MalformedRecord> {
        let fields = read_fields(index, record);
        let name = fields.name?;
        if name.trim().is_empty() {
            return Err(MalformedRecord {
                index,
                field: RecordField::Name,
                reason: "name is blank".to_string(),
            });
        }

        Ok(DecodedRecord {
            contact: Contact::new(
                name,
                fields.description?,
                Coordinate::new(fields.latitude?, fields.longitude?),
                fields.timestamp?,
            ),
            defaulted: Vec::new(),
        })
    }
}

type FieldResult<T> = Result<T, MalformedRecord>;

struct RecordFields {
    name: FieldResult<String>,
    description: FieldResult<Option<String>>,
    latitude: FieldResult<f64>,
    longitude: FieldResult<f64>,
    timestamp: FieldResult<Option<DateTime<Utc>>>,
}

fn read_fields(index: usize, record: &RawRecord) -> RecordFields {
    let malformed = |field: RecordField, reason: String| MalformedRecord {
        index,
        field,
        reason,
    };

    let name = match record.get(RecordField::Name.wire_name()) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(malformed(
            RecordField::Name,
            format!("expected string, found {}", json_kind(other)),
        )),
        None => Err(malformed(RecordField::Name, "missing".to_string())),
    };

    let description = match record.get(RecordField::DescriptionText.wire_name()) {
        Some(Value::String(value)) => Ok(Some(value.clone())),
        None | Some(Value::Null) => Ok(None),
        Some(other) => Err(malformed(
            RecordField::DescriptionText,
            format!("expected string, found {}", json_kind(other)),
        )),
    };

    let latitude = read_degrees(record, RecordField::Latitude, 90.0)
        .map_err(|reason| malformed(RecordField::Latitude, reason));
    let longitude = read_degrees(record, RecordField::Longitude, 180.0)
        .map_err(|reason| malformed(RecordField::Longitude, reason));

    let timestamp = match record.get(RecordField::Timestamp.wire_name()) {
        Some(Value::String(text)) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| malformed(RecordField::Timestamp, format!("unparsable `{text}`"))),
        Some(Value::Null) => Ok(None),
        Some(other) => Err(malformed(
            RecordField::Timestamp,
            format!("expected string, found {}", json_kind(other)),
        )),
        None => Err(malformed(RecordField::Timestamp, "missing".to_string())),
    };

    RecordFields {
        name,
        description,
        latitude,
        longitude,
        timestamp,
    }
}

/// Reads a degree value given as a JSON number or numeric string.
fn read_degrees(record: &RawRecord, field: RecordField, limit: f64) -> Result<f64, String> {
    let value = match record.get(field.wire_name()) {
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| format!("number `{number}` is not representable"))?,
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("unparsable `{text}`"))?,
        Some(other) => return Err(format!("expected number, found {}", json_kind(other))),
        None => return Err("missing".to_string()),
    };

    if !value.is_finite() || value.abs() > limit {
        return Err(format!("{value} is outside [-{limit}, {limit}]"));
    }
    Ok(value)
}
