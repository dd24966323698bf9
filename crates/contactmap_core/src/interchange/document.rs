//! Interchange document codec.
//!
//! Wire shape: a top-level JSON array (possibly empty) of flat objects with
//! `name`, `descriptionText`, `latitude`, `longitude`, `timestamp`.
//! Timestamps are RFC 3339 UTC with whole seconds, e.g.
//! `2024-11-07T18:30:00Z`.

use super::error::{ExportError, ParseError};
use crate::model::contact::Contact;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One exported contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterchangeRecord {
    pub name: String,
    #[serde(rename = "descriptionText")]
    pub description_text: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `null` only for contacts whose timestamp was lost on a prior import.
    pub timestamp: Option<String>,
}

impl From<&Contact> for InterchangeRecord {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            description_text: contact.description.clone().unwrap_or_default(),
            latitude: contact.latitude,
            longitude: contact.longitude,
            timestamp: contact.timestamp.map(format_timestamp),
        }
    }
}

/// Raw, not yet validated record object from a parsed document.
pub type RawRecord = Map<String, Value>;

/// Renders contacts as a pretty-printed document, preserving slice order.
///
/// Zero contacts render as `[]`.
pub fn render_document(contacts: &[Contact]) -> Result<String, ExportError> {
    let records = contacts
        .iter()
        .map(InterchangeRecord::from)
        .collect::<Vec<_>>();
    serde_json::to_string_pretty(&records).map_err(ExportError::Serialize)
}

/// Parses the document structure without interpreting record fields.
pub fn parse_document(text: &str) -> Result<Vec<RawRecord>, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ParseError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(ParseError::RecordNotObject {
                index,
                found: json_kind(&other),
            }),
        })
        .collect()
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses RFC 3339 text (any offset, optional fraction) into UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
