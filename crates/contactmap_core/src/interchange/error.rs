//! Interchange error taxonomy.

use super::policy::MalformedRecord;
use crate::repo::contact_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Candidate document is not a JSON array of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Text is not valid JSON.
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    /// Top level is valid JSON but not an array.
    NotAnArray { found: &'static str },
    /// An array element is not an object.
    RecordNotObject { index: usize, found: &'static str },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax {
                line,
                column,
                message,
            } => write!(
                f,
                "document is not valid JSON (line {line}, column {column}): {message}"
            ),
            Self::NotAnArray { found } => {
                write!(f, "document must be an array of contacts, found {found}")
            }
            Self::RecordNotObject { index, found } => {
                write!(f, "record #{index} must be an object, found {found}")
            }
        }
    }
}

impl Error for ParseError {}

impl From<serde_json::Error> for ParseError {
    fn from(value: serde_json::Error) -> Self {
        Self::Syntax {
            line: value.line(),
            column: value.column(),
            message: value.to_string(),
        }
    }
}

/// Failure of `preview_import` / `commit_import`.
#[derive(Debug)]
pub enum ImportError {
    Parse(ParseError),
    /// Only produced by strict record policies.
    MalformedRecord(MalformedRecord),
    Storage(RepoError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "import parse failed: {err}"),
            Self::MalformedRecord(err) => write!(f, "import rejected: {err}"),
            Self::Storage(err) => write!(f, "import storage failed: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::MalformedRecord(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ParseError> for ImportError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<MalformedRecord> for ImportError {
    fn from(value: MalformedRecord) -> Self {
        Self::MalformedRecord(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Failure of `export`.
#[derive(Debug)]
pub enum ExportError {
    /// Document construction failed; no placeholder text is produced.
    Serialize(serde_json::Error),
    Storage(RepoError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "export serialization failed: {err}"),
            Self::Storage(err) => write!(f, "export storage failed: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}
