use std::fmt;

/// Errors that can cross the core's boundary.
///
/// Missing projections or payloads are *not* errors: those surface as
/// `Option::None` so every consumer has a defined empty state.
#[derive(Debug, PartialEq, Clone)]
pub enum HtfError {
    /// A station ID with no entry in the registry. Fatal for the request.
    UnknownStation(String),
    /// A required piece of station data that does not exist.
    MissingData(String),
    /// Custom threshold input that is non-numeric or out of range.
    InvalidThreshold(String),
    /// A payload that could not be parsed or failed validation.
    InvalidPayload(String),
}

impl fmt::Display for HtfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HtfError::UnknownStation(id) => write!(f, "Unknown station: {id}"),
            HtfError::MissingData(what) => write!(f, "Missing data: {what}"),
            HtfError::InvalidThreshold(input) => write!(f, "Invalid threshold: {input}"),
            HtfError::InvalidPayload(why) => write!(f, "Invalid payload: {why}"),
        }
    }
}

impl std::error::Error for HtfError {}

impl From<serde_json::Error> for HtfError {
    fn from(value: serde_json::Error) -> Self {
        HtfError::InvalidPayload(value.to_string())
    }
}

impl From<csv::Error> for HtfError {
    fn from(value: csv::Error) -> Self {
        HtfError::InvalidPayload(value.to_string())
    }
}
