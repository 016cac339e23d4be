//! Errors raised while constructing kernel values

use thiserror::Error;

/// Rejection of a malformed identifier or value
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An id string that is neither `<PREFIX>-<uuid>` nor a bare UUID
    #[error("Malformed {kind} '{value}'")]
    MalformedId { kind: &'static str, value: String },

    /// A listing key that is empty after trimming
    #[error("Listing id must not be blank")]
    BlankTargetId,
}

impl CoreError {
    pub fn malformed_id(kind: &'static str, value: impl Into<String>) -> Self {
        CoreError::MalformedId {
            kind,
            value: value.into(),
        }
    }
}
