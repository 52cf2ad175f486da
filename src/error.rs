//! Domain errors surfaced to the user by store and controller operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgendaError {
    /// A required form field is empty or could not be parsed.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Appointment not found: {0}")]
    NotFound(String),

    /// Bulk action attempted with an unusable selection.
    #[error("{0}")]
    Selection(String),
}

impl AgendaError {
    pub fn missing(field: &'static str) -> Self {
        Self::Validation {
            field,
            reason: "required field is empty".to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type AgendaResult<T> = Result<T, AgendaError>;
