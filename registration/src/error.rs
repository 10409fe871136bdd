//! Error types for registration forms.
//!
//! Every error is `Clone` so it can ride inside an action back into a reducer.

use crate::types::FieldId;
use thiserror::Error;

/// Failures of the schema operations (load, save, import)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No registration form has been configured for the event
    #[error("Registration form not configured")]
    ConfigNotFound,

    /// Fields with a blank label, all of them, in schema order
    #[error("{} field(s) need a label", invalid_field_ids.len())]
    Validation {
        /// Offending field ids
        invalid_field_ids: Vec<FieldId>,
    },

    /// Fields whose validation pattern does not compile, in schema order
    #[error("{} field(s) have an invalid validation pattern", invalid_field_ids.len())]
    InvalidPatterns {
        /// Offending field ids
        invalid_field_ids: Vec<FieldId>,
    },

    /// A save was requested while another one is still running
    #[error("A save is already in progress")]
    SaveInProgress,

    /// Well-formed JSON that is not a registration document
    #[error("Invalid import document: {0}")]
    MalformedImport(String),

    /// Not JSON at all
    #[error("Could not parse import document: {0}")]
    Parse(String),

    /// The persistence collaborator failed
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for SchemaError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::ConfigNotFound,
            other => Self::Repository(other),
        }
    }
}

/// Failures of a [`crate::repository::ConfigRepository`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Nothing stored for the event
    #[error("Configuration not found")]
    NotFound,

    /// The backend answered with an error status
    #[error("Backend rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Body or reason phrase
        message: String,
    },

    /// The request never got an answer
    #[error("Transport error: {0}")]
    Transport(String),

    /// The answer could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures of a [`crate::submission::SubmissionClient`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The backend refused the registration
    #[error("Registration rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message to surface to the user
        message: String,
    },

    /// The registration never reached the backend
    #[error("Could not reach the registration service: {0}")]
    Transport(String),
}

/// A single field's validation failure
///
/// `Display` is the message shown next to the input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// No value for a required field
    #[error("{label} is required")]
    Required {
        /// Field label
        label: String,
    },

    /// Value on an email field is not shaped like an address
    #[error("Please enter a valid email address")]
    InvalidEmail,

    /// Fewer characters than `minLength`
    #[error("{label} must be at least {min} characters")]
    TooShort {
        /// Field label
        label: String,
        /// Required minimum
        min: usize,
    },

    /// More characters than `maxLength`
    #[error("{label} must be no more than {max} characters")]
    TooLong {
        /// Field label
        label: String,
        /// Allowed maximum
        max: usize,
    },

    /// Number below `min`
    #[error("{label} must be at least {min}")]
    BelowMinimum {
        /// Field label
        label: String,
        /// Smallest accepted number
        min: f64,
    },

    /// Number above `max`
    #[error("{label} must be no more than {max}")]
    AboveMaximum {
        /// Field label
        label: String,
        /// Largest accepted number
        max: f64,
    },

    /// Value does not match `pattern`
    #[error("{label} has an invalid format")]
    InvalidFormat {
        /// Field label
        label: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_config_not_found() {
        assert_eq!(SchemaError::from(RepositoryError::NotFound), SchemaError::ConfigNotFound);
        assert_eq!(
            SchemaError::from(RepositoryError::Transport("reset".into())),
            SchemaError::Repository(RepositoryError::Transport("reset".into()))
        );
    }

    #[test]
    fn numeric_messages_drop_trailing_zero() {
        let error = FieldError::BelowMinimum {
            label: "Age".into(),
            min: 18.0,
        };
        assert_eq!(error.to_string(), "Age must be at least 18");

        let error = FieldError::AboveMaximum {
            label: "Weight".into(),
            max: 2.5,
        };
        assert_eq!(error.to_string(), "Weight must be no more than 2.5");
    }
}
