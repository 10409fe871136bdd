//! State of a renderer session.

use crate::error::{FieldError, SchemaError, SubmissionError};
use crate::grouping::{Section, group_by_section};
use crate::submission::PaymentIntentRef;
use crate::types::{EventId, FieldId, FormConfig};
use crate::validation::FieldErrors;
use crate::value::FieldValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Why the form cannot be filled in
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnavailableReason {
    /// No form exists for the event
    NotConfigured,
    /// The form exists but registration is switched off
    Disabled,
    /// Loading failed for another reason
    LoadFailed(SchemaError),
}

/// Where the session is in its lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet
    Idle,
    /// Fetching the form
    Loading,
    /// Terminal: the form cannot be shown
    Unavailable(UnavailableReason),
    /// Terminal: registration closed
    DeadlinePassed {
        /// The deadline that passed
        deadline: DateTime<Utc>,
    },
    /// Accepting input
    Editing,
    /// Waiting for the submission collaborator
    Submitting {
        /// A draft is being saved
        draft: bool,
    },
    /// Accepted; payment must be completed next
    AwaitingPayment {
        /// Payment to complete
        payment: PaymentIntentRef,
    },
    /// Accepted
    Submitted {
        /// The answers were saved as a draft
        draft: bool,
    },
    /// Terminal: the session was torn down
    Closed,
}

/// One user's session with one form
#[derive(Clone, Debug)]
pub struct RendererState {
    /// Event being registered for
    pub event_id: EventId,
    /// Lifecycle position
    pub phase: Phase,
    /// The schema, once loaded
    pub config: Option<FormConfig>,
    /// Current answers
    pub values: HashMap<FieldId, FieldValue>,
    /// Per-field validation errors
    pub errors: FieldErrors,
    /// Form-level banner after a failed submission
    pub submit_error: Option<SubmissionError>,
    /// Bumped by teardown; older results are dropped
    pub generation: u64,
}

impl RendererState {
    /// Fresh session, nothing loaded
    #[must_use]
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            phase: Phase::Idle,
            config: None,
            values: HashMap::new(),
            errors: FieldErrors::new(),
            submit_error: None,
            generation: 0,
        }
    }

    /// Fields grouped for display; empty until loaded
    #[must_use]
    pub fn sections(&self) -> Vec<Section<'_>> {
        self.config
            .as_ref()
            .map(|config| group_by_section(&config.fields))
            .unwrap_or_default()
    }

    /// Error shown under one input
    #[must_use]
    pub fn error_for(&self, field_id: &FieldId) -> Option<&FieldError> {
        self.errors.get(field_id)
    }

    /// Current answer of one field
    #[must_use]
    pub fn value_of(&self, field_id: &FieldId) -> Option<&FieldValue> {
        self.values.get(field_id)
    }
}
