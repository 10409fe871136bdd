//! Actions for the runtime renderer.

use crate::error::{SchemaError, SubmissionError};
use crate::submission::SubmissionReceipt;
use crate::types::{FieldId, FormConfig};
use crate::value::FieldValue;
use std::collections::HashMap;

/// Everything that can happen while a user fills in a form
#[derive(Clone, Debug)]
pub enum RendererAction {
    /// Fetch the form, optionally resuming earlier answers
    Load {
        /// Answers from a previous draft
        prior_answers: Option<HashMap<FieldId, FieldValue>>,
    },

    /// Result of [`RendererAction::Load`]
    ConfigLoaded {
        /// Session generation the load was started in
        generation: u64,
        /// Loaded schema or failure
        result: Result<FormConfig, SchemaError>,
        /// Answers to seed the form with
        prior_answers: Option<HashMap<FieldId, FieldValue>>,
    },

    /// Change one answer; `None` clears it
    SetValue {
        /// Field being answered
        field_id: FieldId,
        /// New answer
        value: Option<FieldValue>,
    },

    /// Check one field, as when its input loses focus
    ValidateField {
        /// Field to check
        field_id: FieldId,
    },

    /// Send the answers as a draft, skipping validation
    SaveDraft,

    /// Validate everything and send the registration
    Submit,

    /// Result of [`RendererAction::Submit`] or [`RendererAction::SaveDraft`]
    SubmissionCompleted {
        /// Session generation the submission was started in
        generation: u64,
        /// Result of the submission collaborator
        result: Result<SubmissionReceipt, SubmissionError>,
    },

    /// The view went away
    Teardown,
}
