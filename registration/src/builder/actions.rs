//! Actions for the form builder.

use crate::error::SchemaError;
use crate::types::{FieldId, FieldPatch, FieldType, FormConfig, SettingsPatch};

/// Which field a mutation applies to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldTarget {
    /// By stable id
    Id(FieldId),
    /// By current position
    Index(usize),
}

impl FieldTarget {
    /// Resolve to the id of an existing field
    #[must_use]
    pub fn resolve(&self, config: &FormConfig) -> Option<FieldId> {
        match self {
            Self::Id(id) => config.field(id).map(|f| f.id.clone()),
            Self::Index(index) => config.fields.get(*index).map(|f| f.id.clone()),
        }
    }
}

impl From<FieldId> for FieldTarget {
    fn from(id: FieldId) -> Self {
        Self::Id(id)
    }
}

/// Everything that can happen in a builder session
#[derive(Clone, Debug)]
pub enum BuilderAction {
    /// Fetch the persisted schema
    LoadConfig,

    /// Result of [`BuilderAction::LoadConfig`]
    ConfigLoaded {
        /// Session generation the load was started in
        generation: u64,
        /// Loaded schema or failure
        result: Result<FormConfig, SchemaError>,
    },

    /// Append a new field and select it
    AddField {
        /// Input kind of the new field
        field_type: FieldType,
    },

    /// Merge a patch into one field
    UpdateField {
        /// Field to update
        target: FieldTarget,
        /// Attributes to change
        patch: FieldPatch,
    },

    /// Delete one field
    RemoveField {
        /// Field to delete
        target: FieldTarget,
    },

    /// Rearrange fields; `permutation[i]` is the old position of the field
    /// that ends up at position `i`
    ReorderFields {
        /// A permutation of `0..fields.len()`
        permutation: Vec<usize>,
    },

    /// Change or clear the selection
    SelectField {
        /// Field to select, `None` to clear
        field_id: Option<FieldId>,
    },

    /// Merge a patch into the form-level settings
    UpdateSettings {
        /// Settings to change
        patch: SettingsPatch,
    },

    /// Persist the schema
    Save,

    /// Result of [`BuilderAction::Save`]
    SaveCompleted {
        /// Session generation the save was started in
        generation: u64,
        /// Revision that was sent
        revision: u64,
        /// Persisted schema or failure
        result: Result<FormConfig, SchemaError>,
    },

    /// A [`BuilderAction::Save`] that was refused without reaching the
    /// repository
    SaveRejected {
        /// Why nothing was sent
        error: SchemaError,
    },

    /// Replace the schema with an externally authored document
    ImportDocument {
        /// Raw JSON text
        raw: String,
    },

    /// End the session; results of in-flight work are discarded
    Teardown,
}
