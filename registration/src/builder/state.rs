//! State of a builder session.

use crate::error::SchemaError;
use crate::types::{EventId, FieldId, FormConfig};

/// In-progress schema plus session bookkeeping
#[derive(Clone, Debug, PartialEq)]
pub struct BuilderState {
    /// Event whose form is being edited
    pub event_id: EventId,
    /// Working copy of the schema
    pub config: FormConfig,
    /// Unsaved edits exist
    pub is_dirty: bool,
    /// Field open in the property panel
    pub selected_field_id: Option<FieldId>,
    /// A load is in flight
    pub is_loading: bool,
    /// A save is in flight
    pub is_saving: bool,
    /// Bumped by every mutation
    pub revision: u64,
    /// Bumped by teardown; older results are dropped
    pub generation: u64,
    /// Last load failure
    pub load_error: Option<SchemaError>,
    /// Last save failure
    pub save_error: Option<SchemaError>,
    /// Last import failure
    pub import_error: Option<SchemaError>,
}

impl BuilderState {
    /// Fresh session with an empty default schema
    #[must_use]
    pub fn new(event_id: EventId) -> Self {
        Self::with_config(event_id, FormConfig::default())
    }

    /// Fresh session over an existing schema
    #[must_use]
    pub const fn with_config(event_id: EventId, config: FormConfig) -> Self {
        Self {
            event_id,
            config,
            is_dirty: false,
            selected_field_id: None,
            is_loading: false,
            is_saving: false,
            revision: 0,
            generation: 0,
            load_error: None,
            save_error: None,
            import_error: None,
        }
    }

    /// Record a mutation
    pub(crate) const fn touch(&mut self) {
        self.is_dirty = true;
        self.revision += 1;
    }
}
