//! Environment for the form builder.

use crate::repository::FormSchemaStore;
use composable_forms_core::environment::IdGenerator;
use std::sync::Arc;

/// Collaborators of a builder session
#[derive(Clone)]
pub struct BuilderEnvironment {
    ids: Arc<dyn IdGenerator>,
    schema: FormSchemaStore,
}

impl BuilderEnvironment {
    /// Create a builder environment
    ///
    /// `ids` mints field ids; it should be the same source the schema store
    /// uses for imports.
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, schema: FormSchemaStore) -> Self {
        Self { ids, schema }
    }

    /// Source of fresh field ids
    #[must_use]
    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    /// Schema persistence
    #[must_use]
    pub const fn schema(&self) -> &FormSchemaStore {
        &self.schema
    }
}
