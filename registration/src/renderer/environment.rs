//! Environment for the runtime renderer.

use crate::repository::FormSchemaStore;
use crate::submission::SubmissionClient;
use composable_forms_core::environment::{Clock, IdGenerator};
use std::sync::Arc;

/// Collaborators of a renderer session
#[derive(Clone)]
pub struct RendererEnvironment {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    schema: FormSchemaStore,
    submissions: Arc<dyn SubmissionClient>,
}

impl RendererEnvironment {
    /// Create a renderer environment.
    ///
    /// Production uses `SystemClock` and `RandomIds`; tests pin both.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        schema: FormSchemaStore,
        submissions: Arc<dyn SubmissionClient>,
    ) -> Self {
        Self {
            clock,
            ids,
            schema,
            submissions,
        }
    }

    /// Clock used for the deadline check
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Source of idempotency keys
    #[must_use]
    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    /// Schema loading
    #[must_use]
    pub const fn schema(&self) -> &FormSchemaStore {
        &self.schema
    }

    /// Submission collaborator
    #[must_use]
    pub fn submissions(&self) -> Arc<dyn SubmissionClient> {
        Arc::clone(&self.submissions)
    }
}
