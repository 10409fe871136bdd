//! Store for renderer sessions.

use crate::renderer::{Phase, RendererAction, RendererEnvironment, RendererReducer, RendererState};
use crate::types::{EventId, FieldId};
use crate::value::FieldValue;
use composable_forms_runtime::{Store, StoreConfig, StoreError};
use std::collections::HashMap;
use std::time::Duration;

type Inner = Store<RendererState, RendererAction, RendererEnvironment, RendererReducer>;

/// A running renderer session
#[derive(Clone)]
pub struct RendererStore {
    inner: Inner,
}

impl RendererStore {
    /// Start a session for `event_id`
    #[must_use]
    pub fn new(event_id: EventId, environment: RendererEnvironment, config: StoreConfig) -> Self {
        Self {
            inner: Store::with_config(
                RendererState::new(event_id),
                RendererReducer::new(),
                environment,
                config,
            ),
        }
    }

    /// Load the form and wait until it settles into a phase
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the load did not finish in time.
    pub async fn load(
        &self,
        prior_answers: Option<HashMap<FieldId, FieldValue>>,
        timeout: Duration,
    ) -> Result<Phase, StoreError> {
        self.run(RendererAction::Load { prior_answers }, timeout).await
    }

    /// Change one answer
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn set_value(
        &self,
        field_id: FieldId,
        value: Option<FieldValue>,
    ) -> Result<(), StoreError> {
        self.inner
            .send(RendererAction::SetValue { field_id, value })
            .await
            .map(|_| ())
    }

    /// Submit and wait for the resulting phase
    ///
    /// Returns [`Phase::Editing`] when validation blocked the submission or the
    /// collaborator refused it; the state then holds the reasons.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the submission did not finish in time.
    pub async fn submit(&self, timeout: Duration) -> Result<Phase, StoreError> {
        self.run(RendererAction::Submit, timeout).await
    }

    /// Save a draft and wait for the resulting phase
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the draft did not finish in time.
    pub async fn save_draft(&self, timeout: Duration) -> Result<Phase, StoreError> {
        self.run(RendererAction::SaveDraft, timeout).await
    }

    /// Read the session state
    pub async fn state<T>(&self, f: impl FnOnce(&RendererState) -> T) -> T {
        self.inner.state(f).await
    }

    /// Tear down the session and wait for in-flight work to drain
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] if effects outlive `timeout`.
    pub async fn close(&self, timeout: Duration) -> Result<(), StoreError> {
        self.inner.send(RendererAction::Teardown).await?;
        self.inner.shutdown(timeout).await
    }

    async fn run(&self, action: RendererAction, timeout: Duration) -> Result<Phase, StoreError> {
        let mut handle = self.inner.send(action).await?;
        handle.wait_with_timeout(timeout).await?;
        Ok(self.inner.state(|s| s.phase.clone()).await)
    }
}
