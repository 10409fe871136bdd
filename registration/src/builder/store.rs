//! Store for builder sessions.

use crate::builder::{BuilderAction, BuilderEnvironment, BuilderReducer, BuilderState};
use crate::error::SchemaError;
use crate::types::{EventId, FormConfig};
use composable_forms_runtime::{Store, StoreConfig, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type Inner = Store<BuilderState, BuilderAction, BuilderEnvironment, BuilderReducer>;

/// A running builder session
///
/// Wraps the runtime [`Store`] with request/response helpers for the
/// operations that go over the network.
#[derive(Clone)]
pub struct BuilderStore {
    inner: Inner,
    // Held for the whole of one `save` call
    save_gate: Arc<Mutex<()>>,
}

impl BuilderStore {
    /// Start a session for `event_id` with an empty schema
    #[must_use]
    pub fn new(event_id: EventId, environment: BuilderEnvironment, config: StoreConfig) -> Self {
        Self {
            inner: Store::with_config(
                BuilderState::new(event_id),
                BuilderReducer::new(),
                environment,
                config,
            ),
            save_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Dispatch an action without waiting for its effects
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn send(&self, action: BuilderAction) -> Result<(), StoreError> {
        self.inner.send(action).await.map(|_| ())
    }

    /// Load the persisted schema and wait for the result
    ///
    /// A missing schema starts an empty one and is not an error here.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the load did not finish in time.
    pub async fn load(&self, timeout: Duration) -> Result<Result<(), SchemaError>, StoreError> {
        let mut handle = self.inner.send(BuilderAction::LoadConfig).await?;
        handle.wait_with_timeout(timeout).await?;

        Ok(self.inner.state(|s| s.load_error.clone()).await.map_or(Ok(()), Err))
    }

    /// Save and wait for the outcome of this request
    ///
    /// Label and pattern failures are reported without touching the network.
    /// A save requested while another one is running fails with
    /// [`SchemaError::SaveInProgress`]. On success the persisted schema is
    /// returned, even if edits made during the save left the session dirty.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the save did not finish in time.
    pub async fn save(&self, timeout: Duration) -> Result<Result<FormConfig, SchemaError>, StoreError> {
        let Ok(_gate) = self.save_gate.try_lock() else {
            tracing::debug!("Save requested while another is pending");
            return Ok(Err(SchemaError::SaveInProgress));
        };

        let outcome = self
            .inner
            .send_and_wait_for(
                BuilderAction::Save,
                |action| {
                    matches!(
                        action,
                        BuilderAction::SaveCompleted { .. } | BuilderAction::SaveRejected { .. }
                    )
                },
                timeout,
            )
            .await?;

        match outcome {
            BuilderAction::SaveCompleted { result, .. } => Ok(result),
            BuilderAction::SaveRejected { error } => Ok(Err(error)),
            other => {
                tracing::error!(?other, "Save wait matched an unrelated action");
                Err(StoreError::ChannelClosed)
            },
        }
    }

    /// Read the session state
    pub async fn state<T>(&self, f: impl FnOnce(&BuilderState) -> T) -> T {
        self.inner.state(f).await
    }

    /// Tear down the session and wait for in-flight work to drain
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] if effects outlive `timeout`.
    pub async fn close(&self, timeout: Duration) -> Result<(), StoreError> {
        self.inner.send(BuilderAction::Teardown).await?;
        self.inner.shutdown(timeout).await
    }
}
