//! Schema persistence.
//!
//! [`ConfigRepository`] is the collaborator seam (REST backend in
//! production, in-memory map in tests). [`FormSchemaStore`] layers the
//! schema rules on top: label validation before any write, and document
//! import.

use crate::error::{RepositoryError, SchemaError};
use crate::import::parse_document;
use crate::types::{EventId, FormConfig};
use crate::validation::invalid_pattern_ids;
use composable_forms_core::environment::IdGenerator;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Repository result
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Boxed future returned by repository operations
pub type RepositoryFuture<T> = Pin<Box<dyn Future<Output = RepositoryResult<T>> + Send>>;

/// Storage of one schema document per event
pub trait ConfigRepository: Send + Sync {
    /// Fetch the stored config
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] when none is stored, or a backend failure.
    fn load(&self, event_id: EventId) -> RepositoryFuture<FormConfig>;

    /// Overwrite the stored config, returning what was persisted
    ///
    /// # Errors
    ///
    /// Returns a backend failure.
    fn save(&self, event_id: EventId, config: FormConfig) -> RepositoryFuture<FormConfig>;
}

/// In-memory repository for tests and the demo
#[derive(Clone, Default)]
pub struct InMemoryConfigRepository {
    configs: Arc<RwLock<HashMap<EventId, FormConfig>>>,
    failure: Option<RepositoryError>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryConfigRepository {
    /// Empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-seeded with configs
    #[must_use]
    pub fn with_configs(configs: impl IntoIterator<Item = (EventId, FormConfig)>) -> Self {
        Self {
            configs: Arc::new(RwLock::new(configs.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Repository whose every operation fails with `error`
    #[must_use]
    pub fn failing(error: RepositoryError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Stored config, if any
    pub async fn get(&self, event_id: EventId) -> Option<FormConfig> {
        self.configs.read().await.get(&event_id).cloned()
    }

    /// Number of save calls that reached this repository
    #[must_use]
    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ConfigRepository for InMemoryConfigRepository {
    fn load(&self, event_id: EventId) -> RepositoryFuture<FormConfig> {
        let configs = Arc::clone(&self.configs);
        let failure = self.failure.clone();

        Box::pin(async move {
            if let Some(error) = failure {
                return Err(error);
            }
            configs
                .read()
                .await
                .get(&event_id)
                .cloned()
                .ok_or(RepositoryError::NotFound)
        })
    }

    fn save(&self, event_id: EventId, config: FormConfig) -> RepositoryFuture<FormConfig> {
        let configs = Arc::clone(&self.configs);
        let failure = self.failure.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);

        Box::pin(async move {
            if let Some(error) = failure {
                return Err(error);
            }
            configs.write().await.insert(event_id, config.clone());
            Ok(config)
        })
    }
}

/// The authoritative schema service
///
/// Cheap to clone; clones share the same collaborators.
#[derive(Clone)]
pub struct FormSchemaStore {
    repository: Arc<dyn ConfigRepository>,
    ids: Arc<dyn IdGenerator>,
}

impl FormSchemaStore {
    /// Build a store over a repository
    #[must_use]
    pub fn new(repository: Arc<dyn ConfigRepository>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { repository, ids }
    }

    /// Load the schema of an event
    ///
    /// # Errors
    ///
    /// [`SchemaError::ConfigNotFound`] when no form is configured, otherwise
    /// [`SchemaError::Repository`].
    #[tracing::instrument(skip_all, fields(%event_id))]
    pub async fn load(&self, event_id: EventId) -> Result<FormConfig, SchemaError> {
        let config = self.repository.load(event_id).await?;
        tracing::debug!(fields = config.fields.len(), "Loaded registration config");
        Ok(config)
    }

    /// Persist a whole schema
    ///
    /// # Errors
    ///
    /// [`SchemaError::Validation`] listing every blank-label field, or
    /// [`SchemaError::InvalidPatterns`] listing every unusable pattern, both
    /// checked before the repository is touched; otherwise
    /// [`SchemaError::Repository`].
    #[tracing::instrument(skip_all, fields(%event_id))]
    pub async fn save(&self, event_id: EventId, config: FormConfig) -> Result<FormConfig, SchemaError> {
        check_before_save(&config)?;

        let saved = self.repository.save(event_id, config).await?;
        tracing::info!(fields = saved.fields.len(), "Saved registration config");
        Ok(saved)
    }

    /// Replace the schema with an imported document
    ///
    /// The document is a full overwrite, never a merge.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Parse`] or [`SchemaError::MalformedImport`] for a bad
    /// document, then the errors of [`FormSchemaStore::save`].
    pub async fn replace(&self, event_id: EventId, raw: &str) -> Result<FormConfig, SchemaError> {
        let config = self.parse(raw)?;
        self.save(event_id, config).await
    }

    /// Parse a document without persisting it
    ///
    /// # Errors
    ///
    /// See [`parse_document`].
    pub fn parse(&self, raw: &str) -> Result<FormConfig, SchemaError> {
        parse_document(raw, self.ids.as_ref())
    }
}

/// Reject a config with blank labels, naming all of them
///
/// # Errors
///
/// [`SchemaError::Validation`] when at least one label is blank.
pub fn check_labels(config: &FormConfig) -> Result<(), SchemaError> {
    let invalid_field_ids = config.blank_label_ids();
    if invalid_field_ids.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = invalid_field_ids.len(), "Rejected config with blank labels");
        Err(SchemaError::Validation { invalid_field_ids })
    }
}

/// Reject a config whose field patterns would never be enforced
///
/// # Errors
///
/// [`SchemaError::InvalidPatterns`] when at least one pattern does not compile.
pub fn check_patterns(config: &FormConfig) -> Result<(), SchemaError> {
    let invalid_field_ids = invalid_pattern_ids(&config.fields);
    if invalid_field_ids.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = invalid_field_ids.len(), "Rejected config with invalid patterns");
        Err(SchemaError::InvalidPatterns { invalid_field_ids })
    }
}

/// Every check a config must pass before it is persisted
///
/// # Errors
///
/// See [`check_labels`] and [`check_patterns`], in that order.
pub fn check_before_save(config: &FormConfig) -> Result<(), SchemaError> {
    check_labels(config)?;
    check_patterns(config)
}
