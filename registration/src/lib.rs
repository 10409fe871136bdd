//! # Registration Forms
//!
//! Event registration forms built on the composable reducer architecture.
//!
//! Organizers design a form per event in a **builder** session; attendees fill
//! it in through a **renderer** session. Both sessions are reducers driven by a
//! runtime `Store`, and both share one validation engine.
//!
//! ## Modules
//!
//! - [`types`]: the persisted schema (`FormConfig`, `FormField`, patches)
//! - [`value`]: attendee answers and uploaded files
//! - [`validation`]: per-field rules and the user-facing messages
//! - [`grouping`]: section grouping for display
//! - [`import`]: JSON import/export of a schema document
//! - [`repository`]: schema persistence behind [`repository::ConfigRepository`]
//! - [`submission`]: submission payloads behind [`submission::SubmissionClient`]
//! - [`http`]: REST implementation of both collaborators
//! - [`builder`]: the form designer session
//! - [`renderer`]: the attendee session
//! - [`config`]: environment configuration
//!
//! ## Example
//!
//! ```ignore
//! use registration_forms::builder::{BuilderAction, BuilderEnvironment, BuilderStore};
//! use registration_forms::types::FieldType;
//!
//! let store = BuilderStore::new(event_id, env, StoreConfig::default());
//! store.load(Duration::from_secs(5)).await??;
//! store.send(BuilderAction::AddField { field_type: FieldType::Email }).await?;
//! let saved = store.save(Duration::from_secs(5)).await??;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod grouping;
pub mod http;
pub mod import;
pub mod renderer;
pub mod repository;
pub mod submission;
pub mod types;
pub mod validation;
pub mod value;

pub use error::{FieldError, RepositoryError, SchemaError, SubmissionError};
pub use types::{EventId, FieldId, FieldType, FormConfig, FormField};
pub use value::{FieldValue, FileBlob};
