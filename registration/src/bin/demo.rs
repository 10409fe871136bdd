//! Registration demo binary
//!
//! Designs a small form in a builder session, then fills it in and submits it
//! through a renderer session.
//!
//! Runs against in-memory collaborators by default. Pass `--remote` to talk to
//! the REST backend at `REGISTRATION_API_URL` instead.

use composable_forms_core::environment::{RandomIds, SystemClock};
use registration_forms::builder::{BuilderAction, BuilderEnvironment, BuilderStore, FieldTarget};
use registration_forms::config::Config;
use registration_forms::http::HttpRegistrationApi;
use registration_forms::renderer::{Phase, RendererEnvironment, RendererStore};
use registration_forms::repository::{ConfigRepository, FormSchemaStore, InMemoryConfigRepository};
use registration_forms::submission::{InMemorySubmissionClient, SubmissionClient};
use registration_forms::types::{EventId, FieldPatch, FieldType};
use registration_forms::value::FieldValue;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let repository: Arc<dyn ConfigRepository>;
    let submissions: Arc<dyn SubmissionClient>;
    if std::env::args().any(|arg| arg == "--remote") {
        tracing::info!(base_url = %config.api.base_url, "Using REST backend");
        let api = Arc::new(HttpRegistrationApi::from_config(&config.api));
        repository = api.clone();
        submissions = api;
    } else {
        repository = Arc::new(InMemoryConfigRepository::new());
        submissions = Arc::new(InMemorySubmissionClient::new());
    }

    let ids = Arc::new(RandomIds);
    let schema = FormSchemaStore::new(repository, ids.clone());
    let event_id = EventId::new();

    println!("=== Registration Forms Demo ===\n");

    // Builder session
    let builder = BuilderStore::new(
        event_id,
        BuilderEnvironment::new(ids.clone(), schema.clone()),
        config.store_config(),
    );
    builder.load(REQUEST_TIMEOUT).await??;

    for (field_type, label) in [
        (FieldType::Text, "Full name"),
        (FieldType::Email, "Email"),
        (FieldType::Checkbox, "I accept the terms"),
    ] {
        builder.send(BuilderAction::AddField { field_type }).await?;
        let index = builder.state(|s| s.config.fields.len() - 1).await;
        let mut patch = FieldPatch::label(label);
        patch.required = Some(true);
        builder
            .send(BuilderAction::UpdateField {
                target: FieldTarget::Index(index),
                patch,
            })
            .await?;
    }

    let saved = builder.save(REQUEST_TIMEOUT).await??;
    println!("Saved form with {} fields for event {event_id}", saved.fields.len());
    builder.close(config.store_config().default_shutdown_timeout).await?;

    // Renderer session
    let renderer = RendererStore::new(
        event_id,
        RendererEnvironment::new(Arc::new(SystemClock), ids, schema, submissions),
        config.store_config(),
    );
    let phase = renderer.load(None, REQUEST_TIMEOUT).await?;
    println!("Form phase after load: {phase:?}");

    let answers = [
        FieldValue::from("Ada Lovelace"),
        FieldValue::from("not-an-email"),
        FieldValue::from(true),
    ];
    for (field, value) in saved.fields.iter().zip(answers) {
        renderer.set_value(field.id.clone(), Some(value)).await?;
    }

    let phase = renderer.submit(REQUEST_TIMEOUT).await?;
    let messages = renderer
        .state(|s| s.errors.values().map(ToString::to_string).collect::<Vec<_>>())
        .await;
    println!("First attempt: {phase:?}, errors: {messages:?}");

    if let Some(email) = saved.fields.iter().find(|f| f.field_type == FieldType::Email) {
        renderer
            .set_value(email.id.clone(), Some(FieldValue::from("ada@example.org")))
            .await?;
    }
    let phase = renderer.submit(REQUEST_TIMEOUT).await?;
    match phase {
        Phase::Submitted { .. } => println!("Registration submitted"),
        Phase::AwaitingPayment { payment } => println!("Payment required: {}", payment.id),
        other => println!("Unexpected phase: {other:?}"),
    }

    renderer.close(config.store_config().default_shutdown_timeout).await?;
    Ok(())
}
