//! Unit tests for `RendererReducer`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use super::*;
use crate::error::{FieldError, RepositoryError, SchemaError, SubmissionError};
use crate::repository::{FormSchemaStore, InMemoryConfigRepository};
use crate::submission::{InMemorySubmissionClient, PaymentIntentRef, SubmissionReceipt};
use crate::types::{EventId, FieldId, FieldType, FieldValidation, FormConfig, FormField};
use crate::value::{FieldValue, FileBlob};
use chrono::Duration as ChronoDuration;
use composable_forms_core::environment::Clock;
use composable_forms_core::reducer::Reducer;
use composable_forms_testing::{ReducerTest, SequentialIds, assertions, collect_actions, test_clock};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

fn event() -> EventId {
    EventId::from_uuid(Uuid::from_u128(0xE1))
}

fn id(n: u128) -> FieldId {
    FieldId::from_uuid(Uuid::from_u128(n))
}

fn field(n: u128, label: &str, field_type: FieldType, required: bool) -> FormField {
    let mut field = FormField::new(id(n), field_type, 0);
    field.label = label.to_string();
    field.required = required;
    field
}

/// Name (required text), Email (required email), Age (number 18..=99)
fn sample_config() -> FormConfig {
    let mut age = field(3, "Age", FieldType::Number, false);
    age.validation = Some(FieldValidation {
        min: Some(18.0),
        max: Some(99.0),
        ..FieldValidation::default()
    });

    FormConfig {
        fields: vec![
            field(1, "Name", FieldType::Text, true),
            field(2, "Email", FieldType::Email, true),
            age,
        ],
        ..FormConfig::default()
    }
}

fn env_with(config: Option<FormConfig>, submissions: InMemorySubmissionClient) -> RendererEnvironment {
    let repository = match config {
        Some(config) => InMemoryConfigRepository::with_configs([(event(), config)]),
        None => InMemoryConfigRepository::new(),
    };
    let ids = Arc::new(SequentialIds::starting_at(500));
    RendererEnvironment::new(
        Arc::new(test_clock()),
        ids.clone(),
        FormSchemaStore::new(Arc::new(repository), ids),
        Arc::new(submissions),
    )
}

fn test_env() -> RendererEnvironment {
    env_with(Some(sample_config()), InMemorySubmissionClient::new())
}

fn editing_state(config: FormConfig) -> RendererState {
    let mut state = RendererState::new(event());
    state.config = Some(config);
    state.phase = Phase::Editing;
    state
}

/// Run `action` and feed every produced action back, like the Store does
async fn drive(
    state: &mut RendererState,
    action: RendererAction,
    env: &RendererEnvironment,
) {
    let reducer = RendererReducer::new();
    let mut pending = vec![action];
    while let Some(action) = pending.pop() {
        let effects = reducer.reduce(state, action, env);
        pending.extend(collect_actions(effects).await);
    }
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn load_enters_editing() {
    let env = test_env();
    let mut state = RendererState::new(event());

    drive(&mut state, RendererAction::Load { prior_answers: None }, &env).await;

    assert_eq!(state.phase, Phase::Editing);
    assert_eq!(state.config, Some(sample_config()));
    assert!(state.values.is_empty());
}

#[test]
fn load_starts_fetch_once() {
    ReducerTest::new(RendererReducer::new())
        .with_env(test_env())
        .given_state(RendererState::new(event()))
        .when_action(RendererAction::Load { prior_answers: None })
        .then_state(|state| assert_eq!(state.phase, Phase::Loading))
        .then_effects(assertions::assert_has_future_effect)
        .run();

    let mut loading = RendererState::new(event());
    loading.phase = Phase::Loading;
    ReducerTest::new(RendererReducer::new())
        .with_env(test_env())
        .given_state(loading)
        .when_action(RendererAction::Load { prior_answers: None })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn missing_config_is_unavailable() {
    let env = env_with(None, InMemorySubmissionClient::new());
    let mut state = RendererState::new(event());

    drive(&mut state, RendererAction::Load { prior_answers: None }, &env).await;

    assert_eq!(state.phase, Phase::Unavailable(UnavailableReason::NotConfigured));
}

#[tokio::test]
async fn disabled_config_is_unavailable() {
    let config = FormConfig {
        enabled: false,
        ..sample_config()
    };
    let env = env_with(Some(config), InMemorySubmissionClient::new());
    let mut state = RendererState::new(event());

    drive(&mut state, RendererAction::Load { prior_answers: None }, &env).await;

    assert_eq!(state.phase, Phase::Unavailable(UnavailableReason::Disabled));
}

#[test]
fn other_load_failures_are_unavailable_with_reason() {
    let mut loading = RendererState::new(event());
    loading.phase = Phase::Loading;
    let error = SchemaError::Repository(RepositoryError::Transport("timeout".into()));

    ReducerTest::new(RendererReducer::new())
        .with_env(test_env())
        .given_state(loading)
        .when_action(RendererAction::ConfigLoaded {
            generation: 0,
            result: Err(error.clone()),
            prior_answers: None,
        })
        .then_state(move |state| {
            assert_eq!(
                state.phase,
                Phase::Unavailable(UnavailableReason::LoadFailed(error))
            );
        })
        .run();
}

#[test]
fn deadline_boundary() {
    let now = test_clock().now();

    for (deadline, closed) in [
        (now - ChronoDuration::seconds(1), true),
        (now, false),
        (now + ChronoDuration::days(1), false),
    ] {
        let mut loading = RendererState::new(event());
        loading.phase = Phase::Loading;
        let config = FormConfig {
            registration_deadline: Some(deadline),
            ..sample_config()
        };

        ReducerTest::new(RendererReducer::new())
            .with_env(test_env())
            .given_state(loading)
            .when_action(RendererAction::ConfigLoaded {
                generation: 0,
                result: Ok(config),
                prior_answers: None,
            })
            .then_state(move |state| {
                if closed {
                    assert_eq!(state.phase, Phase::DeadlinePassed { deadline });
                } else {
                    assert_eq!(state.phase, Phase::Editing);
                }
            })
            .run();
    }
}

#[tokio::test]
async fn prior_answers_seed_known_fields_only() {
    let env = test_env();
    let mut state = RendererState::new(event());
    let prior = HashMap::from([
        (id(1), FieldValue::from("Ada")),
        (id(77), FieldValue::from("orphan")),
    ]);

    drive(
        &mut state,
        RendererAction::Load {
            prior_answers: Some(prior),
        },
        &env,
    )
    .await;

    assert_eq!(state.value_of(&id(1)), Some(&FieldValue::from("Ada")));
    assert_eq!(state.values.len(), 1);
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn set_value_clears_only_that_error() {
    let mut state = editing_state(sample_config());
    state.errors.insert(id(1), FieldError::Required { label: "Name".into() });
    state.errors.insert(id(2), FieldError::InvalidEmail);

    ReducerTest::new(RendererReducer::new())
        .with_env(test_env())
        .given_state(state)
        .when_action(RendererAction::SetValue {
            field_id: id(1),
            value: Some(FieldValue::from("Ada")),
        })
        .then_state(|state| {
            assert_eq!(state.error_for(&id(1)), None);
            assert_eq!(state.error_for(&id(2)), Some(&FieldError::InvalidEmail));
            assert_eq!(state.value_of(&id(1)), Some(&FieldValue::from("Ada")));
        })
        .run();
}

#[test]
fn set_value_for_unknown_field_is_ignored() {
    ReducerTest::new(RendererReducer::new())
        .with_env(test_env())
        .given_state(editing_state(sample_config()))
        .when_action(RendererAction::SetValue {
            field_id: id(42),
            value: Some(FieldValue::from("x")),
        })
        .then_state(|state| assert!(state.values.is_empty()))
        .run();
}

#[test]
fn validate_field_on_blur() {
    let reducer = RendererReducer::new();
    let env = test_env();
    let mut state = editing_state(sample_config());

    reducer.reduce(&mut state, RendererAction::SetValue {
        field_id: id(3),
        value: Some(FieldValue::from("12")),
    }, &env);
    reducer.reduce(&mut state, RendererAction::ValidateField { field_id: id(3) }, &env);

    assert_eq!(
        state.error_for(&id(3)).map(ToString::to_string).as_deref(),
        Some("Age must be at least 18")
    );
    // Other fields are not checked on blur
    assert_eq!(state.error_for(&id(1)), None);

    reducer.reduce(&mut state, RendererAction::SetValue {
        field_id: id(3),
        value: Some(FieldValue::from("30")),
    }, &env);
    reducer.reduce(&mut state, RendererAction::ValidateField { field_id: id(3) }, &env);
    assert_eq!(state.error_for(&id(3)), None);
}

// ============================================================================
// Submitting
// ============================================================================

#[test]
fn invalid_submit_stays_editing_with_errors() {
    let mut state = editing_state(sample_config());
    state.values.insert(id(2), FieldValue::from("a@b"));
    state.values.insert(id(3), FieldValue::from("100"));

    ReducerTest::new(RendererReducer::new())
        .with_env(test_env())
        .given_state(state)
        .when_action(RendererAction::Submit)
        .then_state(|state| {
            assert_eq!(state.phase, Phase::Editing);
            let messages: Vec<String> = state.errors.values().map(ToString::to_string).collect();
            assert_eq!(
                messages,
                vec![
                    "Name is required",
                    "Please enter a valid email address",
                    "Age must be no more than 99",
                ]
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn blocked_submit_clears_previous_banner() {
    let mut state = editing_state(sample_config());
    state.submit_error = Some(SubmissionError::Transport("offline".into()));

    ReducerTest::new(RendererReducer::new())
        .with_env(test_env())
        .given_state(state)
        .when_action(RendererAction::Submit)
        .then_state(|state| {
            assert_eq!(state.phase, Phase::Editing);
            assert_eq!(state.submit_error, None);
            assert!(state.error_for(&id(1)).is_some());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn valid_submit_sends_schema_shaped_payload() {
    let client = InMemorySubmissionClient::new();
    let env = env_with(Some(sample_config()), client.clone());
    let mut state = editing_state(sample_config());
    state.values.insert(id(1), FieldValue::from("Ada"));
    state.values.insert(id(2), FieldValue::from("ada@example.org"));

    drive(&mut state, RendererAction::Submit, &env).await;

    assert_eq!(state.phase, Phase::Submitted { draft: false });
    let accepted = client.accepted().await;
    assert_eq!(accepted.len(), 1);
    let submission = &accepted[0];
    assert!(!submission.save_as_draft);
    assert_eq!(submission.idempotency_key, SequentialIds::id(500));
    assert_eq!(
        serde_json::to_value(&submission.registration_data).unwrap(),
        json!([
            { "fieldId": id(1), "fieldLabel": "Name", "fieldType": "text", "value": "Ada" },
            { "fieldId": id(2), "fieldLabel": "Email", "fieldType": "email", "value": "ada@example.org" },
            { "fieldId": id(3), "fieldLabel": "Age", "fieldType": "number", "value": null },
        ])
    );
}

#[tokio::test]
async fn draft_skips_validation() {
    let config = FormConfig {
        fields: vec![
            field(1, "A", FieldType::Text, true),
            field(2, "B", FieldType::Text, false),
        ],
        ..FormConfig::default()
    };
    let client = InMemorySubmissionClient::new();
    let env = env_with(Some(config.clone()), client.clone());
    let mut state = editing_state(config);
    state.values.insert(id(2), FieldValue::from("x"));

    drive(&mut state, RendererAction::SaveDraft, &env).await;

    assert_eq!(state.phase, Phase::Submitted { draft: true });
    assert!(state.errors.is_empty());
    let accepted = client.accepted().await;
    assert!(accepted[0].save_as_draft);
    let values: Vec<_> = accepted[0]
        .registration_data
        .iter()
        .map(|entry| entry.value.clone())
        .collect();
    assert_eq!(values, vec![None, Some(json!("x"))]);
}

#[tokio::test]
async fn files_travel_beside_entries() {
    let config = FormConfig {
        fields: vec![field(1, "Passport scan", FieldType::File, true)],
        ..FormConfig::default()
    };
    let client = InMemorySubmissionClient::new();
    let env = env_with(Some(config.clone()), client.clone());
    let mut state = editing_state(config);
    let blob = FileBlob::new("scan.png", "image/png", vec![0x89, 0x50]);
    state.values.insert(id(1), FieldValue::from(blob.clone()));

    drive(&mut state, RendererAction::Submit, &env).await;

    let accepted = client.accepted().await;
    assert_eq!(accepted[0].registration_data[0].value, Some(json!("scan.png")));
    assert_eq!(accepted[0].files.get(&id(1)), Some(&blob));
}

#[tokio::test]
async fn payment_required_awaits_payment() {
    let payment = PaymentIntentRef {
        id: "pi_123".into(),
        client_secret: Some("secret".into()),
    };
    let env = env_with(
        Some(sample_config()),
        InMemorySubmissionClient::requiring_payment(payment.clone()),
    );
    let mut state = editing_state(sample_config());
    state.values.insert(id(1), FieldValue::from("Ada"));
    state.values.insert(id(2), FieldValue::from("ada@example.org"));

    drive(&mut state, RendererAction::Submit, &env).await;

    assert_eq!(state.phase, Phase::AwaitingPayment { payment });
}

#[tokio::test]
async fn failed_submission_returns_to_editing_with_banner() {
    let rejection = SubmissionError::Rejected {
        status: 409,
        message: "Event is full".into(),
    };
    let env = env_with(
        Some(sample_config()),
        InMemorySubmissionClient::failing(rejection.clone()),
    );
    let mut state = editing_state(sample_config());
    state.values.insert(id(1), FieldValue::from("Ada"));
    state.values.insert(id(2), FieldValue::from("ada@example.org"));

    drive(&mut state, RendererAction::Submit, &env).await;

    assert_eq!(state.phase, Phase::Editing);
    assert_eq!(state.submit_error, Some(rejection));
}

#[test]
fn failed_draft_preserves_field_errors() {
    let mut state = editing_state(sample_config());
    state.phase = Phase::Submitting { draft: true };
    state.errors.insert(id(2), FieldError::InvalidEmail);

    ReducerTest::new(RendererReducer::new())
        .with_env(test_env())
        .given_state(state)
        .when_action(RendererAction::SubmissionCompleted {
            generation: 0,
            result: Err(SubmissionError::Transport("offline".into())),
        })
        .then_state(|state| {
            assert_eq!(state.phase, Phase::Editing);
            assert_eq!(state.error_for(&id(2)), Some(&FieldError::InvalidEmail));
            assert!(state.submit_error.is_some());
        })
        .run();
}

#[test]
fn submit_while_submitting_is_ignored() {
    let mut state = editing_state(sample_config());
    state.phase = Phase::Submitting { draft: false };

    ReducerTest::new(RendererReducer::new())
        .with_env(test_env())
        .given_state(state)
        .when_action(RendererAction::SaveDraft)
        .then_state(|state| assert_eq!(state.phase, Phase::Submitting { draft: false }))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn each_attempt_gets_a_fresh_idempotency_key() {
    let client = InMemorySubmissionClient::new();
    let env = env_with(Some(sample_config()), client.clone());
    let mut first = editing_state(sample_config());
    let mut second = editing_state(sample_config());

    drive(&mut first, RendererAction::SaveDraft, &env).await;
    drive(&mut second, RendererAction::SaveDraft, &env).await;

    let keys: Vec<Uuid> = client
        .accepted()
        .await
        .iter()
        .map(|submission| submission.idempotency_key)
        .collect();
    assert_eq!(keys, vec![SequentialIds::id(500), SequentialIds::id(501)]);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn results_after_teardown_are_discarded() {
    let reducer = RendererReducer::new();
    let env = test_env();
    let mut state = editing_state(sample_config());
    state.phase = Phase::Submitting { draft: false };

    reducer.reduce(&mut state, RendererAction::Teardown, &env);
    reducer.reduce(
        &mut state,
        RendererAction::SubmissionCompleted {
            generation: 0,
            result: Ok(SubmissionReceipt::default()),
        },
        &env,
    );

    assert_eq!(state.generation, 1);
    assert_eq!(state.phase, Phase::Closed);
}

#[test]
fn closed_session_ignores_input_and_submissions() {
    let reducer = RendererReducer::new();
    let env = test_env();
    let mut state = editing_state(sample_config());
    state.values.insert(id(1), FieldValue::from("Ada"));
    state.values.insert(id(2), FieldValue::from("ada@example.org"));

    reducer.reduce(&mut state, RendererAction::Teardown, &env);

    for action in [RendererAction::Submit, RendererAction::SaveDraft] {
        let effects = reducer.reduce(&mut state, action, &env);
        assertions::assert_no_effects(&effects);
    }
    reducer.reduce(
        &mut state,
        RendererAction::SetValue {
            field_id: id(1),
            value: Some(FieldValue::from("Grace")),
        },
        &env,
    );
    let effects = reducer.reduce(&mut state, RendererAction::Load { prior_answers: None }, &env);

    assertions::assert_no_effects(&effects);
    assert_eq!(state.phase, Phase::Closed);
    assert_eq!(state.value_of(&id(1)), Some(&FieldValue::from("Ada")));
}

#[test]
fn sections_group_loaded_fields() {
    let mut config = sample_config();
    config.fields[2].section = Some("About you".into());
    let state = editing_state(config);

    let names: Vec<&str> = state.sections().iter().map(|s| s.name).collect();

    assert_eq!(names, vec!["General Information", "About you"]);
    assert!(RendererState::new(event()).sections().is_empty());
}
