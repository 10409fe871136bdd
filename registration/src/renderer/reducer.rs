//! Reducer for the runtime renderer.

use crate::error::{SchemaError, SubmissionError};
use crate::renderer::{Phase, RendererAction, RendererEnvironment, RendererState, UnavailableReason};
use crate::submission::{RegistrationSubmission, SubmissionReceipt};
use crate::types::{FieldId, FormConfig};
use crate::validation::{validate_field, validate_form};
use crate::value::FieldValue;
use composable_forms_core::{effect::Effect, reducer::Reducer};
use smallvec::{SmallVec, smallvec};
use std::collections::HashMap;

/// Reducer for renderer sessions
#[derive(Clone, Copy, Debug, Default)]
pub struct RendererReducer;

impl RendererReducer {
    /// Create a new renderer reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn finish_load(
        state: &mut RendererState,
        result: Result<FormConfig, SchemaError>,
        prior_answers: Option<HashMap<FieldId, FieldValue>>,
        env: &RendererEnvironment,
    ) {
        let config = match result {
            Ok(config) => config,
            Err(SchemaError::ConfigNotFound) => {
                state.phase = Phase::Unavailable(UnavailableReason::NotConfigured);
                return;
            },
            Err(error) => {
                tracing::warn!(event_id = %state.event_id, %error, "Could not load registration form");
                state.phase = Phase::Unavailable(UnavailableReason::LoadFailed(error));
                return;
            },
        };

        state.phase = if !config.enabled {
            Phase::Unavailable(UnavailableReason::Disabled)
        } else if let Some(deadline) = config
            .registration_deadline
            .filter(|_| config.deadline_passed(env.clock().now()))
        {
            Phase::DeadlinePassed { deadline }
        } else {
            state.values = prior_answers
                .unwrap_or_default()
                .into_iter()
                .filter(|(id, _)| config.field(id).is_some())
                .collect();
            state.errors.clear();
            Phase::Editing
        };

        tracing::debug!(event_id = %state.event_id, phase = ?state.phase, "Registration form loaded");
        state.config = Some(config);
    }

    fn start_submission(
        state: &mut RendererState,
        draft: bool,
        env: &RendererEnvironment,
    ) -> SmallVec<[Effect<RendererAction>; 4]> {
        let Some(config) = &state.config else {
            return SmallVec::new();
        };

        if !draft {
            let errors = validate_form(&config.fields, &state.values);
            if !errors.is_empty() {
                tracing::debug!(invalid = errors.len(), "Submission blocked by validation");
                state.errors = errors;
                state.submit_error = None;
                return SmallVec::new();
            }
            state.errors.clear();
        }

        let submission = RegistrationSubmission::build(
            state.event_id,
            &config.fields,
            &state.values,
            draft,
            env.ids().next_id(),
        );
        state.phase = Phase::Submitting { draft };
        state.submit_error = None;

        let client = env.submissions();
        let generation = state.generation;

        smallvec![Effect::future(async move {
            let result = client.submit(submission).await;
            Some(RendererAction::SubmissionCompleted { generation, result })
        })]
    }

    fn finish_submission(
        state: &mut RendererState,
        result: Result<SubmissionReceipt, SubmissionError>,
    ) {
        let Phase::Submitting { draft } = state.phase else {
            tracing::warn!(phase = ?state.phase, "Submission result outside of submitting phase");
            return;
        };

        match result {
            Ok(SubmissionReceipt {
                payment: Some(payment),
                ..
            }) => {
                tracing::info!(event_id = %state.event_id, payment = %payment.id, "Registration awaiting payment");
                state.phase = Phase::AwaitingPayment { payment };
            },
            Ok(_) => {
                tracing::info!(event_id = %state.event_id, draft, "Registration submitted");
                state.phase = Phase::Submitted { draft };
            },
            Err(error) => {
                tracing::warn!(event_id = %state.event_id, %error, "Registration submission failed");
                state.submit_error = Some(error);
                state.phase = Phase::Editing;
            },
        }
    }
}

impl Reducer for RendererReducer {
    type State = RendererState;
    type Action = RendererAction;
    type Environment = RendererEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RendererAction::Load { prior_answers } => {
                if state.phase != Phase::Idle {
                    tracing::warn!(phase = ?state.phase, "Form already loaded or loading");
                    return SmallVec::new();
                }
                state.phase = Phase::Loading;

                let schema = env.schema().clone();
                let event_id = state.event_id;
                let generation = state.generation;

                smallvec![Effect::future(async move {
                    let result = schema.load(event_id).await;
                    Some(RendererAction::ConfigLoaded {
                        generation,
                        result,
                        prior_answers,
                    })
                })]
            },

            RendererAction::ConfigLoaded {
                generation,
                result,
                prior_answers,
            } => {
                if generation != state.generation || state.phase != Phase::Loading {
                    tracing::debug!(generation, "Discarding stale load result");
                } else {
                    Self::finish_load(state, result, prior_answers, env);
                }
                SmallVec::new()
            },

            RendererAction::SetValue { field_id, value } => {
                if state.phase != Phase::Editing {
                    tracing::warn!(phase = ?state.phase, "Ignoring input outside of editing");
                    return SmallVec::new();
                }
                let known = state
                    .config
                    .as_ref()
                    .is_some_and(|config| config.field(&field_id).is_some());
                if !known {
                    tracing::warn!(%field_id, "Ignoring input for unknown field");
                    return SmallVec::new();
                }

                state.errors.remove(&field_id);
                match value {
                    Some(value) => {
                        state.values.insert(field_id, value);
                    },
                    None => {
                        state.values.remove(&field_id);
                    },
                }
                SmallVec::new()
            },

            RendererAction::ValidateField { field_id } => {
                if state.phase != Phase::Editing {
                    return SmallVec::new();
                }
                let Some(field) = state.config.as_ref().and_then(|c| c.field(&field_id)) else {
                    tracing::warn!(%field_id, "Ignoring validation of unknown field");
                    return SmallVec::new();
                };

                match validate_field(field, state.values.get(&field_id)) {
                    Ok(()) => {
                        state.errors.remove(&field_id);
                    },
                    Err(error) => {
                        state.errors.insert(field_id, error);
                    },
                }
                SmallVec::new()
            },

            RendererAction::SaveDraft | RendererAction::Submit => {
                if state.phase != Phase::Editing {
                    tracing::warn!(phase = ?state.phase, "Ignoring submission outside of editing");
                    return SmallVec::new();
                }
                let draft = matches!(action, RendererAction::SaveDraft);
                Self::start_submission(state, draft, env)
            },

            RendererAction::SubmissionCompleted { generation, result } => {
                if generation == state.generation {
                    Self::finish_submission(state, result);
                } else {
                    tracing::debug!(generation, "Discarding stale submission result");
                }
                SmallVec::new()
            },

            RendererAction::Teardown => {
                state.generation += 1;
                state.phase = Phase::Closed;
                tracing::debug!(generation = state.generation, "Renderer session torn down");
                SmallVec::new()
            },
        }
    }
}
