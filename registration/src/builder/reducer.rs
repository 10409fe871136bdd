//! Reducer for the form builder.

use crate::builder::{BuilderAction, BuilderEnvironment, BuilderState};
use crate::error::SchemaError;
use crate::repository::check_before_save;
use crate::types::{FieldId, FieldType, FormConfig, FormField};
use composable_forms_core::{effect::Effect, reducer::Reducer};
use smallvec::{SmallVec, smallvec};

/// Attempts at drawing a field id that is not already taken
const MAX_ID_ATTEMPTS: usize = 8;

/// Reducer for builder sessions
#[derive(Clone, Copy, Debug, Default)]
pub struct BuilderReducer;

impl BuilderReducer {
    /// Create a new builder reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn add_field(state: &mut BuilderState, field_type: FieldType, env: &BuilderEnvironment) {
        let Some(id) = fresh_field_id(&state.config, env) else {
            tracing::warn!("Could not draw an unused field id, field not added");
            return;
        };

        let order = u32::try_from(state.config.fields.len()).unwrap_or(u32::MAX);
        tracing::debug!(field_id = %id, %field_type, "Added field");
        state.config.fields.push(FormField::new(id.clone(), field_type, order));
        state.selected_field_id = Some(id);
        state.touch();
    }

    fn remove_field(state: &mut BuilderState, id: &FieldId) {
        state.config.fields.retain(|f| &f.id != id);
        if state.selected_field_id.as_ref() == Some(id) {
            state.selected_field_id = None;
        }
        state.touch();

        tracing::debug!(field_id = %id, "Removed field");
    }

    fn reorder_fields(state: &mut BuilderState, permutation: &[usize]) {
        if !is_permutation(permutation, state.config.fields.len()) {
            tracing::warn!(
                ?permutation,
                fields = state.config.fields.len(),
                "Ignoring reorder that is not a permutation"
            );
            return;
        }

        let mut previous: Vec<Option<FormField>> =
            std::mem::take(&mut state.config.fields).into_iter().map(Some).collect();
        state.config.fields = permutation
            .iter()
            .filter_map(|&from| previous[from].take())
            .collect();
        state.config.renumber();
        state.touch();
    }

    fn start_save(
        state: &mut BuilderState,
        env: &BuilderEnvironment,
    ) -> SmallVec<[Effect<BuilderAction>; 4]> {
        if state.is_saving {
            tracing::warn!("Save already in flight, rejecting");
            return smallvec![Effect::send(BuilderAction::SaveRejected {
                error: SchemaError::SaveInProgress,
            })];
        }

        if let Err(error) = check_before_save(&state.config) {
            state.save_error = Some(error.clone());
            return smallvec![Effect::send(BuilderAction::SaveRejected { error })];
        }

        state.is_saving = true;
        state.save_error = None;

        let schema = env.schema().clone();
        let event_id = state.event_id;
        let config = state.config.clone();
        let generation = state.generation;
        let revision = state.revision;

        smallvec![Effect::future(async move {
            let result = schema.save(event_id, config).await;
            Some(BuilderAction::SaveCompleted {
                generation,
                revision,
                result,
            })
        })]
    }

    fn finish_save(
        state: &mut BuilderState,
        revision: u64,
        result: Result<FormConfig, SchemaError>,
    ) {
        state.is_saving = false;

        match result {
            Ok(saved) => {
                state.save_error = None;
                if revision == state.revision {
                    state.config = saved;
                    state.is_dirty = false;
                    tracing::info!(event_id = %state.event_id, "Registration form saved");
                } else {
                    tracing::debug!(
                        saved_revision = revision,
                        current_revision = state.revision,
                        "Edits arrived during save, staying dirty"
                    );
                }
            },
            Err(error) => {
                tracing::warn!(event_id = %state.event_id, %error, "Saving registration form failed");
                state.save_error = Some(error);
            },
        }
    }

    fn finish_load(state: &mut BuilderState, result: Result<FormConfig, SchemaError>) {
        state.is_loading = false;

        let config = match result {
            Ok(config) => config,
            Err(SchemaError::ConfigNotFound) => {
                tracing::debug!(event_id = %state.event_id, "No form configured yet, starting empty");
                FormConfig::default()
            },
            Err(error) => {
                tracing::warn!(event_id = %state.event_id, %error, "Loading registration form failed");
                state.load_error = Some(error);
                return;
            },
        };

        state.config = config;
        state.is_dirty = false;
        state.selected_field_id = None;
        state.load_error = None;
    }
}

impl Reducer for BuilderReducer {
    type State = BuilderState;
    type Action = BuilderAction;
    type Environment = BuilderEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BuilderAction::LoadConfig => {
                if state.is_loading {
                    tracing::warn!("Load already in flight, ignoring");
                    return SmallVec::new();
                }
                state.is_loading = true;

                let schema = env.schema().clone();
                let event_id = state.event_id;
                let generation = state.generation;

                smallvec![Effect::future(async move {
                    let result = schema.load(event_id).await;
                    Some(BuilderAction::ConfigLoaded { generation, result })
                })]
            },

            BuilderAction::ConfigLoaded { generation, result } => {
                if generation == state.generation {
                    Self::finish_load(state, result);
                } else {
                    tracing::debug!(generation, "Discarding stale load result");
                }
                SmallVec::new()
            },

            BuilderAction::AddField { field_type } => {
                Self::add_field(state, field_type, env);
                SmallVec::new()
            },

            BuilderAction::UpdateField { target, patch } => {
                let field = target
                    .resolve(&state.config)
                    .and_then(|id| state.config.field_mut(&id));
                match field {
                    Some(field) => {
                        patch.apply_to(field);
                        state.touch();
                    },
                    None => tracing::warn!(?target, "Ignoring update of unknown field"),
                }
                SmallVec::new()
            },

            BuilderAction::RemoveField { target } => {
                match target.resolve(&state.config) {
                    Some(id) => Self::remove_field(state, &id),
                    None => tracing::warn!(?target, "Ignoring removal of unknown field"),
                }
                SmallVec::new()
            },

            BuilderAction::ReorderFields { permutation } => {
                Self::reorder_fields(state, &permutation);
                SmallVec::new()
            },

            BuilderAction::SelectField { field_id } => {
                let unknown = field_id
                    .as_ref()
                    .is_some_and(|id| state.config.field(id).is_none());
                if unknown {
                    tracing::warn!(?field_id, "Ignoring selection of unknown field");
                } else {
                    state.selected_field_id = field_id;
                }
                SmallVec::new()
            },

            BuilderAction::UpdateSettings { patch } => {
                patch.apply_to(&mut state.config);
                state.touch();
                SmallVec::new()
            },

            BuilderAction::Save => Self::start_save(state, env),

            BuilderAction::SaveCompleted {
                generation,
                revision,
                result,
            } => {
                if generation == state.generation {
                    Self::finish_save(state, revision, result);
                } else {
                    tracing::debug!(generation, "Discarding stale save result");
                }
                SmallVec::new()
            },

            BuilderAction::SaveRejected { error } => {
                tracing::debug!(%error, "Save rejected before reaching the repository");
                SmallVec::new()
            },

            BuilderAction::ImportDocument { raw } => {
                match env.schema().parse(&raw) {
                    Ok(config) => {
                        tracing::info!(fields = config.fields.len(), "Imported registration form");
                        state.config = config;
                        state.selected_field_id = None;
                        state.import_error = None;
                        state.touch();
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Import rejected, keeping current form");
                        state.import_error = Some(error);
                    },
                }
                SmallVec::new()
            },

            BuilderAction::Teardown => {
                state.generation += 1;
                state.is_loading = false;
                state.is_saving = false;
                tracing::debug!(generation = state.generation, "Builder session torn down");
                SmallVec::new()
            },
        }
    }
}

/// Draw ids until one is not used by `config`
fn fresh_field_id(config: &FormConfig, env: &BuilderEnvironment) -> Option<FieldId> {
    (0..MAX_ID_ATTEMPTS)
        .map(|_| FieldId::from_uuid(env.ids().next_id()))
        .find(|id| config.field(id).is_none())
}

/// Whether `permutation` reorders `0..len` without loss or duplication
fn is_permutation(permutation: &[usize], len: usize) -> bool {
    if permutation.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    permutation.iter().all(|&index| {
        index < len && !std::mem::replace(&mut seen[index], true)
    })
}
