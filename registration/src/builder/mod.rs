//! Form builder: the operator's editing session over one event's schema.
//!
//! ```text
//! LoadConfig ──► repository.load ──► ConfigLoaded
//!    │
//! AddField / UpdateField / RemoveField / ReorderFields / UpdateSettings
//!    │            (each marks the session dirty and bumps the revision)
//! ImportDocument  (full replacement, parsed in place)
//!    │
//! Save ──► label check ──► repository.save ──► SaveCompleted
//! ```
//!
//! Mutations target fields by id. [`FieldTarget::Index`] is resolved against
//! the current sequence when the action is reduced.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod state;
pub mod store;

pub use actions::{BuilderAction, FieldTarget};
pub use environment::BuilderEnvironment;
pub use reducer::BuilderReducer;
pub use state::BuilderState;
pub use store::BuilderStore;
