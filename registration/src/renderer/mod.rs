//! Runtime renderer: one end user filling in one event's form.
//!
//! ```text
//! Idle ──Load──► Loading ──┬─► Unavailable      (not configured, disabled, load failed)
//!                          ├─► DeadlinePassed   (deadline < now)
//!                          └─► Editing ◄──────────────┐
//!                                │ Submit (valid)     │ failure (banner)
//!                                │ SaveDraft          │
//!                                ▼                    │
//!                            Submitting ──────────────┤
//!                                ├─► AwaitingPayment  │
//!                                └─► Submitted        │
//! ```
//!
//! `Teardown` bumps the session generation; results tagged with an older
//! generation are dropped.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod state;
pub mod store;
#[cfg(test)]
mod tests;

pub use actions::RendererAction;
pub use environment::RendererEnvironment;
pub use reducer::RendererReducer;
pub use state::{Phase, RendererState, UnavailableReason};
pub use store::RendererStore;
