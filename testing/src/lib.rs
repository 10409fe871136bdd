//! # Composable Forms Testing
//!
//! Testing utilities for reducer-driven form sessions.
//!
//! This crate provides:
//! - Deterministic implementations of the environment traits
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Helpers that execute effects in-line and collect what they produce
//!
//! ## Example
//!
//! ```ignore
//! use composable_forms_testing::{test_clock, SequentialIds};
//!
//! let ids = Arc::new(SequentialIds::new());
//! let schema = FormSchemaStore::new(Arc::new(InMemoryConfigRepository::new()), ids.clone());
//! let env = RendererEnvironment::new(Arc::new(test_clock()), ids, schema, submissions);
//! ```

use chrono::{DateTime, Duration, Utc};
use composable_forms_core::environment::{Clock, IdGenerator};


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use uuid::Uuid;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use composable_forms_testing::mocks::FixedClock;
    /// use composable_forms_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// A clock fixed `by` later than this one
        #[must_use]
        pub fn advanced(self, by: Duration) -> Self {
            Self {
                time: self.time + by,
            }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Never in practice: the timestamp is a literal.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable identifiers: `00000000-0000-0000-0000-000000000001`, then `...02`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Start at 1
        #[must_use]
        pub const fn new() -> Self {
            Self::starting_at(1)
        }

        /// Start at an arbitrary counter value
        #[must_use]
        pub const fn starting_at(first: u64) -> Self {
            Self {
                next: AtomicU64::new(first),
            }
        }

        /// The id handed out for counter value `n`
        #[must_use]
        pub const fn id(n: u64) -> Uuid {
            Uuid::from_u128(n as u128)
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> Uuid {
            Self::id(self.next.fetch_add(1, Ordering::SeqCst))
        }
    }
}

/// Helpers for driving effects without a Store
pub mod helpers {
    use composable_forms_core::effect::Effect;
    use futures::future::BoxFuture;

    /// Execute effects in-line and collect every action they produce
    ///
    /// Produced actions are *not* reduced. Parallel children run
    /// concurrently, sequential children in order, and the collected
    /// actions follow completion order within each group.
    pub async fn collect_actions<A, I>(effects: I) -> Vec<A>
    where
        A: Send + 'static,
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = Vec::new();
        for effect in effects {
            actions.extend(run(effect).await);
        }
        actions
    }

    fn run<A: Send + 'static>(effect: Effect<A>) -> BoxFuture<'static, Vec<A>> {
        Box::pin(async move {
            match effect {
                Effect::None => Vec::new(),
                Effect::Future(fut) => fut.await.into_iter().collect(),
                Effect::Parallel(effects) => futures::future::join_all(effects.into_iter().map(run))
                    .await
                    .into_iter()
                    .flatten()
                    .collect(),
                Effect::Sequential(effects) => {
                    let mut out = Vec::new();
                    for effect in effects {
                        out.extend(run(effect).await);
                    }
                    out
                },
            }
        })
    }
}

// Re-export commonly used items
pub use helpers::collect_actions;
pub use mocks::{FixedClock, SequentialIds, test_clock};
