//! # Catalog Sync Testing
//!
//! Testing utilities and helpers for the catalog-sync reducer architecture.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`assertions`]: effect assertions
//! - [`FixedClock`]: deterministic time
//! - [`eventually`]: async polling for conditions driven by spawned effects
//!
//! ## Example
//!
//! ```ignore
//! use catalog_sync_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(CatalogReducer::new())
//!     .with_env(test_environment())
//!     .given_state(CatalogState::default())
//!     .when_action(CatalogAction::AttachImage(image))
//!     .then_state(|state| assert_eq!(state.drafts.len(), 1))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use catalog_sync_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_sync_testing::mocks::FixedClock;
    /// use catalog_sync_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

/// Async helpers for tests that observe state changed by spawned effects
pub mod helpers {
    use std::future::Future;
    use std::time::Duration;

    /// Poll `condition` until it returns `true` or `timeout` elapses
    ///
    /// Returns whether the condition was met. Yields to the runtime between
    /// polls so spawned effects can make progress.
    ///
    /// ```ignore
    /// assert!(eventually(Duration::from_secs(1), || async {
    ///     engine.state(|s| s.loading()).await
    /// }).await);
    /// ```
    pub async fn eventually<F, Fut>(timeout: Duration, mut condition: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if condition().await {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }
}

pub use helpers::eventually;
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
