//! Integration tests for Store action broadcasting
//!
//! Covers request-response correlation over the action broadcast: concurrent
//! waiters keyed by request id, multi-step effect chains, and the guarantee
//! that a broadcast action has already been reduced into state.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use catalog_sync_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use catalog_sync_runtime::{Store, StoreConfig, StoreError};
use std::collections::HashMap;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum FetchAction {
    /// Start a fetch that settles after `delay_ms`
    Start { id: u64, delay_ms: u64, fail: bool },
    /// Intermediate progress report
    Progress { id: u64, step: u32 },
    /// Terminal: success
    Loaded { id: u64 },
    /// Terminal: failure
    Failed { id: u64, reason: String },
    /// Settle `id` at once, followed by `noise` unrelated progress reports
    Burst { id: u64, noise: u32 },
}

impl FetchAction {
    const fn settles(&self, request: u64) -> bool {
        matches!(self, Self::Loaded { id } | Self::Failed { id, .. } if *id == request)
    }
}

#[derive(Debug, Clone, Default)]
struct FetchState {
    in_flight: HashMap<u64, u32>,
    loaded: Vec<u64>,
    failed: Vec<u64>,
}

struct FetchEnvironment;

struct FetchReducer;

impl Reducer for FetchReducer {
    type State = FetchState;
    type Action = FetchAction;
    type Environment = FetchEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FetchAction::Start { id, delay_ms, fail } => {
                state.in_flight.insert(id, 0);
                smallvec![Effect::chain(vec![
                    Effect::future(async move { Some(FetchAction::Progress { id, step: 1 }) }),
                    Effect::future(async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        Some(if fail {
                            FetchAction::Failed { id, reason: format!("request {id} failed") }
                        } else {
                            FetchAction::Loaded { id }
                        })
                    }),
                ])]
            },
            FetchAction::Burst { id, noise } => {
                let mut effects = vec![Effect::future(async move { Some(FetchAction::Loaded { id }) })];
                effects.extend((1..=noise).map(|step| {
                    Effect::future(async move { Some(FetchAction::Progress { id: 1000, step }) })
                }));
                smallvec![Effect::merge(effects)]
            },
            FetchAction::Progress { id, step } => {
                state.in_flight.insert(id, step);
                smallvec![Effect::None]
            },
            FetchAction::Loaded { id } => {
                state.in_flight.remove(&id);
                state.loaded.push(id);
                smallvec![Effect::None]
            },
            FetchAction::Failed { id, .. } => {
                state.in_flight.remove(&id);
                state.failed.push(id);
                smallvec![Effect::None]
            },
        }
    }
}

type FetchStore = Store<FetchState, FetchAction, FetchEnvironment, FetchReducer>;

fn new_store() -> FetchStore {
    Store::new(FetchState::default(), FetchReducer, FetchEnvironment)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn terminal_action_is_reduced_before_waiter_wakes() {
    let store = new_store();

    let action = store
        .send_and_wait_for(
            FetchAction::Start { id: 7, delay_ms: 5, fail: false },
            |a| a.settles(7),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(action, FetchAction::Loaded { id: 7 });
    let (loaded, in_flight) = store.state(|s| (s.loaded.clone(), s.in_flight.len())).await;
    assert_eq!(loaded, vec![7]);
    assert_eq!(in_flight, 0);
}

#[tokio::test]
async fn concurrent_waiters_receive_their_own_outcome() {
    let store = new_store();

    // Later requests finish first
    let waiters: Vec<_> = (1..=5u64)
        .map(|id| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .send_and_wait_for(
                        FetchAction::Start { id, delay_ms: 60 - id * 10, fail: id % 2 == 0 },
                        move |a| a.settles(id),
                        Duration::from_secs(2),
                    )
                    .await
            })
        })
        .collect();

    for (index, waiter) in waiters.into_iter().enumerate() {
        let id = index as u64 + 1;
        let action = waiter.await.unwrap().unwrap();
        if id % 2 == 0 {
            assert!(matches!(action, FetchAction::Failed { id: got, .. } if got == id));
        } else {
            assert_eq!(action, FetchAction::Loaded { id });
        }
    }

    let (mut loaded, mut failed) = store.state(|s| (s.loaded.clone(), s.failed.clone())).await;
    loaded.sort_unstable();
    failed.sort_unstable();
    assert_eq!(loaded, vec![1, 3, 5]);
    assert_eq!(failed, vec![2, 4]);
}

#[tokio::test]
async fn observers_see_every_feedback_action_in_order() {
    let store = new_store();
    let mut rx = store.subscribe_actions();

    let mut handle = store
        .send(FetchAction::Start { id: 1, delay_ms: 0, fail: false })
        .await
        .unwrap();
    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

    assert_eq!(rx.recv().await.unwrap(), FetchAction::Progress { id: 1, step: 1 });
    assert_eq!(rx.recv().await.unwrap(), FetchAction::Loaded { id: 1 });
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn lagging_waiter_times_out_instead_of_hanging() {
    let store = Store::with_config(
        FetchState::default(),
        FetchReducer,
        FetchEnvironment,
        StoreConfig::default().with_broadcast_capacity(1),
    );

    let result = store
        .send_and_wait_for(
            FetchAction::Start { id: 3, delay_ms: 0, fail: false },
            |a| matches!(a, FetchAction::Failed { .. }),
            Duration::from_millis(100),
        )
        .await;

    assert_eq!(result, Err(StoreError::Timeout));
}

#[tokio::test]
async fn lagging_waiter_returns_once_state_shows_the_result() {
    let store = Store::with_config(
        FetchState::default(),
        FetchReducer,
        FetchEnvironment,
        StoreConfig::default().with_broadcast_capacity(1),
    );

    let started = std::time::Instant::now();
    let result = store
        .send_and_wait_until(
            FetchAction::Burst { id: 4, noise: 8 },
            |a| a.settles(4),
            |s| s.loaded.contains(&4),
            Duration::from_secs(5),
        )
        .await;

    assert!(
        matches!(result, Ok(FetchAction::Loaded { id: 4 }) | Err(StoreError::Lagged(_))),
        "unexpected result {result:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(store.state(|s| s.loaded.clone()).await, vec![4]);
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_effects() {
    let store = new_store();

    store
        .send(FetchAction::Start { id: 9, delay_ms: 30, fail: false })
        .await
        .unwrap();
    assert!(store.pending_effects() > 0);

    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert_eq!(store.pending_effects(), 0);
    assert_eq!(store.state(|s| s.loaded.clone()).await, vec![9]);
}

#[tokio::test]
async fn shutdown_reports_effects_still_running() {
    let store = new_store();

    store
        .send(FetchAction::Start { id: 1, delay_ms: 500, fail: false })
        .await
        .unwrap();

    let result = store.shutdown(Duration::from_millis(20)).await;
    assert!(matches!(result, Err(StoreError::ShutdownTimeout(n)) if n > 0));
}
