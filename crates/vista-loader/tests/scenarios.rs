//! End-to-end timing scenarios for the loader, run on virtual time.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep, Instant};
use tokio_test::{assert_err, assert_ok};
use vista_loader::{
    LoaderController, LoaderTiming, LoadingSession, LoadingStore, MemorySessionStorage,
    NavigationObserver, Route, SessionStorage, Settings, Subscription, TransitionPhase,
    DEFAULT_SESSION_KEY,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn controller() -> LoaderController {
    LoaderController::new(LoadingStore::default(), LoaderTiming::default())
}

/// Records (elapsed ms, is_transition_loading) on every store write.
fn record_transitions(
    controller: &LoaderController,
) -> (Arc<Mutex<Vec<(u128, bool)>>>, Subscription) {
    let start = Instant::now();
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let sub = controller.store().subscribe(move |s: &LoadingSession| {
        let elapsed = start.elapsed().as_millis();
        sink.lock().push((elapsed, s.is_transition_loading));
    });
    (log, sub)
}

#[tokio::test(start_paused = true)]
async fn scenario_a_guard_released_after_settle() {
    let loader = controller();

    assert!(loader.show_loader(ms(1000)));
    assert!(loader.session().is_transition_loading);

    sleep(ms(1001)).await;
    assert!(!loader.session().is_transition_loading);

    sleep(ms(300)).await;
    assert!(loader.show_loader(ms(1000)));
    assert!(loader.session().is_transition_loading);
}

#[tokio::test(start_paused = true)]
async fn scenario_b_second_call_does_not_extend() {
    let loader = controller();
    let (log, _sub) = record_transitions(&loader);

    loader.show_loader(ms(1000));
    sleep(ms(200)).await;
    assert!(!loader.show_loader(ms(1000)));

    sleep(ms(799)).await;
    assert!(loader.session().is_transition_loading);
    sleep(ms(2)).await;
    assert!(!loader.session().is_transition_loading);

    assert_eq!(*log.lock(), vec![(0, true), (1000, false)]);
}

#[tokio::test(start_paused = true)]
async fn scenario_c_slow_operation_keeps_overlay() {
    let loader = controller();
    let (log, _sub) = record_transitions(&loader);

    let task = loader.clone();
    let handle = tokio::spawn(async move {
        task.show_loader_for_operation(
            async {
                sleep(ms(3000)).await;
                Ok::<_, String>("listings")
            },
            ms(1000),
        )
        .await
    });

    sleep(ms(2999)).await;
    assert!(loader.session().is_transition_loading);

    let result = handle.await.unwrap();
    assert_eq!(assert_ok!(result), "listings");
    assert!(!loader.session().is_transition_loading);
    assert_eq!(*log.lock(), vec![(0, true), (3000, false)]);
}

#[tokio::test(start_paused = true)]
async fn scenario_d_failed_operation_hides_after_minimum() {
    let loader = controller();
    let (log, _sub) = record_transitions(&loader);

    let result = loader
        .show_loader_for_operation(async { Err::<(), _>("x".to_string()) }, ms(1000))
        .await;

    assert_eq!(assert_err!(result), "x");
    assert!(!loader.session().is_transition_loading);
    assert_eq!(*log.lock(), vec![(0, true), (1000, false)]);

    sleep(ms(301)).await;
    assert_eq!(loader.transition_phase(), TransitionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn guard_exclusivity_across_showing_and_cooldown() {
    let loader = controller();
    let (log, _sub) = record_transitions(&loader);

    loader.show_loader(ms(500));
    for offset in [100, 200, 250, 100] {
        sleep(ms(offset)).await;
        assert!(!loader.show_loader(ms(5000)), "accepted while guarded");
    }
    // t = 650: hidden at 500, guard held until 800
    assert_eq!(loader.transition_phase(), TransitionPhase::Cooldown);

    sleep(ms(151)).await;
    assert!(loader.show_loader(ms(500)));
    assert_eq!(*log.lock(), vec![(0, true), (500, false), (801, true)]);
}

#[tokio::test(start_paused = true)]
async fn minimum_duration_respects_fast_and_slow_operations() {
    let cases = [(0u64, 800u64, 800u128), (400, 800, 800), (1200, 800, 1200)];
    for (latency, min, expected) in cases {
        let loader = controller();
        let (log, _sub) = record_transitions(&loader);

        let result = loader
            .show_loader_for_operation(
                async move {
                    sleep(ms(latency)).await;
                    Ok::<_, ()>(latency)
                },
                ms(min),
            )
            .await;

        assert_eq!(result, Ok(latency));
        assert_eq!(*log.lock(), vec![(0, true), (expected, false)]);
    }
}

#[tokio::test(start_paused = true)]
async fn idempotent_hide_leaves_state_alone() {
    let loader = controller();
    let before = loader.session();

    loader.hide_loader();
    loader.hide_full_screen_loader();

    assert_eq!(loader.session(), before);
    assert_eq!(loader.transition_phase(), TransitionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn splash_not_repeated_after_restart() {
    let storage = MemorySessionStorage::new();
    let settings = Settings::default();

    let first = LoaderController::open(Arc::new(storage.clone()), &settings);
    assert!(first.show_initial_splash());
    sleep(ms(4501)).await;
    assert!(first.session().has_completed_initial_load);
    drop(first);

    // Same session store, new process
    let restarted = LoaderController::open(Arc::new(storage.clone()), &settings);
    assert!(restarted.session().has_completed_initial_load);
    assert!(!restarted.show_initial_splash());
    assert!(!restarted.session().is_full_screen_loading);

    // Session ended
    storage.clear();
    let fresh = LoaderController::open(Arc::new(storage), &settings);
    assert!(fresh.show_initial_splash());
}

#[tokio::test(start_paused = true)]
async fn custom_session_key_is_used() {
    let storage = MemorySessionStorage::new();
    let mut settings = Settings::default();
    settings.session.storage_key = "staging-loaded".to_string();
    settings.session.splash_duration_ms = 100;

    let loader = LoaderController::open(Arc::new(storage.clone()), &settings);
    loader.show_initial_splash();
    sleep(ms(101)).await;

    assert!(storage.get("staging-loaded").unwrap().is_some());
    assert!(storage.get(DEFAULT_SESSION_KEY).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn navigation_flow_with_debounce() {
    let loader = controller();
    let (log, _sub) = record_transitions(&loader);
    let observer = NavigationObserver::new(loader.clone());

    observer.on_route_change(&Route::parse("/"));
    sleep(ms(100)).await;
    observer.on_route_change(&Route::parse("/listings"));
    sleep(ms(500)).await;
    observer.on_route_change(&Route::parse("/listings/42"));
    sleep(ms(2000)).await;
    observer.on_route_change(&Route::parse("/contact"));

    assert_eq!(*log.lock(), vec![(100, true), (1600, false), (2600, true)]);
}
