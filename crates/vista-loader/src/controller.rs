//! Loader Controller — imperative show/hide commands over the store.
//!
//! The transition overlay is protected by a guard that walks
//! `Idle -> Showing -> Cooldown -> Idle`; `show_loader` is only honoured from
//! `Idle`, so hide timers never stack. The full-screen overlay has its own
//! timer and ignores the guard.
//!
//! Every deferred hide is a [`ScheduledTask`] stamped with a generation
//! number. An explicit hide cancels the pending task, and a task whose
//! generation is stale does nothing when it fires.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::ReentrantMutex;
use vista_core::prelude::*;
use vista_core::{LoadingPatch, LoadingSession, TransitionPhase};

use crate::config::{LoaderTiming, Settings};
use crate::persistence::{
    mark_initial_load_completed, MemorySessionStorage, SessionStorage, DEFAULT_SESSION_KEY,
};
use crate::schedule::ScheduledTask;
use crate::store::LoadingStore;

#[derive(Debug, Default)]
struct GuardState {
    phase: TransitionPhase,
    /// Bumped on every transition state change; stamps pending timers
    generation: u64,
    /// Counts accepted `show_loader` calls; identifies the running cycle
    cycle: u64,
    hide_task: Option<ScheduledTask>,
    release_task: Option<ScheduledTask>,

    full_screen_generation: u64,
    full_screen_task: Option<ScheduledTask>,
    /// The running full-screen overlay is the initial splash
    splash_pending: bool,
}

struct ControllerInner {
    store: LoadingStore,
    timing: LoaderTiming,
    storage: Arc<dyn SessionStorage>,
    session_key: String,
    // Reentrant so a store subscriber may call back into the controller;
    // the RefCell borrow is always released before the store is written.
    guard: ReentrantMutex<RefCell<GuardState>>,
}

/// Owns the guard and timers for both overlays. Cheap to clone; clones
/// drive the same state.
#[derive(Clone)]
pub struct LoaderController {
    inner: Arc<ControllerInner>,
}

impl fmt::Debug for LoaderController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderController")
            .field("session", &self.inner.store.read())
            .field("phase", &self.transition_phase())
            .field("timing", &self.inner.timing)
            .finish()
    }
}

impl LoaderController {
    /// Controller over an existing store with a throwaway in-memory session.
    pub fn new(store: LoadingStore, timing: LoaderTiming) -> Self {
        Self::with_storage(
            store,
            timing,
            Arc::new(MemorySessionStorage::new()),
            DEFAULT_SESSION_KEY,
        )
    }

    pub fn with_storage(
        store: LoadingStore,
        timing: LoaderTiming,
        storage: Arc<dyn SessionStorage>,
        session_key: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                store,
                timing,
                storage,
                session_key: session_key.into(),
                guard: ReentrantMutex::new(RefCell::new(GuardState::default())),
            }),
        }
    }

    /// Process-start entry point: opens the store from session storage and
    /// takes timings from settings.
    pub fn open(storage: Arc<dyn SessionStorage>, settings: &Settings) -> Self {
        let key = settings.session.storage_key.clone();
        let store = LoadingStore::open(storage.as_ref(), &key);
        Self::with_storage(store, settings.timing(), storage, key)
    }

    pub fn store(&self) -> &LoadingStore {
        &self.inner.store
    }

    pub fn timing(&self) -> &LoaderTiming {
        &self.inner.timing
    }

    pub fn session(&self) -> LoadingSession {
        self.inner.store.read()
    }

    pub fn transition_phase(&self) -> TransitionPhase {
        self.inner.guard.lock().borrow().phase
    }

    // ─────────────────────────────────────────────────────────────
    // Transition overlay
    // ─────────────────────────────────────────────────────────────

    /// Show the transition overlay for `duration`, or until [`hide_loader`]
    /// when `duration` is zero.
    ///
    /// Returns `false` without touching anything while the guard is held.
    ///
    /// [`hide_loader`]: Self::hide_loader
    pub fn show_loader(&self, duration: Duration) -> bool {
        self.start_transition(duration).is_some()
    }

    /// Like [`show_loader`](Self::show_loader), but returns the cycle number
    /// of the overlay it started so the caller can later end only that cycle
    /// with [`hide_loader_cycle`](Self::hide_loader_cycle).
    pub fn start_transition(&self, duration: Duration) -> Option<u64> {
        let lock = self.inner.guard.lock();
        let cycle = {
            let mut state = lock.borrow_mut();
            if state.phase.is_guarded() {
                debug!(phase = %state.phase, "show_loader ignored, guard held");
                return None;
            }
            state.phase = TransitionPhase::Showing;
            state.generation += 1;
            state.cycle += 1;
            let generation = state.generation;

            state.hide_task = if duration.is_zero() {
                None
            } else {
                let controller = self.clone();
                Some(ScheduledTask::after(duration, move || {
                    controller.conclude_transition(Some(generation));
                }))
            };
            debug!(?duration, generation, "Transition overlay shown");
            state.cycle
        };
        self.inner
            .store
            .write(LoadingPatch::new().transition(true));
        Some(cycle)
    }

    /// [`show_loader`](Self::show_loader) with the configured duration
    pub fn show_default_loader(&self) -> bool {
        self.show_loader(self.inner.timing.transition_duration)
    }

    /// Hide the transition overlay now and release the guard after the
    /// settle delay. Safe to call when nothing is showing.
    pub fn hide_loader(&self) {
        self.conclude_transition(None);
    }

    /// Hide the transition overlay only if `cycle` is still showing.
    ///
    /// A later cycle, started by someone else after this one settled, is
    /// left alone.
    pub fn hide_loader_cycle(&self, cycle: u64) {
        let lock = self.inner.guard.lock();
        {
            let state = lock.borrow();
            if state.cycle != cycle || state.phase != TransitionPhase::Showing {
                trace!(cycle, "Transition cycle already over");
                return;
            }
        }
        self.conclude_transition(None);
    }

    /// Shared by the hide timer (`Some(generation)`) and explicit hides.
    fn conclude_transition(&self, generation: Option<u64>) {
        let lock = self.inner.guard.lock();
        {
            let mut state = lock.borrow_mut();
            match generation {
                Some(generation) => {
                    if generation != state.generation || state.phase != TransitionPhase::Showing {
                        trace!(generation, "Stale transition hide timer ignored");
                        return;
                    }
                    if let Some(task) = state.hide_task.take() {
                        task.detach();
                    }
                }
                None => {
                    if let Some(task) = state.hide_task.take() {
                        task.cancel();
                    }
                }
            }

            if state.phase == TransitionPhase::Showing {
                state.phase = TransitionPhase::Cooldown;
                state.generation += 1;
                let generation = state.generation;
                let controller = self.clone();
                state.release_task = Some(ScheduledTask::after(
                    self.inner.timing.settle_delay,
                    move || controller.release_guard(generation),
                ));
                debug!(generation, "Transition overlay hidden, settling");
            }
        }

        if self.inner.store.read().is_transition_loading {
            self.inner
                .store
                .write(LoadingPatch::new().transition(false));
        }
    }

    fn release_guard(&self, generation: u64) {
        let lock = self.inner.guard.lock();
        let mut state = lock.borrow_mut();
        if generation != state.generation || state.phase != TransitionPhase::Cooldown {
            return;
        }
        if let Some(task) = state.release_task.take() {
            task.detach();
        }
        state.phase = TransitionPhase::Idle;
        debug!("Transition guard released");
    }

    /// Keep the transition overlay up while `operation` runs, and for at
    /// least `min_duration`.
    ///
    /// Both run concurrently; once both are done the overlay is hidden and
    /// the operation's result is returned untouched, `Err` included. The
    /// overlay is also hidden if this future is dropped early.
    pub async fn show_loader_for_operation<F, T, E>(
        &self,
        operation: F,
        min_duration: Duration,
    ) -> std::result::Result<T, E>
    where
        F: Future<Output = std::result::Result<T, E>>,
    {
        if !self.show_loader(Duration::ZERO) {
            debug!("Operation joined an overlay that is already guarded");
        }
        let _hide = HideOnDrop(self);

        let (result, ()) = tokio::join!(operation, tokio::time::sleep(min_duration));
        if result.is_err() {
            debug!("Wrapped operation failed, hiding overlay and passing the error on");
        }
        result
    }

    /// [`show_loader_for_operation`](Self::show_loader_for_operation) with the
    /// configured minimum duration
    pub async fn run_with_loader<F, T, E>(&self, operation: F) -> std::result::Result<T, E>
    where
        F: Future<Output = std::result::Result<T, E>>,
    {
        let min = self.inner.timing.operation_min_duration;
        self.show_loader_for_operation(operation, min).await
    }

    // ─────────────────────────────────────────────────────────────
    // Full-screen overlay
    // ─────────────────────────────────────────────────────────────

    /// Show the full-screen overlay for `duration` (zero: until hidden).
    ///
    /// Independent of the transition guard. A second call replaces the
    /// pending hide timer of the first.
    pub fn show_full_screen_loader(&self, duration: Duration) {
        let lock = self.inner.guard.lock();
        {
            let mut state = lock.borrow_mut();
            state.full_screen_generation += 1;
            let generation = state.full_screen_generation;

            state.full_screen_task = if duration.is_zero() {
                None
            } else {
                let controller = self.clone();
                Some(ScheduledTask::after(duration, move || {
                    controller.conclude_full_screen(Some(generation));
                }))
            };
            debug!(?duration, generation, "Full-screen overlay shown");
        }
        self.inner
            .store
            .write(LoadingPatch::new().full_screen(true));
    }

    pub fn show_default_full_screen_loader(&self) {
        self.show_full_screen_loader(self.inner.timing.full_screen_duration);
    }

    pub fn hide_full_screen_loader(&self) {
        self.conclude_full_screen(None);
    }

    fn conclude_full_screen(&self, generation: Option<u64>) {
        let lock = self.inner.guard.lock();
        let splash_finished = {
            let mut state = lock.borrow_mut();
            match generation {
                Some(generation) => {
                    if generation != state.full_screen_generation {
                        return;
                    }
                    if let Some(task) = state.full_screen_task.take() {
                        task.detach();
                    }
                }
                None => {
                    if let Some(task) = state.full_screen_task.take() {
                        task.cancel();
                    }
                }
            }
            std::mem::take(&mut state.splash_pending)
        };

        if self.inner.store.read().is_full_screen_loading {
            self.inner
                .store
                .write(LoadingPatch::new().full_screen(false));
            debug!("Full-screen overlay hidden");
        }

        if splash_finished {
            self.complete_initial_load();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Initial splash
    // ─────────────────────────────────────────────────────────────

    /// Play the one-time splash unless this session has already seen it.
    ///
    /// When the splash hides (timer or explicit hide) the session is marked
    /// complete in the store and in session storage.
    pub fn show_initial_splash(&self) -> bool {
        if self.inner.store.read().has_completed_initial_load {
            debug!("Initial splash already played this session");
            return false;
        }

        let lock = self.inner.guard.lock();
        {
            let mut state = lock.borrow_mut();
            if state.splash_pending {
                return false;
            }
            state.splash_pending = true;
        }
        info!("Showing initial splash");
        self.show_full_screen_loader(self.inner.timing.splash_duration);
        true
    }

    fn complete_initial_load(&self) {
        mark_initial_load_completed(self.inner.storage.as_ref(), &self.inner.session_key);
        self.inner
            .store
            .write(LoadingPatch::new().initial_load_completed(true));
        info!("Initial load completed for this session");
    }
}

/// Hides the transition overlay when dropped, covering both normal
/// completion and cancellation of the wrapped operation.
struct HideOnDrop<'a>(&'a LoaderController);

impl Drop for HideOnDrop<'_> {
    fn drop(&mut self) {
        self.0.hide_loader();
    }
}
