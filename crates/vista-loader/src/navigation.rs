//! Navigation Observer — drives the transition loader from route changes.
//!
//! The first route seen after start is the initial render and never shows a
//! loader. Each triggered navigation opens a debounce window; further route
//! changes inside it are absorbed. When the window closes, the overlay this
//! navigation started is hidden if it is somehow still up; an overlay started
//! by anyone else after the navigation cycle settled is left alone. Teardown
//! hides unconditionally so no overlay outlives the page.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use vista_core::prelude::*;
use vista_core::Route;

use crate::config::LoaderTiming;
use crate::controller::LoaderController;
use crate::schedule::ScheduledTask;

/// What a route change led to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// First route after start
    Initial,
    /// Same change key as the previous route
    Unchanged,
    /// Debounce window still open
    Debounced,
    /// Loader shown
    Triggered,
    /// Window opened, but the controller guard refused the loader
    Suppressed,
    /// Observer already torn down
    Detached,
}

#[derive(Debug, Default)]
struct ObserverState {
    last_key: Option<String>,
    window: Option<ScheduledTask>,
    window_generation: u64,
    /// Controller cycle started by the navigation that opened the window
    cycle: Option<u64>,
    torn_down: bool,
}

/// Watches route changes for one mounted page tree.
#[derive(Debug)]
pub struct NavigationObserver {
    controller: LoaderController,
    debounce: Duration,
    loader_duration: Duration,
    state: Arc<Mutex<ObserverState>>,
}

impl NavigationObserver {
    pub fn new(controller: LoaderController) -> Self {
        let timing = *controller.timing();
        Self::with_timing(controller, &timing)
    }

    pub fn with_timing(controller: LoaderController, timing: &LoaderTiming) -> Self {
        Self {
            controller,
            debounce: timing.navigation_debounce,
            loader_duration: timing.navigation_loader_duration,
            state: Arc::new(Mutex::new(ObserverState::default())),
        }
    }

    pub fn is_debouncing(&self) -> bool {
        self.state.lock().window.is_some()
    }

    pub fn on_route_change(&self, route: &Route) -> NavigationOutcome {
        let key = route.change_key();
        let mut state = self.state.lock();
        if state.torn_down {
            return NavigationOutcome::Detached;
        }

        match state.last_key.replace(key.clone()) {
            None => {
                debug!(route = %key, "Initial route, no loader");
                return NavigationOutcome::Initial;
            }
            Some(previous) if previous == key => return NavigationOutcome::Unchanged,
            Some(_) => {}
        }

        if state.window.is_some() {
            debug!(route = %key, "Navigation inside debounce window ignored");
            return NavigationOutcome::Debounced;
        }

        state.window_generation += 1;
        state.cycle = None;
        let generation = state.window_generation;
        let shared = Arc::clone(&self.state);
        let controller = self.controller.clone();
        state.window = Some(ScheduledTask::after(self.debounce, move || {
            close_window(&shared, generation, &controller);
        }));
        drop(state);

        match self.controller.start_transition(self.loader_duration) {
            Some(cycle) => {
                let mut state = self.state.lock();
                if state.window_generation == generation {
                    state.cycle = Some(cycle);
                }
                debug!(route = %key, cycle, "Navigation loader shown");
                NavigationOutcome::Triggered
            }
            None => NavigationOutcome::Suppressed,
        }
    }

    /// Stop observing: close any open window and hide the transition overlay.
    pub fn teardown(&self) {
        {
            let mut state = self.state.lock();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            if let Some(window) = state.window.take() {
                window.cancel();
            }
        }
        self.controller.hide_loader();
        debug!("Navigation observer torn down");
    }
}

impl Drop for NavigationObserver {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn close_window(state: &Mutex<ObserverState>, generation: u64, controller: &LoaderController) {
    let cycle = {
        let mut state = state.lock();
        if state.window_generation != generation {
            return;
        }
        match state.window.take() {
            Some(window) => window.detach(),
            None => return,
        }
        state.cycle.take()
    };
    trace!(generation, "Debounce window closed");
    if let Some(cycle) = cycle {
        controller.hide_loader_cycle(cycle);
    }
}
