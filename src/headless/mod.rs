//! Headless mode - NDJSON event output for scripted runs
//!
//! Stands in for the presentation layer: every store change is written to
//! stdout as one JSON object per line.
//!
//! # Example Output
//!
//! ```json
//! {"event":"started","session":{"isFullScreenLoading":false,"isTransitionLoading":false,"hasCompletedInitialLoad":false},"timestamp":1704700001000}
//! {"event":"overlay_changed","overlay":"full_screen","visible":true,"timestamp":1704700001001}
//! {"event":"navigation","route":"/listings","outcome":"triggered","timestamp":1704700002000}
//! ```

pub mod command;
pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use vista_core::{LoadingSession, OverlayKind, TransitionPhase};
use vista_loader::NavigationOutcome;

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Driver ready; carries the state read at startup
    Started {
        session: LoadingSession,
        timestamp: i64,
    },

    /// Store written
    StateChanged {
        session: LoadingSession,
        phase: TransitionPhase,
        timestamp: i64,
    },

    /// One overlay appeared or disappeared
    OverlayChanged {
        overlay: OverlayKind,
        visible: bool,
        timestamp: i64,
    },

    /// Route change handled by the navigation observer
    Navigation {
        route: String,
        outcome: NavigationOutcome,
        timestamp: i64,
    },

    /// A wrapped operation settled
    OperationFinished {
        ok: bool,
        elapsed_ms: u64,
        error: Option<String>,
        timestamp: i64,
    },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // NDJSON: one object per line, flushed immediately
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn started(session: LoadingSession) -> Self {
        Self::Started {
            session,
            timestamp: Self::now(),
        }
    }

    pub fn state_changed(session: LoadingSession, phase: TransitionPhase) -> Self {
        Self::StateChanged {
            session,
            phase,
            timestamp: Self::now(),
        }
    }

    pub fn overlay_changed(overlay: OverlayKind, visible: bool) -> Self {
        Self::OverlayChanged {
            overlay,
            visible,
            timestamp: Self::now(),
        }
    }

    pub fn navigation(route: String, outcome: NavigationOutcome) -> Self {
        Self::Navigation {
            route,
            outcome,
            timestamp: Self::now(),
        }
    }

    pub fn operation_finished(elapsed_ms: u64, error: Option<String>) -> Self {
        Self::OperationFinished {
            ok: error.is_none(),
            elapsed_ms,
            error,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }

    /// Overlay transitions between two snapshots
    pub fn overlay_changes(before: &LoadingSession, after: &LoadingSession) -> Vec<Self> {
        [OverlayKind::FullScreen, OverlayKind::Transition]
            .into_iter()
            .filter(|kind| before.is_visible(*kind) != after.is_visible(*kind))
            .map(|kind| Self::overlay_changed(kind, after.is_visible(kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_tagged() {
        let json = serde_json::to_value(HeadlessEvent::navigation(
            "/listings".to_string(),
            NavigationOutcome::Debounced,
        ))
        .unwrap();
        assert_eq!(json["event"], "navigation");
        assert_eq!(json["outcome"], "debounced");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_state_changed_shape() {
        let session = LoadingSession {
            is_transition_loading: true,
            ..Default::default()
        };
        let json =
            serde_json::to_value(HeadlessEvent::state_changed(session, TransitionPhase::Showing))
                .unwrap();
        assert_eq!(json["event"], "state_changed");
        assert_eq!(json["phase"], "showing");
        assert_eq!(json["session"]["isTransitionLoading"], true);
    }

    #[test]
    fn test_overlay_changes_diff() {
        let before = LoadingSession::default();
        let after = LoadingSession {
            is_full_screen_loading: true,
            ..Default::default()
        };

        let changes = HeadlessEvent::overlay_changes(&before, &after);
        assert_eq!(changes.len(), 1);
        assert!(matches!(
            changes[0],
            HeadlessEvent::OverlayChanged {
                overlay: OverlayKind::FullScreen,
                visible: true,
                ..
            }
        ));
        assert!(HeadlessEvent::overlay_changes(&after, &after).is_empty());
    }

    #[test]
    fn test_operation_finished_ok_flag() {
        let ok = HeadlessEvent::operation_finished(1200, None);
        assert!(matches!(ok, HeadlessEvent::OperationFinished { ok: true, .. }));

        let failed = HeadlessEvent::operation_finished(1200, Some("x".to_string()));
        assert!(matches!(
            failed,
            HeadlessEvent::OperationFinished { ok: false, .. }
        ));
    }
}
