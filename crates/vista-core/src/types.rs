//! Loading-session domain types

use serde::{Deserialize, Serialize};

/// Snapshot of the overlay state the presentation layer renders from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingSession {
    /// Full splash overlay is active
    pub is_full_screen_loading: bool,

    /// Lightweight page-transition overlay is active
    pub is_transition_loading: bool,

    /// The one-time splash already played this session
    pub has_completed_initial_load: bool,
}

impl LoadingSession {
    /// Fresh process state: transient flags off, splash flag as persisted
    pub fn starting(has_completed_initial_load: bool) -> Self {
        Self {
            has_completed_initial_load,
            ..Self::default()
        }
    }

    pub fn is_any_overlay_visible(&self) -> bool {
        self.is_full_screen_loading || self.is_transition_loading
    }

    /// Shallow-merge a patch into this snapshot
    pub fn apply(&mut self, patch: LoadingPatch) {
        if let Some(v) = patch.is_full_screen_loading {
            self.is_full_screen_loading = v;
        }
        if let Some(v) = patch.is_transition_loading {
            self.is_transition_loading = v;
        }
        if let Some(v) = patch.has_completed_initial_load {
            self.has_completed_initial_load = v;
        }
    }

    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        match kind {
            OverlayKind::FullScreen => self.is_full_screen_loading,
            OverlayKind::Transition => self.is_transition_loading,
        }
    }
}

/// Partial update for [`LoadingSession`]; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingPatch {
    pub is_full_screen_loading: Option<bool>,
    pub is_transition_loading: Option<bool>,
    pub has_completed_initial_load: Option<bool>,
}

impl LoadingPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full_screen(mut self, visible: bool) -> Self {
        self.is_full_screen_loading = Some(visible);
        self
    }

    pub fn transition(mut self, visible: bool) -> Self {
        self.is_transition_loading = Some(visible);
        self
    }

    pub fn initial_load_completed(mut self, completed: bool) -> Self {
        self.has_completed_initial_load = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Which overlay a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    FullScreen,
    Transition,
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayKind::FullScreen => write!(f, "full-screen"),
            OverlayKind::Transition => write!(f, "transition"),
        }
    }
}

/// Lifecycle of the transition overlay's guard.
///
/// `Idle -> Showing -> Cooldown -> Idle`. `show_loader` only takes effect
/// from `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    #[default]
    Idle,
    /// Overlay visible, guard held
    Showing,
    /// Overlay hidden, guard still held until the settle delay elapses
    Cooldown,
}

impl TransitionPhase {
    /// Whether the guard is currently held
    pub fn is_guarded(&self) -> bool {
        !matches!(self, TransitionPhase::Idle)
    }
}

impl std::fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionPhase::Idle => write!(f, "idle"),
            TransitionPhase::Showing => write!(f, "showing"),
            TransitionPhase::Cooldown => write!(f, "cooldown"),
        }
    }
}
