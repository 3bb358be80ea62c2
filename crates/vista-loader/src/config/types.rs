//! Configuration types
//!
//! Defines:
//! - `Settings` - Loader settings as stored in `config.toml`
//! - `LoaderTiming` - The same values as `Duration`s, consumed at runtime

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::persistence::DEFAULT_SESSION_KEY;

/// Loader settings (.vista-grande/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub transition: TransitionSettings,

    #[serde(default)]
    pub full_screen: FullScreenSettings,

    #[serde(default)]
    pub operation: OperationSettings,

    #[serde(default)]
    pub navigation: NavigationSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl Settings {
    pub fn timing(&self) -> LoaderTiming {
        LoaderTiming {
            transition_duration: Duration::from_millis(self.transition.duration_ms),
            settle_delay: Duration::from_millis(self.transition.settle_ms),
            full_screen_duration: Duration::from_millis(self.full_screen.duration_ms),
            operation_min_duration: Duration::from_millis(self.operation.min_duration_ms),
            navigation_debounce: Duration::from_millis(self.navigation.debounce_ms),
            navigation_loader_duration: Duration::from_millis(self.navigation.loader_duration_ms),
            splash_duration: Duration::from_millis(self.session.splash_duration_ms),
        }
    }
}

/// Transition overlay settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransitionSettings {
    /// Default visible time for `show_loader`; 0 keeps it up until hidden
    #[serde(default = "default_transition_duration")]
    pub duration_ms: u64,

    /// Wait after hiding before the guard is released
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration_ms: default_transition_duration(),
            settle_ms: default_settle(),
        }
    }
}

fn default_transition_duration() -> u64 {
    1500
}

fn default_settle() -> u64 {
    300
}

/// Full-screen overlay settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FullScreenSettings {
    #[serde(default = "default_full_screen_duration")]
    pub duration_ms: u64,
}

impl Default for FullScreenSettings {
    fn default() -> Self {
        Self {
            duration_ms: default_full_screen_duration(),
        }
    }
}

fn default_full_screen_duration() -> u64 {
    4500
}

/// Wrapped-operation settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OperationSettings {
    #[serde(default = "default_min_duration")]
    pub min_duration_ms: u64,
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            min_duration_ms: default_min_duration(),
        }
    }
}

fn default_min_duration() -> u64 {
    1200
}

/// Navigation observer settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NavigationSettings {
    /// Window after a triggered navigation in which further changes are ignored
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    #[serde(default = "default_transition_duration")]
    pub loader_duration_ms: u64,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            loader_duration_ms: default_transition_duration(),
        }
    }
}

fn default_debounce() -> u64 {
    2000
}

/// Session persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionSettings {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default = "default_full_screen_duration")]
    pub splash_duration_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            splash_duration_ms: default_full_screen_duration(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

/// Runtime timing values for the controller and navigation observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderTiming {
    pub transition_duration: Duration,
    pub settle_delay: Duration,
    pub full_screen_duration: Duration,
    pub operation_min_duration: Duration,
    pub navigation_debounce: Duration,
    pub navigation_loader_duration: Duration,
    pub splash_duration: Duration,
}

impl Default for LoaderTiming {
    fn default() -> Self {
        Settings::default().timing()
    }
}
