//! vista-loader - Loading overlay coordination for Vista Grande
//!
//! Three cooperating parts:
//! - [`LoadingStore`] - observable overlay flags the presentation layer renders
//! - [`LoaderController`] - show/hide commands with the transition guard
//! - [`NavigationObserver`] - shows the transition loader on route changes
//!
//! plus injected session persistence ([`SessionStorage`]) and TOML settings.
//!
//! Timers are tokio tasks, so controller and observer methods must be called
//! from within a tokio runtime.

pub mod config;
pub mod controller;
pub mod navigation;
pub mod persistence;
pub mod schedule;
pub mod store;

// Re-export primary types
pub use config::{load_settings, LoaderTiming, Settings};
pub use controller::LoaderController;
pub use navigation::{NavigationObserver, NavigationOutcome};
pub use persistence::{
    FileSessionStorage, MemorySessionStorage, SessionStorage, DEFAULT_SESSION_KEY,
};
pub use schedule::ScheduledTask;
pub use store::{LoadingStore, Subscription};

// Re-export core types used in the public API
pub use vista_core::{LoadingPatch, LoadingSession, OverlayKind, Route, TransitionPhase};
