//! # vista-core - Core Domain Types
//!
//! Foundation crate for Vista Grande loading coordination. Provides the
//! loading-session snapshot, route keys, error handling and logging setup.
//!
//! This crate has **zero internal dependencies**.
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`LoadingSession`] - Overlay flags the presentation layer renders from
//! - [`LoadingPatch`] - Shallow partial update of a session
//! - [`OverlayKind`] - Full-screen splash or transition overlay
//! - [`TransitionPhase`] - Guard lifecycle (Idle, Showing, Cooldown)
//!
//! ### Routes (`route`)
//! - [`Route`] - Path plus query, used only as a change-detection key
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with recoverable classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! ```rust
//! use vista_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod route;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use route::Route;
pub use types::{LoadingPatch, LoadingSession, OverlayKind, TransitionPhase};
