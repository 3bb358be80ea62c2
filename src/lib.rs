//! Vista Grande loader
//!
//! Headless driver for the loading-overlay coordinator. All coordination
//! logic lives in `vista-loader`; this crate wires it to stdin/stdout.

pub mod headless;

pub use headless::runner::{run_headless, HeadlessOptions};
