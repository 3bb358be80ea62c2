//! Configuration file parsing for the loader
//!
//! Supports:
//! - `.vista-grande/config.toml` - Overlay durations, debounce and session key

pub mod settings;
pub mod types;

pub use settings::{init_config_dir, load_settings, CONFIG_DIR, CONFIG_FILENAME};
pub use types::*;
