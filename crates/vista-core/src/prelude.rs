//! Prelude for common imports used throughout the Vista Grande crates

pub use crate::error::{Error, Result, ResultExt};
pub use tracing::{debug, error, info, instrument, trace, warn};
