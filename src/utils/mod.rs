//! Utility functions module
//!
//! Time handling, text formatting and signal plumbing shared by the rest of
//! the application.

pub mod format;
pub mod signals;
pub mod time;

// Re-export main functions
pub use signals::shutdown_signal;
pub use time::{Clock, ManualClock, SystemClock};
