//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod countdown_timer;
pub mod reservation_resolver;

// Re-export main functions
pub use countdown_timer::countdown_timer_task;
pub use reservation_resolver::reservation_resolver_task;
