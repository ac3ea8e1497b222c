//! Madakoko - a meeting room kiosk server
//!
//! This library resolves the reservation that matters right now for the
//! selected room and runs a drift-free countdown towards its next state
//! change, exposing both to a display over HTTP.

pub mod api;
pub mod config;
pub mod reservations;
pub mod rooms;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
