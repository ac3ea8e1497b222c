//! State management module
//!
//! This module contains the shared kiosk state, the reservation card state
//! and the countdown state machine.

pub mod app_state;
pub mod countdown_state;
pub mod display_state;

// Re-export main types
pub use app_state::AppState;
pub use countdown_state::{
    CountdownLabel, CountdownPhase, CountdownSnapshot, CountdownState, CountdownTarget, Tick,
};
pub use display_state::{Alert, DisplayState};
