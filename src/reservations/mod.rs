//! Reservation resolution module
//!
//! Builds the weekly query window, fetches the room's reservations and picks
//! the one reservation the display should count towards.

pub mod error;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod window;

// Re-export main types
pub use error::ResolveError;
pub use models::{Reservation, ResolvedReservation};
pub use provider::{HttpReservationProvider, ReservationProvider, ReservationQuery};
pub use resolver::{select_current, Resolution, Resolver};
pub use window::TimeWindow;
