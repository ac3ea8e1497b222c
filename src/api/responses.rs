//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    reservations::ResolvedReservation,
    rooms::{Room, RoomCatalog},
    state::{Alert, CountdownSnapshot, DisplayState},
    utils::format::{format_date_ja, format_hms, format_range, format_wait_message},
};

/// API response structure for action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn ok(message: String) -> Self {
        Self::new("ok".to_string(), message)
    }

    pub fn error(message: String) -> Self {
        Self::new("error".to_string(), message)
    }
}

/// Reservation card text as the kiosk renders it
#[derive(Debug, Clone, Serialize)]
pub struct ReservationView {
    pub headline: String,
    pub date: String,
    pub time_range: String,
    pub meeting_name: String,
    pub employee: String,
}

impl ReservationView {
    pub fn new(resolved: &ResolvedReservation, room_label: &str) -> Self {
        let status = if resolved.is_ongoing { "会議中" } else { "次の会議がはじまります" };
        let reservation = &resolved.reservation;

        Self {
            headline: format!("{}（{}）", status, room_label),
            date: format_date_ja(resolved.start),
            time_range: format_range(&reservation.start_datetime, &reservation.end_datetime),
            meeting_name: reservation.meeting_name.clone(),
            employee: format!("{}さん", reservation.employee_name),
        }
    }
}

/// Colour band of the countdown ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RingTone {
    Normal,
    Warning,
    Critical,
}

impl RingTone {
    pub fn for_percent(percent: f64) -> Self {
        if percent <= 10.0 {
            RingTone::Critical
        } else if percent <= 30.0 {
            RingTone::Warning
        } else {
            RingTone::Normal
        }
    }
}

/// Countdown ring contents
#[derive(Debug, Clone, Serialize)]
pub struct CountdownView {
    #[serde(flatten)]
    pub snapshot: CountdownSnapshot,
    pub label_text: String,
    pub clock: String,
    pub wait_message: String,
    pub tone: RingTone,
}

impl From<CountdownSnapshot> for CountdownView {
    fn from(snapshot: CountdownSnapshot) -> Self {
        Self {
            label_text: snapshot.label.text().to_string(),
            clock: format_hms(snapshot.remaining_ms),
            wait_message: format_wait_message(snapshot.remaining_ms),
            tone: RingTone::for_percent(snapshot.percent),
            snapshot,
        }
    }
}

/// Full display status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub room: Room,
    pub loading: bool,
    pub error: Option<String>,
    /// Loading, error or empty text shown instead of the card
    pub placeholder: Option<String>,
    pub reservation: Option<ResolvedReservation>,
    pub view: Option<ReservationView>,
    pub countdown: CountdownView,
    pub alert: Option<Alert>,
    pub uptime: String,
}

impl StatusResponse {
    pub fn new(display: DisplayState, countdown: CountdownSnapshot, catalog: &RoomCatalog, uptime: String) -> Self {
        let room_label = catalog.label(display.room_id);
        let placeholder = display.placeholder();

        Self {
            room: Room {
                id: display.room_id,
                name: room_label.clone(),
            },
            loading: display.loading,
            view: display
                .reservation
                .as_ref()
                .map(|resolved| ReservationView::new(resolved, &room_label)),
            error: display.error,
            placeholder,
            reservation: display.reservation,
            countdown: countdown.into(),
            alert: display.alert,
            uptime,
        }
    }
}

/// Room catalog response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomsResponse {
    pub selected: u32,
    pub rooms: Vec<Room>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
