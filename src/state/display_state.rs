//! What the kiosk currently shows for the selected room

use serde::{Deserialize, Serialize};

use crate::reservations::ResolvedReservation;
use crate::rooms::RoomId;

/// Completion alert shown when a countdown epoch finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub epoch: u64,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn meeting_ending(epoch: u64) -> Self {
        Self {
            epoch,
            title: "まもなく会議が終了します".to_string(),
            message: "ご準備ください。".to_string(),
        }
    }
}

/// Reservation card state of the display
#[derive(Debug, Clone, Serialize)]
pub struct DisplayState {
    pub room_id: RoomId,
    /// A resolution for the room is in flight
    pub loading: bool,
    /// Message of the last failed resolution, cleared when a new one starts
    pub error: Option<String>,
    pub reservation: Option<ResolvedReservation>,
    pub alert: Option<Alert>,
}

impl DisplayState {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            loading: true,
            error: None,
            reservation: None,
            alert: None,
        }
    }

    /// One-line text for the card when no reservation is shown.
    ///
    /// A refresh of the room already on screen keeps its card.
    pub fn placeholder(&self) -> Option<String> {
        if let Some(error) = &self.error {
            Some(error.clone())
        } else if self.reservation.is_some() {
            None
        } else if self.loading {
            Some("読み込み中…".to_string())
        } else {
            Some("今週の予約はありません。".to_string())
        }
    }
}
