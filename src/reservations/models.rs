//! Reservation records as delivered by the reservation service

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::utils::time::parse_local;

/// One reservation record; datetimes are naive UTC+9 strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub meeting_name: String,
    pub start_datetime: String,
    pub end_datetime: String,
}

impl Reservation {
    pub fn start(&self) -> Option<DateTime<FixedOffset>> {
        parse_local(&self.start_datetime)
    }

    pub fn end(&self) -> Option<DateTime<FixedOffset>> {
        parse_local(&self.end_datetime)
    }
}

/// The single reservation relevant right now, with its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReservation {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub is_ongoing: bool,
}

/// Extract the reservation list from a response body.
///
/// A missing `reservations` key or a non-list value is an empty result.
/// Records that do not look like reservations are skipped.
pub fn parse_reservations_body(body: &str) -> Result<Vec<Reservation>, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;

    let Some(Value::Array(items)) = value.get("reservations") else {
        return Ok(Vec::new());
    };

    let reservations = items
        .iter()
        .filter_map(|item| match Reservation::deserialize(item) {
            Ok(reservation) => Some(reservation),
            Err(e) => {
                warn!("Skipping unreadable reservation record: {}", e);
                None
            }
        })
        .collect();

    Ok(reservations)
}
