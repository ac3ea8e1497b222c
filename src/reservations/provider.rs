//! Reservation service client

use std::{future::Future, time::Duration};

use tracing::debug;

use super::{models::parse_reservations_body, window::TimeWindow, Reservation, ResolveError};
use crate::rooms::RoomId;

/// Path of the reservation listing on the reservation service
pub const RESERVATIONS_PATH: &str = "/reservations/api/future-reservations";

/// Parameters of one reservation listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationQuery {
    pub room_id: RoomId,
    pub window: TimeWindow,
}

impl ReservationQuery {
    /// Query string pairs as the reservation service expects them
    pub fn params(&self) -> [(&'static str, String); 3] {
        [
            ("seat_id", self.room_id.to_string()),
            ("start_date", self.window.start_iso()),
            ("end_date", self.window.end_iso()),
        ]
    }
}

/// Anything that can list the reservations of a room over a window
pub trait ReservationProvider: Send + Sync {
    fn fetch(
        &self,
        query: ReservationQuery,
    ) -> impl Future<Output = Result<Vec<Reservation>, ResolveError>> + Send;
}

/// Provider backed by the reservation service's HTTP API
#[derive(Debug, Clone)]
pub struct HttpReservationProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpReservationProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), RESERVATIONS_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ReservationProvider for HttpReservationProvider {
    async fn fetch(&self, query: ReservationQuery) -> Result<Vec<Reservation>, ResolveError> {
        debug!("Fetching reservations for room {} from {}", query.room_id, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query.params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let reservations = parse_reservations_body(&body)?;

        debug!("Room {} has {} reservations this week", query.room_id, reservations.len());
        Ok(reservations)
    }
}
