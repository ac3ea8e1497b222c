//! Picks the reservation that matters right now

use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{
    provider::{ReservationProvider, ReservationQuery},
    window::TimeWindow,
    Reservation, ResolvedReservation, ResolveError,
};
use crate::rooms::RoomId;

/// Outcome of one resolution attempt
#[derive(Debug)]
pub enum Resolution {
    /// The fetch completed; `None` means no relevant reservation this week
    Resolved(Option<ResolvedReservation>),
    /// A newer request superseded this one before it finished
    Cancelled,
    Failed(ResolveError),
}

/// Select the earliest-starting reservation whose end is still ahead of `now`.
///
/// Equal start times keep list order. Records whose datetimes do not parse
/// are never selected.
pub fn select_current(reservations: &[Reservation], now: DateTime<Utc>) -> Option<ResolvedReservation> {
    let mut relevant: Vec<ResolvedReservation> = reservations
        .iter()
        .filter_map(|reservation| {
            let (Some(start), Some(end)) = (reservation.start(), reservation.end()) else {
                warn!(
                    "Ignoring reservation with unreadable datetimes: {:?} - {:?}",
                    reservation.start_datetime, reservation.end_datetime
                );
                return None;
            };
            (end > now).then(|| ResolvedReservation {
                reservation: reservation.clone(),
                start,
                end,
                is_ongoing: start <= now,
            })
        })
        .collect();

    // sort_by_key is stable
    relevant.sort_by_key(|candidate| candidate.start);
    relevant.into_iter().next()
}

/// Resolves the current reservation of a room through a provider
#[derive(Debug, Clone)]
pub struct Resolver<P> {
    provider: P,
}

impl<P: ReservationProvider> Resolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fetch this week's reservations for `room_id` and pick the relevant one.
    ///
    /// If `cancel` completes before the fetch does, the fetch is dropped and
    /// the result is [`Resolution::Cancelled`].
    pub async fn resolve<C>(&self, room_id: RoomId, now: DateTime<Utc>, cancel: C) -> Resolution
    where
        C: Future,
    {
        let query = ReservationQuery { room_id, window: TimeWindow::week_of(now) };

        tokio::select! {
            biased;
            _ = cancel => {
                debug!("Resolution for room {} superseded", room_id);
                Resolution::Cancelled
            }
            result = self.provider.fetch(query) => match result {
                Ok(reservations) => Resolution::Resolved(select_current(&reservations, now)),
                Err(e) => Resolution::Failed(e),
            },
        }
    }
}
