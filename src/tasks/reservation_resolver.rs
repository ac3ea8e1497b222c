//! Reservation resolver background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::{
    reservations::{Resolution, ReservationProvider, Resolver},
    state::AppState,
    utils::time::Clock,
};

/// What woke the resolver up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    RoomChanged,
    Refresh,
    Closed,
}

/// Background task that resolves the selected room's reservation.
///
/// Runs once at start, again on every room change, on every refresh request
/// and every `refresh_every` if set. A room change while a fetch is in flight
/// drops that fetch; only the newest request can update the display.
pub async fn reservation_resolver_task<P>(
    state: Arc<AppState>,
    resolver: Resolver<P>,
    refresh_every: Option<Duration>,
) where
    P: ReservationProvider + 'static,
{
    info!("Starting reservation resolver task");

    let mut room_rx = state.room_tx.subscribe();
    let mut refresh = refresh_every.map(|period| {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });
    if let Some(ticker) = refresh.as_mut() {
        // The immediate first tick would duplicate the startup resolution.
        ticker.reset();
    }

    // Resolve the initial selection without waiting for a change.
    let mut pending = true;

    loop {
        if !pending {
            let trigger = tokio::select! {
                changed = room_rx.changed() => match changed {
                    Ok(()) => Trigger::RoomChanged,
                    Err(_) => Trigger::Closed,
                },
                _ = next_refresh(&mut refresh) => Trigger::Refresh,
                _ = state.refresh_requested.notified() => Trigger::Refresh,
            };
            if trigger == Trigger::Closed {
                break;
            }
            debug!("Resolver triggered by {:?}", trigger);
        }
        pending = false;

        let room_id = *room_rx.borrow_and_update();
        let generation = match state.begin_resolution(room_id) {
            Ok(generation) => generation,
            Err(e) => {
                error!("Failed to start resolution: {}", e);
                continue;
            }
        };

        let now = state.clock.now();
        let superseded = async {
            // An error means the sender is gone; treat it as a cancellation too.
            let _ = room_rx.changed().await;
        };

        let outcome = resolver.resolve(room_id, now, superseded).await;
        match outcome {
            Resolution::Resolved(resolved) => {
                if let Err(e) = state.apply_resolution(generation, resolved) {
                    error!("Failed to apply resolution: {}", e);
                }
            }
            Resolution::Failed(err) => {
                if let Err(e) = state.apply_failure(generation, &err) {
                    error!("Failed to record resolution failure: {}", e);
                }
            }
            Resolution::Cancelled => {
                if room_rx.has_changed().is_err() {
                    break;
                }
                debug!("Resolution for room {} cancelled by a newer selection", room_id);
                pending = true;
            }
        }
    }

    info!("Reservation resolver task stopped");
}

async fn next_refresh(refresh: &mut Option<Interval>) {
    match refresh {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
