//! Main application state management

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use chrono::Duration;
use tokio::sync::{broadcast, watch, Notify};
use tracing::{debug, info, warn};

use super::{Alert, CountdownSnapshot, CountdownState, CountdownTarget, DisplayState, Tick};
use crate::{
    reservations::{ResolveError, ResolvedReservation},
    rooms::{RoomCatalog, RoomId},
    utils::time::Clock,
};

/// Shared state of the kiosk: room selection, reservation card and countdown
#[derive(Debug)]
pub struct AppState {
    /// Rooms that can be selected
    pub catalog: RoomCatalog,
    /// Wall clock used for resolution and countdown
    pub clock: Arc<dyn Clock>,
    /// Countdown length used when there is no reservation to count towards
    pub fallback_duration: Duration,
    pub display_state: Arc<Mutex<DisplayState>>,
    pub countdown_state: Arc<Mutex<CountdownState>>,
    /// Bumped by every resolution start; older results are discarded
    resolution_generation: AtomicU64,
    pub start_time: Instant,
    /// Currently selected room
    pub room_tx: watch::Sender<RoomId>,
    /// Deadline the countdown should run towards
    pub target_tx: watch::Sender<CountdownTarget>,
    /// Latest resolved reservation
    pub resolved_tx: watch::Sender<Option<ResolvedReservation>>,
    /// Countdown ticks
    pub tick_tx: watch::Sender<CountdownSnapshot>,
    /// Completed countdown epochs
    pub completion_tx: broadcast::Sender<u64>,
    /// Wakes the resolver for an out-of-band refresh
    pub refresh_requested: Notify,
}

impl AppState {
    /// Create a new AppState showing `room_id`
    pub fn new(catalog: RoomCatalog, room_id: RoomId, fallback_duration: Duration, clock: Arc<dyn Clock>) -> Self {
        let countdown = CountdownState::new(clock.now());
        let (room_tx, _) = watch::channel(room_id);
        let (target_tx, _) = watch::channel(CountdownTarget::initial());
        let (resolved_tx, _) = watch::channel(None);
        let (tick_tx, _) = watch::channel(countdown.snapshot());
        let (completion_tx, _) = broadcast::channel(16);

        Self {
            catalog,
            clock,
            fallback_duration,
            display_state: Arc::new(Mutex::new(DisplayState::new(room_id))),
            countdown_state: Arc::new(Mutex::new(countdown)),
            resolution_generation: AtomicU64::new(0),
            start_time: Instant::now(),
            room_tx,
            target_tx,
            resolved_tx,
            tick_tx,
            completion_tx,
            refresh_requested: Notify::new(),
        }
    }

    /// Currently selected room
    pub fn selected_room(&self) -> RoomId {
        *self.room_tx.borrow()
    }

    /// Select a room; returns whether the selection changed
    pub fn select_room(&self, room_id: RoomId) -> Result<bool, String> {
        if !self.catalog.contains(room_id) {
            return Err(format!("Unknown room: {}", room_id));
        }

        let changed = self.room_tx.send_if_modified(|current| {
            if *current == room_id {
                false
            } else {
                *current = room_id;
                true
            }
        });

        if changed {
            info!("Room selection changed to {} ({})", room_id, self.catalog.label(room_id));
        }
        Ok(changed)
    }

    /// Ask the resolver to run again for the current room
    pub fn request_refresh(&self) {
        debug!("Refresh requested");
        self.refresh_requested.notify_one();
    }

    /// Mark a resolution as started and return its generation
    pub fn begin_resolution(&self, room_id: RoomId) -> Result<u64, String> {
        let generation = self.resolution_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut display = self.display_state.lock()
            .map_err(|e| format!("Failed to lock display state: {}", e))?;
        let room_changed = display.room_id != room_id;
        display.room_id = room_id;
        display.loading = true;
        display.error = None;
        if room_changed {
            // The previous room's card and deadline must not outlive the switch.
            display.reservation = None;
        }
        drop(display);

        if room_changed {
            self.resolved_tx.send_replace(None);
            let previous_label = self.target_tx.borrow().label;
            self.publish_target(CountdownTarget::for_reservation(None, previous_label));
        }

        debug!("Resolution {} started for room {}", generation, room_id);
        Ok(generation)
    }

    /// Hand `target` to the countdown; only a real change of deadline or label restarts it
    fn publish_target(&self, target: CountdownTarget) {
        let retargeted = self.target_tx.send_if_modified(|current| {
            if *current == target {
                false
            } else {
                *current = target;
                true
            }
        });
        if retargeted {
            debug!("Countdown target changed: {:?}", target);
        }
    }

    /// Whether `generation` is the most recently started resolution
    pub fn is_current_resolution(&self, generation: u64) -> bool {
        self.resolution_generation.load(Ordering::SeqCst) == generation
    }

    /// Apply a completed resolution; stale generations are a no-op.
    ///
    /// Returns whether the result was applied.
    pub fn apply_resolution(&self, generation: u64, resolved: Option<ResolvedReservation>) -> Result<bool, String> {
        if !self.is_current_resolution(generation) {
            debug!("Discarding result of superseded resolution {}", generation);
            return Ok(false);
        }

        let mut display = self.display_state.lock()
            .map_err(|e| format!("Failed to lock display state: {}", e))?;
        display.loading = false;
        display.reservation = resolved.clone();
        drop(display);

        match &resolved {
            Some(r) => info!(
                "Resolved {} reservation '{}' ({} - {})",
                if r.is_ongoing { "ongoing" } else { "upcoming" },
                r.reservation.meeting_name,
                r.reservation.start_datetime,
                r.reservation.end_datetime,
            ),
            None => info!("No relevant reservation this week"),
        }

        let previous_label = self.target_tx.borrow().label;
        let target = CountdownTarget::for_reservation(resolved.as_ref(), previous_label);
        self.resolved_tx.send_replace(resolved);
        self.publish_target(target);

        Ok(true)
    }

    /// Record a failed resolution; stale generations are a no-op
    pub fn apply_failure(&self, generation: u64, error: &ResolveError) -> Result<bool, String> {
        if !self.is_current_resolution(generation) {
            debug!("Discarding failure of superseded resolution {}", generation);
            return Ok(false);
        }

        warn!("Reservation resolution failed: {}", error);
        let mut display = self.display_state.lock()
            .map_err(|e| format!("Failed to lock display state: {}", e))?;
        display.loading = false;
        display.error = Some(error.display_message());
        Ok(true)
    }

    /// Start a new countdown epoch towards `target`
    pub fn retarget_countdown(&self, target: CountdownTarget) -> Result<CountdownSnapshot, String> {
        let mut countdown = self.countdown_state.lock()
            .map_err(|e| format!("Failed to lock countdown state: {}", e))?;

        let epoch = countdown.retarget(target, self.fallback_duration, self.clock.now());
        let snapshot = countdown.snapshot();
        drop(countdown);

        info!(
            "Countdown epoch {} started: {} remaining ({})",
            epoch,
            crate::utils::format::format_hms(snapshot.initial_remaining_ms),
            target.label.text(),
        );
        self.tick_tx.send_replace(snapshot.clone());
        Ok(snapshot)
    }

    /// Advance the countdown to the current wall-clock time
    pub fn tick_countdown(&self) -> Result<Tick, String> {
        let mut countdown = self.countdown_state.lock()
            .map_err(|e| format!("Failed to lock countdown state: {}", e))?;

        let tick = countdown.tick(self.clock.now());
        let snapshot = countdown.snapshot();
        drop(countdown);

        if tick != Tick::Idle {
            self.tick_tx.send_replace(snapshot);
        }
        Ok(tick)
    }

    /// Raise the completion alert for `epoch` if it is still the live epoch.
    ///
    /// Returns whether the completion was delivered.
    pub fn complete_countdown(&self, epoch: u64) -> Result<bool, String> {
        let countdown = self.countdown_state.lock()
            .map_err(|e| format!("Failed to lock countdown state: {}", e))?;
        if countdown.epoch() != epoch || !countdown.is_completed() {
            debug!("Ignoring completion of stale countdown epoch {}", epoch);
            return Ok(false);
        }
        drop(countdown);

        let mut display = self.display_state.lock()
            .map_err(|e| format!("Failed to lock display state: {}", e))?;
        display.alert = Some(Alert::meeting_ending(epoch));
        drop(display);

        info!("Countdown epoch {} completed", epoch);
        if self.completion_tx.send(epoch).is_err() {
            debug!("No completion listeners for epoch {}", epoch);
        }
        Ok(true)
    }

    /// Hide the completion alert; returns whether one was showing
    pub fn dismiss_alert(&self) -> Result<bool, String> {
        let mut display = self.display_state.lock()
            .map_err(|e| format!("Failed to lock display state: {}", e))?;
        Ok(display.alert.take().is_some())
    }

    /// Get current display state
    pub fn get_display_state(&self) -> Result<DisplayState, String> {
        self.display_state.lock()
            .map(|state| state.clone())
            .map_err(|e| format!("Failed to lock display state: {}", e))
    }

    /// Get current countdown snapshot
    pub fn get_countdown(&self) -> Result<CountdownSnapshot, String> {
        self.countdown_state.lock()
            .map(|state| state.snapshot())
            .map_err(|e| format!("Failed to lock countdown state: {}", e))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        reservations::Reservation,
        state::CountdownLabel,
        utils::time::{parse_local, ManualClock},
    };
    use chrono::{TimeZone, Utc};

    fn state_at(clock: Arc<ManualClock>) -> AppState {
        AppState::new(RoomCatalog::default(), 333, Duration::seconds(10), clock)
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 15, 0).unwrap()))
    }

    fn resolved(start: &str, end: &str, is_ongoing: bool) -> ResolvedReservation {
        ResolvedReservation {
            reservation: Reservation {
                employee_name: "鈴木".to_string(),
                meeting_name: "定例".to_string(),
                start_datetime: start.to_string(),
                end_datetime: end.to_string(),
            },
            start: parse_local(start).unwrap(),
            end: parse_local(end).unwrap(),
            is_ongoing,
        }
    }

    #[test]
    fn unknown_rooms_cannot_be_selected() {
        let state = state_at(clock());
        assert!(state.select_room(999).is_err());
        assert_eq!(state.selected_room(), 333);

        assert_eq!(state.select_room(331), Ok(true));
        assert_eq!(state.select_room(331), Ok(false));
        assert_eq!(state.selected_room(), 331);
    }

    #[test]
    fn only_the_latest_resolution_is_applied() {
        let state = state_at(clock());
        let stale = state.begin_resolution(331).unwrap();
        let live = state.begin_resolution(332).unwrap();

        let stale_result = resolved("2024-01-01 10:00", "2024-01-01 11:00", false);
        assert_eq!(state.apply_resolution(stale, Some(stale_result)), Ok(false));
        assert_eq!(state.apply_failure(stale, &ResolveError::Status(500)), Ok(false));

        let display = state.get_display_state().unwrap();
        assert!(display.loading);
        assert!(display.reservation.is_none());
        assert!(display.error.is_none());

        let live_result = resolved("2024-01-01 09:00", "2024-01-01 09:45", true);
        assert_eq!(state.apply_resolution(live, Some(live_result.clone())), Ok(true));
        let display = state.get_display_state().unwrap();
        assert!(!display.loading);
        assert_eq!(display.room_id, 332);
        assert_eq!(display.reservation, Some(live_result.clone()));
        assert_eq!(*state.resolved_tx.borrow(), Some(live_result));
    }

    #[test]
    fn resolution_drives_the_countdown_target() {
        let state = state_at(clock());
        let mut target_rx = state.target_tx.subscribe();

        let generation = state.begin_resolution(333).unwrap();
        let ongoing = resolved("2024-01-01 09:00", "2024-01-01 09:45", true);
        state.apply_resolution(generation, Some(ongoing.clone())).unwrap();
        assert!(target_rx.has_changed().unwrap());
        let target = *target_rx.borrow_and_update();
        assert_eq!(target.label, CountdownLabel::UntilEnd);
        assert_eq!(target.target_at, Some(ongoing.end.with_timezone(&Utc)));

        // Same reservation again does not restart the countdown.
        let generation = state.begin_resolution(333).unwrap();
        state.apply_resolution(generation, Some(ongoing)).unwrap();
        assert!(!target_rx.has_changed().unwrap());

        // No reservation clears the deadline and keeps the label.
        let generation = state.begin_resolution(333).unwrap();
        state.apply_resolution(generation, None).unwrap();
        let target = *target_rx.borrow_and_update();
        assert_eq!(target.target_at, None);
        assert_eq!(target.label, CountdownLabel::UntilEnd);
    }

    #[test]
    fn failure_is_shown_until_the_next_resolution() {
        let state = state_at(clock());
        let generation = state.begin_resolution(333).unwrap();
        state.apply_failure(generation, &ResolveError::Status(502)).unwrap();

        let display = state.get_display_state().unwrap();
        assert!(!display.loading);
        assert_eq!(display.error.as_deref(), Some("読み込みエラー: HTTP 502"));

        state.begin_resolution(333).unwrap();
        assert!(state.get_display_state().unwrap().error.is_none());
    }

    #[test]
    fn failed_resolution_after_a_room_switch_shows_no_previous_meeting() {
        let state = state_at(clock());
        let mut target_rx = state.target_tx.subscribe();

        let generation = state.begin_resolution(333).unwrap();
        let ongoing = resolved("2024-01-01 09:00", "2024-01-01 09:45", true);
        state.apply_resolution(generation, Some(ongoing)).unwrap();
        assert!(target_rx.borrow_and_update().target_at.is_some());

        state.select_room(332).unwrap();
        let generation = state.begin_resolution(332).unwrap();
        assert!(state.get_display_state().unwrap().reservation.is_none());
        assert!(state.resolved_tx.borrow().is_none());
        assert!(target_rx.has_changed().unwrap());
        let target = *target_rx.borrow_and_update();
        assert_eq!(target.target_at, None);
        assert_eq!(target.label, CountdownLabel::UntilEnd);

        state.apply_failure(generation, &ResolveError::Status(500)).unwrap();
        let display = state.get_display_state().unwrap();
        assert_eq!(display.room_id, 332);
        assert!(display.reservation.is_none());
        assert_eq!(display.error.as_deref(), Some("読み込みエラー: HTTP 500"));
    }

    #[test]
    fn refreshing_the_same_room_keeps_the_card() {
        let state = state_at(clock());
        let ongoing = resolved("2024-01-01 09:00", "2024-01-01 09:45", true);
        let generation = state.begin_resolution(333).unwrap();
        state.apply_resolution(generation, Some(ongoing.clone())).unwrap();
        let mut target_rx = state.target_tx.subscribe();

        state.begin_resolution(333).unwrap();
        let display = state.get_display_state().unwrap();
        assert!(display.loading);
        assert_eq!(display.reservation, Some(ongoing));
        assert_eq!(display.placeholder(), None);
        assert!(!target_rx.has_changed().unwrap());
    }

    #[test]
    fn completion_raises_the_alert_once_per_epoch() {
        let clock = clock();
        let state = state_at(clock.clone());
        let mut completions = state.completion_tx.subscribe();

        let snapshot = state.retarget_countdown(CountdownTarget::initial()).unwrap();
        assert_eq!(snapshot.remaining_ms, 10_000);

        clock.advance(Duration::milliseconds(10_000));
        let Tick::Completed { epoch } = state.tick_countdown().unwrap() else {
            panic!("countdown should have completed");
        };
        assert_eq!(state.complete_countdown(epoch), Ok(true));
        assert_eq!(completions.try_recv().unwrap(), epoch);
        assert_eq!(state.get_display_state().unwrap().alert, Some(Alert::meeting_ending(epoch)));

        assert_eq!(state.tick_countdown().unwrap(), Tick::Idle);
        assert_eq!(state.dismiss_alert(), Ok(true));
        assert_eq!(state.dismiss_alert(), Ok(false));

        // A completion that raced with a retarget is dropped.
        state.retarget_countdown(CountdownTarget::initial()).unwrap();
        assert_eq!(state.complete_countdown(epoch), Ok(false));
        assert!(completions.try_recv().is_err());
    }
}
