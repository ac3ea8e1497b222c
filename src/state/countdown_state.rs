//! Countdown state machine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::reservations::ResolvedReservation;
use crate::utils::time::millis_until;

/// What the countdown is counting towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownLabel {
    UntilStart,
    UntilEnd,
}

impl CountdownLabel {
    pub fn text(&self) -> &'static str {
        match self {
            CountdownLabel::UntilStart => "開始まで",
            CountdownLabel::UntilEnd => "終了まで",
        }
    }
}

/// Deadline request handed to the countdown; `None` means use the fallback duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountdownTarget {
    pub target_at: Option<DateTime<Utc>>,
    pub label: CountdownLabel,
}

impl CountdownTarget {
    pub fn initial() -> Self {
        Self {
            target_at: None,
            label: CountdownLabel::UntilStart,
        }
    }

    /// Target for a resolution result.
    ///
    /// Ongoing meetings count to their end, upcoming ones to their start.
    /// Without a reservation the target is cleared and the label stays.
    pub fn for_reservation(resolved: Option<&ResolvedReservation>, previous: CountdownLabel) -> Self {
        match resolved {
            Some(r) if r.is_ongoing => Self {
                target_at: Some(r.end.with_timezone(&Utc)),
                label: CountdownLabel::UntilEnd,
            },
            Some(r) => Self {
                target_at: Some(r.start.with_timezone(&Utc)),
                label: CountdownLabel::UntilStart,
            },
            None => Self {
                target_at: None,
                label: previous,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownPhase {
    Idle,
    Running,
    Completed,
}

/// Result of advancing the countdown to a new wall-clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No epoch is running
    Idle,
    Running { remaining_ms: u64 },
    /// The deadline was reached on this tick; reported once per epoch
    Completed { epoch: u64 },
}

/// Live countdown towards one absolute deadline per epoch
#[derive(Debug, Clone)]
pub struct CountdownState {
    epoch: u64,
    phase: CountdownPhase,
    target: CountdownTarget,
    deadline: DateTime<Utc>,
    initial_remaining_ms: u64,
    remaining_ms: u64,
}

/// Serializable view of the countdown at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountdownSnapshot {
    pub epoch: u64,
    pub phase: CountdownPhase,
    pub label: CountdownLabel,
    pub target_at: Option<DateTime<Utc>>,
    pub deadline: DateTime<Utc>,
    pub initial_remaining_ms: u64,
    pub remaining_ms: u64,
    pub percent: f64,
    pub completed: bool,
}

impl CountdownState {
    /// Create an idle countdown that has not been targeted yet
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            epoch: 0,
            phase: CountdownPhase::Idle,
            target: CountdownTarget::initial(),
            deadline: now,
            initial_remaining_ms: 0,
            remaining_ms: 0,
        }
    }

    /// Start a new epoch and return its number.
    ///
    /// A fallback deadline is fixed here once; it does not move with later ticks.
    pub fn retarget(&mut self, target: CountdownTarget, fallback: Duration, now: DateTime<Utc>) -> u64 {
        let deadline = match target.target_at {
            Some(at) => at,
            None => now
                .checked_add_signed(fallback.max(Duration::zero()))
                .unwrap_or_else(|| {
                    warn!("Fallback countdown of {} overflows the calendar; capping it", fallback);
                    DateTime::<Utc>::MAX_UTC
                }),
        };

        self.epoch += 1;
        self.phase = CountdownPhase::Running;
        self.target = target;
        self.deadline = deadline;
        self.initial_remaining_ms = millis_until(deadline, now);
        self.remaining_ms = self.initial_remaining_ms;
        self.epoch
    }

    /// Recompute the remaining time from the absolute deadline
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        if self.phase != CountdownPhase::Running {
            return Tick::Idle;
        }

        // A clock stepping backwards must not make the ring grow again.
        self.remaining_ms = millis_until(self.deadline, now).min(self.remaining_ms);

        if self.remaining_ms == 0 {
            self.phase = CountdownPhase::Completed;
            Tick::Completed { epoch: self.epoch }
        } else {
            Tick::Running {
                remaining_ms: self.remaining_ms,
            }
        }
    }

    /// Share of the epoch still remaining, 0 to 100
    pub fn percent(&self) -> f64 {
        if self.initial_remaining_ms == 0 {
            return 0.0;
        }
        self.remaining_ms as f64 / self.initial_remaining_ms as f64 * 100.0
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn is_completed(&self) -> bool {
        self.phase == CountdownPhase::Completed
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            epoch: self.epoch,
            phase: self.phase,
            label: self.target.label,
            target_at: self.target.target_at,
            deadline: self.deadline,
            initial_remaining_ms: self.initial_remaining_ms,
            remaining_ms: self.remaining_ms,
            percent: self.percent(),
            completed: self.is_completed(),
        }
    }
}
