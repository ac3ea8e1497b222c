//! Fixed-offset local time handling and the wall clock seam

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Utc};

/// Offset of every local datetime the reservation service speaks (UTC+9)
pub const LOCAL_OFFSET_SECONDS: i32 = 9 * 3600;

/// Formats accepted for naive local datetimes
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// The fixed UTC+9 offset, independent of the host timezone
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_OFFSET_SECONDS).expect("UTC+9 is within the valid offset range")
}

/// Parse a naive `YYYY-MM-DD HH:mm` string as UTC+9 local time
///
/// Returns `None` for anything that does not parse; callers decide how an
/// unreadable timestamp affects selection.
pub fn parse_local(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())?;
    naive.and_local_timezone(local_offset()).single()
}

/// Render an instant as an ISO-8601 timestamp carrying the `+09:00` offset
pub fn to_local_iso(instant: DateTime<FixedOffset>) -> String {
    instant
        .with_timezone(&local_offset())
        .format("%Y-%m-%dT%H:%M:%S%:z")
        .to_string()
}

/// Milliseconds from `now` until `deadline`, floored at zero
pub fn millis_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (deadline - now).num_milliseconds().max(0) as u64
}

/// Source of wall-clock time
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut current) = self.now.lock() {
            *current += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|e| *e.into_inner())
    }
}
