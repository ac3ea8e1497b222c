//! Week window used to query reservations

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::utils::time::{local_offset, to_local_iso};

/// Half-open interval `[start, end)` covering one local calendar week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// The Sunday-anchored week containing `now`, bounded by UTC+9 midnights.
    pub fn week_of(now: DateTime<Utc>) -> Self {
        let offset = local_offset();
        let today = now.with_timezone(&offset).date_naive();
        let weekday_index = i64::from(today.weekday().num_days_from_sunday());

        let start_date = today - Duration::days(weekday_index);
        let end_date = start_date + Duration::days(7);

        Self {
            start: local_midnight(start_date, offset),
            end: local_midnight(end_date, offset),
        }
    }

    pub fn start_iso(&self) -> String {
        to_local_iso(self.start)
    }

    pub fn end_iso(&self) -> String {
        to_local_iso(self.end)
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<FixedOffset> {
    let naive = date.and_time(NaiveTime::MIN);
    DateTime::from_naive_utc_and_offset(naive - offset, offset)
}
