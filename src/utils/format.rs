//! Text formatting for the countdown ring and the reservation card

use chrono::{DateTime, Datelike, FixedOffset, Weekday};

use super::time::local_offset;

/// Countdown clock text: `H:MM:SS` from one hour up, otherwise `M:SS`
pub fn format_hms(total_ms: u64) -> String {
    let total = total_ms / 1000;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Rough remaining time in the largest unit that keeps the value small.
///
/// Every step rounds up, so 61 seconds reads as 2 分 rather than 1 分.
pub fn format_short(ms: u64) -> String {
    let seconds = ms.div_ceil(1000);
    if seconds < 60 {
        return format!("{} 秒", seconds);
    }
    let minutes = seconds.div_ceil(60);
    if minutes < 60 {
        return format!("{} 分", minutes);
    }
    let hours = minutes.div_ceil(60);
    if hours < 24 {
        return format!("{} 時間", hours);
    }
    format!("{} 日", hours.div_ceil(24))
}

/// `約5 分お待ちください`
pub fn format_wait_message(ms: u64) -> String {
    format!("約{}お待ちください", format_short(ms))
}

fn weekday_ja(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "日",
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
    }
}

/// `MM/DD(曜)` in UTC+9
pub fn format_date_ja(instant: DateTime<FixedOffset>) -> String {
    let local = instant.with_timezone(&local_offset());
    format!(
        "{:02}/{:02}({})",
        local.month(),
        local.day(),
        weekday_ja(local.weekday())
    )
}

/// `HH:mm` cut straight from a raw `YYYY-MM-DD HH:mm` string
fn hour_minute(raw: &str) -> &str {
    match raw.split(' ').nth(1) {
        Some(time) => time.get(..5).unwrap_or(time),
        None => raw,
    }
}

/// `HH:mm-HH:mm` from the raw reservation strings
pub fn format_range(start: &str, end: &str) -> String {
    format!("{}-{}", hour_minute(start), hour_minute(end))
}
