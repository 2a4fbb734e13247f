use chrono::{DateTime, FixedOffset, Local, Timelike};

/// Interactive mode redraws once per second.
pub const INTERACTIVE_UPDATE_RATE_MS: i64 = 1_000;

/// Source of "now" for the face. Implementations decide the time zone.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the system's local zone.
///
/// The zone is resolved on every call, so a zone change on the device shows
/// up on the next frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl TimeSource for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// `HH:MM` in 24-hour format, `H:MM` otherwise (midnight and noon are 12).
pub fn time_text(now: &DateTime<FixedOffset>, use_24_hour: bool) -> String {
    if use_24_hour {
        format!("{:02}:{:02}", now.hour(), now.minute())
    } else {
        let (_, hour) = now.hour12();
        format!("{}:{:02}", hour, now.minute())
    }
}

pub fn am_pm_text(now: &DateTime<FixedOffset>) -> &'static str {
    if now.hour12().0 { "pm" } else { "am" }
}

/// e.g. `Sun, Oct 18 2026`.
pub fn date_text(now: &DateTime<FixedOffset>) -> String {
    now.format("%a, %b %d %Y").to_string()
}

/// Milliseconds until the next whole update-rate boundary.
pub fn next_tick_delay(now_ms: i64) -> i64 {
    INTERACTIVE_UPDATE_RATE_MS - now_ms.rem_euclid(INTERACTIVE_UPDATE_RATE_MS)
}
