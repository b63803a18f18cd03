//! Every due-date comparison happens in one fixed zone, UTC+8, with no DST.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Timelike, Utc};

const LOCAL_OFFSET_SECONDS: i32 = 8 * 3600;
/// Longer windows are clamped so the end stays representable.
const MAX_WINDOW_DAYS: u32 = 36_500;

pub fn local_offset() -> FixedOffset {
    // 8h is always inside the valid +/-24h range.
    FixedOffset::east_opt(LOCAL_OFFSET_SECONDS).unwrap_or(Utc.fix())
}

/// Convert an LMS (UTC) timestamp into the local zone.
pub fn to_local(ts: DateTime<Utc>) -> DateTime<FixedOffset> {
    ts.with_timezone(&local_offset())
}

pub fn local_date(now: DateTime<Utc>) -> NaiveDate {
    to_local(now).date_naive()
}

pub fn local_hour(now: DateTime<Utc>) -> u8 {
    to_local(now).hour() as u8
}

/// Half-open window `[start, start + days)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl Window {
    pub fn days(now: DateTime<Utc>, days: u32) -> Self {
        Self::span(now, Duration::days(i64::from(days.min(MAX_WINDOW_DAYS))))
    }

    pub fn hours(now: DateTime<Utc>, hours: u32) -> Self {
        Self::span(now, Duration::hours(i64::from(hours)))
    }

    fn span(now: DateTime<Utc>, length: Duration) -> Self {
        let start = to_local(now);
        Self {
            start,
            end: start + length,
        }
    }

    pub fn contains(&self, ts: DateTime<FixedOffset>) -> bool {
        ts >= self.start && ts < self.end
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|guard| *guard).unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}
