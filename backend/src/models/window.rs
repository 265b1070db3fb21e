//! Weekly draw windows.
//!
//! A draw window is identified by the cutoff instant that opens it: by default
//! Monday 05:00 in the gym's time zone. Registrations always target the *next*
//! window, while results belong to the window that has just closed.

use chrono::{
    DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Start instant of a weekly draw cycle, stored as whole epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub struct DrawWindow(DateTime<Utc>);

impl DrawWindow {
    /// Create a window starting at `start`, truncated to whole seconds.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self::from_epoch_seconds(start.timestamp()).unwrap_or(Self(start))
    }

    /// Rebuild a window from its persisted `draw_time` column.
    pub fn from_epoch_seconds(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self)
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.0
    }

    /// The window start expressed in a local zone.
    pub fn in_zone<Tz: TimeZone>(&self, zone: &Tz) -> DateTime<Tz> {
        self.0.with_timezone(zone)
    }

    /// Whether the cutoff opening this window has passed at `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.0
    }
}

impl fmt::Display for DrawWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DrawWindow> for i64 {
    fn from(window: DrawWindow) -> Self {
        window.epoch_seconds()
    }
}

impl TryFrom<i64> for DrawWindow {
    type Error = String;

    fn try_from(seconds: i64) -> Result<Self, Self::Error> {
        Self::from_epoch_seconds(seconds)
            .ok_or_else(|| format!("draw_time {} is out of range", seconds))
    }
}

/// Weekday and local wall-clock time at which one window closes and the next opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyCutoff {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl WeeklyCutoff {
    pub fn new(weekday: Weekday, time: NaiveTime) -> Self {
        Self { weekday, time }
    }
}

impl Default for WeeklyCutoff {
    fn default() -> Self {
        Self {
            weekday: Weekday::Mon,
            time: NaiveTime::from_hms_opt(5, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// The window currently being drawn (or just closed) and the one open for registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawTimes {
    pub current: DrawWindow,
    pub next: DrawWindow,
}

/// Compute the current and next draw windows for `current`.
///
/// The zone is taken from `current` itself. The cutoff on the most recent
/// cutoff weekday at or before the local date of `current` splits the week:
/// before it, the previous week's cutoff is still current; at or after it, the
/// cutoff itself is current. Consecutive windows are one calendar week apart
/// in the local zone, so every window starts at the configured wall-clock time.
pub fn compute_draw_times<Tz: TimeZone>(current: &DateTime<Tz>, cutoff: &WeeklyCutoff) -> DrawTimes {
    let zone = current.timezone();
    let local_date = current.date_naive();
    // Date arithmetic saturates at chrono's calendar limits.
    let cutoff_date = local_date
        .checked_sub_days(Days::new(days_since(local_date.weekday(), cutoff.weekday)))
        .unwrap_or(NaiveDate::MIN);
    let cutoff_instant = local_cutoff(&zone, cutoff_date, cutoff.time);

    if current.with_timezone(&Utc) < cutoff_instant {
        let previous = cutoff_date
            .checked_sub_days(Days::new(7))
            .unwrap_or(NaiveDate::MIN);
        DrawTimes {
            current: DrawWindow::new(local_cutoff(&zone, previous, cutoff.time)),
            next: DrawWindow::new(cutoff_instant),
        }
    } else {
        let following = cutoff_date
            .checked_add_days(Days::new(7))
            .unwrap_or(NaiveDate::MAX);
        DrawTimes {
            current: DrawWindow::new(cutoff_instant),
            next: DrawWindow::new(local_cutoff(&zone, following, cutoff.time)),
        }
    }
}

fn days_since(today: Weekday, anchor: Weekday) -> u64 {
    let today = today.num_days_from_monday();
    let anchor = anchor.num_days_from_monday();
    u64::from((today + 7 - anchor) % 7)
}

/// Resolve a local wall-clock time to an instant.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times inside
/// a DST gap move forward to the first wall-clock time that exists.
fn local_cutoff<Tz: TimeZone>(zone: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    let mut candidate = naive;
    for _ in 0..=4 {
        match zone.from_local_datetime(&candidate) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                return dt.with_timezone(&Utc)
            }
            LocalResult::None => match candidate.checked_add_signed(TimeDelta::minutes(30)) {
                Some(later) => candidate = later,
                None => break,
            },
        }
    }
    utc_fallback(naive)
}

fn utc_fallback(naive: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&naive)
}

/// Remaining time until the next draw, split the way it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

/// Time left between `now` and the start of `next`, clamped at zero.
pub fn countdown(now: DateTime<Utc>, next: DrawWindow) -> Countdown {
    let remaining = (next.start() - now).max(TimeDelta::zero());
    let seconds = remaining.num_seconds();
    Countdown {
        days: seconds / 86_400,
        hours: (seconds % 86_400) / 3_600,
        minutes: (seconds % 3_600) / 60,
    }
}

/// Calendar dates covered by the week a registration is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationWeek {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The seven local dates starting on the day `next` opens.
pub fn registration_week<Tz: TimeZone>(next: DrawWindow, zone: &Tz) -> RegistrationWeek {
    let start = next.in_zone(zone).date_naive();
    RegistrationWeek {
        start,
        end: start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX),
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod window_tests;
