//! The gym's weekly draw schedule: time zone, cutoff and list sizes.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::draw::DrawCaps;
use super::window::{
    compute_draw_times, countdown, registration_week, Countdown, DrawTimes, DrawWindow,
    RegistrationWeek, WeeklyCutoff,
};

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Bucharest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSchedule {
    pub zone: Tz,
    pub cutoff: WeeklyCutoff,
    pub caps: DrawCaps,
}

impl Default for DrawSchedule {
    fn default() -> Self {
        Self {
            zone: DEFAULT_TIMEZONE,
            cutoff: WeeklyCutoff::default(),
            caps: DrawCaps::default(),
        }
    }
}

impl DrawSchedule {
    pub fn new(zone: Tz, cutoff: WeeklyCutoff, caps: DrawCaps) -> Self {
        Self { zone, cutoff, caps }
    }

    /// Current and next windows as seen from `now` in the schedule's zone.
    pub fn draw_times(&self, now: DateTime<Utc>) -> DrawTimes {
        compute_draw_times(&now.with_timezone(&self.zone), &self.cutoff)
    }

    /// Window that registrations submitted at `now` are entered into.
    pub fn registration_window(&self, now: DateTime<Utc>) -> DrawWindow {
        self.draw_times(now).next
    }

    pub fn timeline(&self, now: DateTime<Utc>) -> Timeline {
        let times = self.draw_times(now);
        Timeline {
            current_window: times.current,
            next_window: times.next,
            countdown: countdown(now, times.next),
            registration_week: registration_week(times.next, &self.zone),
        }
    }
}

/// Everything a view needs to show where the week stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub current_window: DrawWindow,
    pub next_window: DrawWindow,
    pub countdown: Countdown,
    pub registration_week: RegistrationWeek,
}
