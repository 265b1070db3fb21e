#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Europe::Bucharest;

use gym_lottery::db::repository::FullRepository;
use gym_lottery::models::{DrawSchedule, Registrant, RegistrationForm};
use gym_lottery::services::register;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Access to the process environment is serialized across tests, and the
/// previous values are restored even if `f` panics.
///
/// `Some(v)` sets a variable, `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::apply(changes);
    f()
}

struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let saved = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { saved }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.saved.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Wall-clock time in the gym's zone, as UTC.
pub fn bucharest(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Bucharest
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("unambiguous local time")
        .with_timezone(&Utc)
}

/// Tuesday 2025-03-11 10:00 local: registrations go to the window opening
/// Monday 2025-03-17 05:00.
pub fn registration_day() -> DateTime<Utc> {
    bucharest(2025, 3, 11, 10, 0)
}

/// Tuesday 2025-03-18 10:00 local: the 2025-03-17 window has closed.
pub fn draw_day() -> DateTime<Utc> {
    bucharest(2025, 3, 18, 10, 0)
}

pub fn form(i: usize) -> RegistrationForm {
    RegistrationForm::new(
        format!("S{:04}", i),
        format!("First{}", i),
        format!("Last{}", i),
        format!("07{:08}", i),
    )
}

/// Register `n` distinct students at `now`.
pub async fn register_many<R: FullRepository + ?Sized>(
    repo: &R,
    schedule: &DrawSchedule,
    n: usize,
    now: DateTime<Utc>,
) -> Vec<Registrant> {
    let mut stored = Vec::with_capacity(n);
    for i in 0..n {
        stored.push(
            register(repo, schedule, &form(i), now)
                .await
                .expect("registration accepted"),
        );
    }
    stored
}
