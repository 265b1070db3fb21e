use super::*;
use chrono::{FixedOffset, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Europe::Bucharest;

fn bucharest(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<chrono_tz::Tz> {
    Bucharest.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn local(window: DrawWindow) -> DateTime<chrono_tz::Tz> {
    window.in_zone(&Bucharest)
}

#[test]
fn test_tuesday_morning_uses_this_weeks_monday() {
    // 2025-03-11 is a Tuesday.
    let now = bucharest(2025, 3, 11, 10, 0);
    let times = compute_draw_times(&now, &WeeklyCutoff::default());

    assert_eq!(local(times.current), bucharest(2025, 3, 10, 5, 0));
    assert_eq!(local(times.next), bucharest(2025, 3, 17, 5, 0));
}

#[test]
fn test_monday_before_cutoff_belongs_to_previous_week() {
    let now = bucharest(2025, 3, 10, 4, 59);
    let times = compute_draw_times(&now, &WeeklyCutoff::default());

    assert_eq!(local(times.current), bucharest(2025, 3, 3, 5, 0));
    assert_eq!(local(times.next), bucharest(2025, 3, 10, 5, 0));
}

#[test]
fn test_exactly_at_cutoff_opens_new_window() {
    let now = bucharest(2025, 3, 10, 5, 0);
    let times = compute_draw_times(&now, &WeeklyCutoff::default());

    assert_eq!(times.current.start(), now.with_timezone(&Utc));
    assert_eq!(local(times.next), bucharest(2025, 3, 17, 5, 0));
}

#[test]
fn test_sunday_night_still_in_current_week() {
    let now = bucharest(2025, 3, 16, 23, 59);
    let times = compute_draw_times(&now, &WeeklyCutoff::default());

    assert_eq!(local(times.current), bucharest(2025, 3, 10, 5, 0));
    assert_eq!(local(times.next), bucharest(2025, 3, 17, 5, 0));
}

#[test]
fn test_zone_of_input_decides_local_date() {
    // Sunday 23:30 UTC is already Monday 01:30 in Bucharest (winter time).
    let utc = Utc.with_ymd_and_hms(2025, 1, 12, 23, 30, 0).unwrap();
    let times = compute_draw_times(&utc.with_timezone(&Bucharest), &WeeklyCutoff::default());

    assert_eq!(local(times.current), bucharest(2025, 1, 6, 5, 0));
    assert_eq!(local(times.next), bucharest(2025, 1, 13, 5, 0));
}

#[test]
fn test_windows_keep_wall_clock_across_dst_change() {
    // Clocks go forward on 2025-03-30; the window after it still opens at 05:00 local.
    let now = bucharest(2025, 3, 26, 12, 0);
    let times = compute_draw_times(&now, &WeeklyCutoff::default());

    assert_eq!(local(times.current).hour(), 5);
    assert_eq!(local(times.next).hour(), 5);
    assert_eq!(
        local(times.next).date_naive() - local(times.current).date_naive(),
        TimeDelta::days(7)
    );
    assert_eq!(times.next.start() - times.current.start(), TimeDelta::hours(167));
}

#[test]
fn test_next_window_matches_following_current_window() {
    let now = bucharest(2025, 10, 22, 9, 0);
    let times = compute_draw_times(&now, &WeeklyCutoff::default());
    let later = compute_draw_times(&times.next.in_zone(&Bucharest), &WeeklyCutoff::default());

    assert_eq!(later.current, times.next);
}

#[test]
fn test_fixed_offset_windows_are_exactly_seven_days_apart() {
    let zone = FixedOffset::east_opt(2 * 3600).unwrap();
    let now = zone.with_ymd_and_hms(2024, 2, 29, 18, 45, 0).unwrap();
    let times = compute_draw_times(&now, &WeeklyCutoff::default());

    assert_eq!(times.next.start() - times.current.start(), TimeDelta::days(7));
    assert!(times.current.start() <= now.with_timezone(&Utc));
    assert!(now.with_timezone(&Utc) < times.next.start());
}

#[test]
fn test_custom_cutoff_weekday() {
    let cutoff = WeeklyCutoff::new(Weekday::Fri, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
    // Thursday: the previous Friday's cutoff is current.
    let now = bucharest(2025, 3, 13, 20, 0);
    let times = compute_draw_times(&now, &cutoff);

    assert_eq!(local(times.current), bucharest(2025, 3, 7, 18, 30));
    assert_eq!(local(times.next), bucharest(2025, 3, 14, 18, 30));
}

#[test]
fn test_cutoff_inside_dst_gap_moves_forward() {
    // 03:00 does not exist in Bucharest on 2025-03-30 (a Sunday).
    let cutoff = WeeklyCutoff::new(Weekday::Sun, NaiveTime::from_hms_opt(3, 0, 0).unwrap());
    let now = bucharest(2025, 3, 30, 12, 0);
    let times = compute_draw_times(&now, &cutoff);

    assert_eq!(local(times.current), bucharest(2025, 3, 30, 4, 0));
}

#[test]
fn test_draw_window_epoch_round_trip_truncates_subseconds() {
    let start = Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap() + TimeDelta::milliseconds(250);
    let window = DrawWindow::new(start);

    assert_eq!(window.epoch_seconds(), 1_741_575_600);
    assert_eq!(DrawWindow::from_epoch_seconds(1_741_575_600), Some(window));
}

#[test]
fn test_draw_window_serializes_as_epoch_seconds() {
    let window = DrawWindow::from_epoch_seconds(1_741_575_600).unwrap();
    let json = serde_json::to_string(&window).unwrap();
    assert_eq!(json, "1741575600");

    let back: DrawWindow = serde_json::from_str(&json).unwrap();
    assert_eq!(back, window);
}

#[test]
fn test_has_started() {
    let window = DrawWindow::from_epoch_seconds(1_000).unwrap();
    assert!(!window.has_started(DateTime::from_timestamp(999, 0).unwrap()));
    assert!(window.has_started(DateTime::from_timestamp(1_000, 0).unwrap()));
}

#[test]
fn test_countdown_splits_remaining_time() {
    let next = DrawWindow::from_epoch_seconds(10 * 86_400).unwrap();
    let now = DateTime::from_timestamp(10 * 86_400 - (2 * 86_400 + 3 * 3_600 + 4 * 60 + 59), 0).unwrap();

    assert_eq!(
        countdown(now, next),
        Countdown {
            days: 2,
            hours: 3,
            minutes: 4
        }
    );
}

#[test]
fn test_countdown_never_negative() {
    let next = DrawWindow::from_epoch_seconds(100).unwrap();
    let now = DateTime::from_timestamp(200, 0).unwrap();
    assert_eq!(
        countdown(now, next),
        Countdown {
            days: 0,
            hours: 0,
            minutes: 0
        }
    );
}

#[test]
fn test_registration_week_spans_seven_days() {
    let next = DrawWindow::new(bucharest(2025, 3, 17, 5, 0).with_timezone(&Utc));
    let week = registration_week(next, &Bucharest);

    assert_eq!(week.start, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
    assert_eq!(week.end, NaiveDate::from_ymd_opt(2025, 3, 23).unwrap());
}

#[test]
fn test_calendar_limits_do_not_panic() {
    let cutoff = WeeklyCutoff::default();
    for instant in [DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC] {
        let times = compute_draw_times(&instant, &cutoff);
        assert!(times.current <= times.next);
        let week = registration_week(times.next, &Utc);
        assert!(week.start <= week.end);
    }
}
