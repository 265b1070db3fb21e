//! Tests for config: lottery.toml parsing and environment overrides.

mod support;

use std::io::Write;

use chrono::{NaiveTime, Weekday};
use gym_lottery::config::{AppConfig, ConfigError};
use gym_lottery::models::{DrawCaps, DrawSchedule};

const LOTTERY_VARS: [&str; 8] = [
    "LOTTERY_TIMEZONE",
    "LOTTERY_CUTOFF_WEEKDAY",
    "LOTTERY_CUTOFF_TIME",
    "LOTTERY_WINNER_CAP",
    "LOTTERY_RESERVE_CAP",
    "ADMIN_KEYWORD",
    "HOST",
    "PORT",
];

fn cleared_env() -> Vec<(&'static str, Option<&'static str>)> {
    LOTTERY_VARS.iter().map(|k| (*k, None)).collect()
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[lottery]
cutoff_weekday = "sun"
cutoff_time = "20:15"
reserve_cap = 0

[server]
host = "127.0.0.1"
admin_keyword = "carabiner"
"#
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    let schedule = config.draw_schedule().unwrap();
    assert_eq!(schedule.zone, chrono_tz::Europe::Bucharest);
    assert_eq!(schedule.cutoff.weekday, Weekday::Sun);
    assert_eq!(schedule.cutoff.time, NaiveTime::from_hms_opt(20, 15, 0).unwrap());
    assert_eq!(schedule.caps, DrawCaps { winners: 15, reserves: 0 });
    assert_eq!(config.bind_address(), "127.0.0.1:8080");
    assert_eq!(config.admin_key().as_deref(), Some("carabiner"));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = AppConfig::from_file("/nonexistent/lottery.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let err = AppConfig::from_toml_str("[lottery\nwinner_cap = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_env_overrides() {
    let mut env = cleared_env();
    env.extend([
        ("LOTTERY_TIMEZONE", Some("UTC")),
        ("LOTTERY_CUTOFF_WEEKDAY", Some("Wednesday")),
        ("LOTTERY_CUTOFF_TIME", Some("07:45:00")),
        ("LOTTERY_WINNER_CAP", Some("20")),
        ("ADMIN_KEYWORD", Some("quickdraw")),
        ("PORT", Some("9000")),
    ]);

    support::with_scoped_env(&env, || {
        let config = AppConfig::default().with_env_overrides().unwrap();
        let schedule = config.draw_schedule().unwrap();
        assert_eq!(schedule.zone, chrono_tz::UTC);
        assert_eq!(schedule.cutoff.weekday, Weekday::Wed);
        assert_eq!(schedule.cutoff.time, NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert_eq!(schedule.caps.winners, 20);
        assert_eq!(schedule.caps.reserves, 10);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.admin_key().as_deref(), Some("quickdraw"));
    });
}

#[test]
fn test_invalid_numeric_env_is_reported() {
    let mut env = cleared_env();
    env.push(("LOTTERY_RESERVE_CAP", Some("ten")));

    support::with_scoped_env(&env, || {
        let err = AppConfig::default().with_env_overrides().unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, "LOTTERY_RESERVE_CAP");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {}", other),
        }
    });
}

#[test]
fn test_invalid_weekday_and_zero_winners() {
    let mut config = AppConfig::default();
    config.lottery.cutoff_weekday = "Caturday".to_string();
    assert!(config.draw_schedule().is_err());

    let mut config = AppConfig::default();
    config.lottery.winner_cap = 0;
    assert!(config.draw_schedule().is_err());
}

#[test]
fn test_no_overrides_keeps_defaults() {
    support::with_scoped_env(&cleared_env(), || {
        let config = AppConfig::default().with_env_overrides().unwrap();
        assert_eq!(config.draw_schedule().unwrap(), DrawSchedule::default());
        assert_eq!(config.admin_key(), None);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    });
}
