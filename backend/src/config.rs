//! Application configuration.
//!
//! Reads the `[lottery]` and `[server]` sections of `lottery.toml` and applies
//! environment overrides. Storage settings live in
//! [`RepositoryConfig`](crate::db::RepositoryConfig).
//!
//! # Environment Variables
//!
//! - `LOTTERY_TIMEZONE`: IANA zone name (default: Europe/Bucharest)
//! - `LOTTERY_CUTOFF_WEEKDAY`: weekday the window turns over (default: Mon)
//! - `LOTTERY_CUTOFF_TIME`: local time of the turnover, `HH:MM` or `HH:MM:SS` (default: 05:00)
//! - `LOTTERY_WINNER_CAP` / `LOTTERY_RESERVE_CAP`: list sizes (default: 15 / 10)
//! - `ADMIN_KEYWORD`: shared secret for admin routes (admin disabled when unset)
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:8080)

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::db::find_config_file;
use crate::models::{DrawCaps, DrawSchedule, WeeklyCutoff, DEFAULT_TIMEZONE};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub lottery: LotterySettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// When the weekly draw happens and how many places it hands out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LotterySettings {
    pub timezone: String,
    pub cutoff_weekday: String,
    pub cutoff_time: String,
    pub winner_cap: usize,
    pub reserve_cap: usize,
}

impl Default for LotterySettings {
    fn default() -> Self {
        let caps = DrawCaps::default();
        Self {
            timezone: DEFAULT_TIMEZONE.name().to_string(),
            cutoff_weekday: "Mon".to_string(),
            cutoff_time: "05:00".to_string(),
            winner_cap: caps.winners,
            reserve_cap: caps.reserves,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Shared secret required on admin routes. `None` disables them.
    pub admin_keyword: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            admin_keyword: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::invalid(key, &raw, e.to_string())),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Configuration from `lottery.toml` if one is found, otherwise defaults,
    /// with environment overrides applied and the result validated.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match find_config_file() {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.draw_schedule()?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(tz) = std::env::var("LOTTERY_TIMEZONE") {
            self.lottery.timezone = tz;
        }
        if let Ok(weekday) = std::env::var("LOTTERY_CUTOFF_WEEKDAY") {
            self.lottery.cutoff_weekday = weekday;
        }
        if let Ok(time) = std::env::var("LOTTERY_CUTOFF_TIME") {
            self.lottery.cutoff_time = time;
        }
        if let Some(cap) = parse_env("LOTTERY_WINNER_CAP")? {
            self.lottery.winner_cap = cap;
        }
        if let Some(cap) = parse_env("LOTTERY_RESERVE_CAP")? {
            self.lottery.reserve_cap = cap;
        }
        if let Ok(keyword) = std::env::var("ADMIN_KEYWORD") {
            self.server.admin_keyword = Some(keyword);
        }
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_env("PORT")? {
            self.server.port = port;
        }
        Ok(self)
    }

    /// The lottery settings as a [`DrawSchedule`].
    pub fn draw_schedule(&self) -> Result<DrawSchedule, ConfigError> {
        self.lottery.to_draw_schedule()
    }

    /// Admin keyword, ignoring an empty value.
    pub fn admin_key(&self) -> Option<String> {
        self.server
            .admin_keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl LotterySettings {
    pub fn to_draw_schedule(&self) -> Result<DrawSchedule, ConfigError> {
        let zone = self.timezone.trim().parse::<Tz>().map_err(|e| {
            ConfigError::invalid("lottery.timezone", &self.timezone, e.to_string())
        })?;

        let weekday = self.cutoff_weekday.trim().parse::<Weekday>().map_err(|_| {
            ConfigError::invalid(
                "lottery.cutoff_weekday",
                &self.cutoff_weekday,
                "expected a weekday name such as Mon or Monday",
            )
        })?;

        let time = parse_cutoff_time(&self.cutoff_time)?;

        if self.winner_cap == 0 {
            return Err(ConfigError::invalid(
                "lottery.winner_cap",
                "0",
                "must be at least 1",
            ));
        }

        Ok(DrawSchedule::new(
            zone,
            WeeklyCutoff::new(weekday, time),
            DrawCaps {
                winners: self.winner_cap,
                reserves: self.reserve_cap,
            },
        ))
    }
}

fn parse_cutoff_time(raw: &str) -> Result<NaiveTime, ConfigError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|e| ConfigError::invalid("lottery.cutoff_time", raw, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gym_schedule() {
        let schedule = AppConfig::default().draw_schedule().unwrap();
        assert_eq!(schedule, DrawSchedule::default());
    }

    #[test]
    fn test_parse_full_file() {
        let toml = r#"
[repository]
type = "local"

[lottery]
timezone = "Europe/London"
cutoff_weekday = "Friday"
cutoff_time = "18:30"
winner_cap = 8
reserve_cap = 4

[server]
port = 3000
admin_keyword = "belay"
"#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        let schedule = config.draw_schedule().unwrap();
        assert_eq!(schedule.zone, chrono_tz::Europe::London);
        assert_eq!(schedule.cutoff.weekday, Weekday::Fri);
        assert_eq!(schedule.cutoff.time, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(schedule.caps, DrawCaps { winners: 8, reserves: 4 });
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.admin_key().as_deref(), Some("belay"));
    }

    #[test]
    fn test_cutoff_time_with_seconds() {
        assert_eq!(
            parse_cutoff_time("05:00:30").unwrap(),
            NaiveTime::from_hms_opt(5, 0, 30).unwrap()
        );
        assert!(parse_cutoff_time("5 o'clock").is_err());
    }

    #[test]
    fn test_rejects_unknown_zone() {
        let mut config = AppConfig::default();
        config.lottery.timezone = "Mars/Olympus".to_string();
        let err = config.draw_schedule().unwrap_err();
        assert!(err.to_string().contains("lottery.timezone"));
    }

    #[test]
    fn test_blank_admin_keyword_disables_admin() {
        let mut config = AppConfig::default();
        config.server.admin_keyword = Some("   ".to_string());
        assert_eq!(config.admin_key(), None);
    }
}
