//! Environment-driven settings. `.env` is loaded by `main` before
//! [`Config::from_env`] runs.

use chrono::{Duration as DateSpan, NaiveDate};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::{NameMatching, PatternRule, PredictorConfig};

pub const DEFAULT_FEED_BASE_URL: &str = "https://www.mackolik.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";

/// Longest fetch window, in days, either side of today or between two
/// requested dates. One feed request goes out per day.
pub const MAX_WINDOW_DAYS: i64 = 366;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Delay applied per day index before each daily request.
    pub stagger: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FEED_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(15),
            stagger: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed: FeedConfig,
    pub predictor: PredictorConfig,
    pub lookback_days: i64,
    pub lookahead_days: i64,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            predictor: PredictorConfig::default(),
            lookback_days: 14,
            lookahead_days: 7,
            port: 3000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let feed = FeedConfig {
            base_url: get("FEED_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.feed.base_url),
            user_agent: get("FEED_USER_AGENT").unwrap_or(defaults.feed.user_agent),
            timeout: parse_or(get("FEED_TIMEOUT_SECS"), "FEED_TIMEOUT_SECS", 15u64)
                .map(Duration::from_secs)?,
            stagger: parse_or(get("FEED_STAGGER_MS"), "FEED_STAGGER_MS", 100u64)
                .map(Duration::from_millis)?,
        };

        let predictor = PredictorConfig {
            rule: parse_or(get("PATTERN_RULE"), "PATTERN_RULE", PatternRule::default())?,
            name_matching: parse_or(get("TEAM_MATCHING"), "TEAM_MATCHING", NameMatching::default())?,
            ..defaults.predictor
        };

        let lookback_days = parse_or(get("LOOKBACK_DAYS"), "LOOKBACK_DAYS", defaults.lookback_days)?;
        let lookahead_days = parse_or(get("LOOKAHEAD_DAYS"), "LOOKAHEAD_DAYS", defaults.lookahead_days)?;
        for (key, days) in [("LOOKBACK_DAYS", lookback_days), ("LOOKAHEAD_DAYS", lookahead_days)] {
            if !(0..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(ConfigError::Invalid {
                    key,
                    value: days.to_string(),
                    reason: format!("must be between 0 and {MAX_WINDOW_DAYS}"),
                });
            }
        }

        Ok(Self {
            feed,
            predictor,
            lookback_days,
            lookahead_days,
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
        })
    }

    /// Default fetch window around `today`: past results plus the fixtures ahead.
    pub fn default_window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (
            today - DateSpan::days(self.lookback_days),
            today + DateSpan::days(self.lookahead_days),
        )
    }
}

/// Whether `start..=end` is short enough to fetch: no longer than the widest
/// default window. Reversed windows are empty and always fit.
pub fn window_fits(start: NaiveDate, end: NaiveDate) -> bool {
    (end - start).num_days() <= 2 * MAX_WINDOW_DAYS
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
