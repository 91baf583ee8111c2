use crate::errors::{EngineError, EngineResult};
use crate::market::fetcher::{DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS};
use crate::models::volatility::VolatilityEstimator;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub yahoo_base_url: String,
    pub http_timeout: Duration,
    pub history_period: String,
    pub history_interval: String,
    pub rate_symbol: String,
    pub rate_period: String,
    pub max_attempts: u32,
    pub backoff: Duration,
    pub periods_per_year: f64,
    pub rate_bounds: RateBounds,
}

/// Plausible range for the decimal risk-free rate derived from the proxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for RateBounds {
    fn default() -> Self {
        Self { min: -0.05, max: 0.25 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            http_timeout: Duration::from_secs(10),
            history_period: "1y".to_string(),
            history_interval: "1d".to_string(),
            rate_symbol: "^TNX".to_string(),
            rate_period: "3mo".to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            periods_per_year: VolatilityEstimator::default().periods_per_year(),
            rate_bounds: RateBounds::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to `Default`.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let history_interval = lookup("HISTORY_INTERVAL").unwrap_or(defaults.history_interval);

        let periods_per_year = match lookup("TRADING_PERIODS_PER_YEAR") {
            Some(v) => parse("TRADING_PERIODS_PER_YEAR", &v)?,
            None => VolatilityEstimator::for_interval(&history_interval)?.periods_per_year(),
        };

        let max_attempts: u32 = match lookup("FETCH_MAX_ATTEMPTS") {
            Some(v) => parse("FETCH_MAX_ATTEMPTS", &v)?,
            None => defaults.max_attempts,
        };
        if max_attempts == 0 {
            return Err(EngineError::Config("FETCH_MAX_ATTEMPTS must be >= 1".into()));
        }

        let backoff = match lookup("FETCH_BACKOFF_SECS") {
            Some(v) => seconds("FETCH_BACKOFF_SECS", &v)?,
            None => defaults.backoff,
        };

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(v) => seconds("HTTP_TIMEOUT_SECS", &v)?,
            None => defaults.http_timeout,
        };

        let rate_bounds = RateBounds {
            min: match lookup("RATE_MIN") {
                Some(v) => parse("RATE_MIN", &v)?,
                None => defaults.rate_bounds.min,
            },
            max: match lookup("RATE_MAX") {
                Some(v) => parse("RATE_MAX", &v)?,
                None => defaults.rate_bounds.max,
            },
        };
        // Also rejects NaN on either side.
        if rate_bounds.min.partial_cmp(&rate_bounds.max) != Some(std::cmp::Ordering::Less) {
            return Err(EngineError::Config(format!(
                "RATE_MIN ({}) must be below RATE_MAX ({})",
                rate_bounds.min, rate_bounds.max
            )));
        }

        Ok(Self {
            yahoo_base_url: lookup("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            http_timeout,
            history_period: lookup("HISTORY_PERIOD").unwrap_or(defaults.history_period),
            history_interval,
            rate_symbol: lookup("RATE_SYMBOL").unwrap_or(defaults.rate_symbol),
            rate_period: lookup("RATE_PERIOD").unwrap_or(defaults.rate_period),
            max_attempts,
            backoff,
            periods_per_year,
            rate_bounds,
        })
    }
}

fn parse<T>(key: &str, value: &str) -> EngineResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| EngineError::Config(format!("{key}: {e}")))
}

fn seconds(key: &str, value: &str) -> EngineResult<Duration> {
    let secs: f64 = parse(key, value)?;
    Duration::try_from_secs_f64(secs).map_err(|e| EngineError::Config(format!("{key}: {e}")))
}
