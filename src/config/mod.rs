// src/config/mod.rs
//! Runtime settings from the environment (`.env` is loaded by the binary).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::catalog::ENV_FEEDS_PATH;
use crate::ingest::{DEFAULT_FETCH_TIMEOUT, DEFAULT_HOURS_BACK};
use crate::output::DEFAULT_OUT_DIR;
use crate::ranking::DEFAULT_TOP_N;
use crate::relevance::ENV_SCORING_PATH;

pub const ENV_HOURS_BACK: &str = "HOURS_BACK";
pub const ENV_TOP_N: &str = "TOP_N";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_OUT_DIR: &str = "DIGEST_OUT_DIR";
pub const ENV_SOURCE_WEIGHTS_PATH: &str = "DIGEST_SOURCE_WEIGHTS_PATH";

/// Upper bound for `HOURS_BACK` (one year).
pub const MAX_HOURS_BACK: i64 = 24 * 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Lookback window in hours.
    pub hours_back: i64,
    /// Per-region cap.
    pub top_n: usize,
    pub fetch_timeout: Duration,
    pub out_dir: PathBuf,
    pub feeds_path: Option<PathBuf>,
    pub scoring_path: Option<PathBuf>,
    pub source_weights_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hours_back: DEFAULT_HOURS_BACK,
            top_n: DEFAULT_TOP_N,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            feeds_path: None,
            scoring_path: None,
            source_weights_path: None,
        }
    }
}

// parse env value, warn and keep the default if it is not a valid number
fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(s) => s.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %s, %default, "invalid number, using default");
            default
        }),
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Self {
        let value = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let d = Self::default();

        let mut hours_back = parse_or(ENV_HOURS_BACK, value(ENV_HOURS_BACK), d.hours_back).max(0);
        if hours_back > MAX_HOURS_BACK {
            tracing::warn!(value = hours_back, max = MAX_HOURS_BACK, "HOURS_BACK too large, clamping");
            hours_back = MAX_HOURS_BACK;
        }
        let top_n = parse_or(ENV_TOP_N, value(ENV_TOP_N), d.top_n);
        let timeout_secs = parse_or(
            ENV_FETCH_TIMEOUT_SECS,
            value(ENV_FETCH_TIMEOUT_SECS),
            d.fetch_timeout.as_secs(),
        )
        .max(1);

        Self {
            hours_back,
            top_n,
            fetch_timeout: Duration::from_secs(timeout_secs),
            out_dir: value(ENV_OUT_DIR).map(PathBuf::from).unwrap_or(d.out_dir),
            feeds_path: value(ENV_FEEDS_PATH).map(PathBuf::from),
            scoring_path: value(ENV_SCORING_PATH).map(PathBuf::from),
            source_weights_path: value(ENV_SOURCE_WEIGHTS_PATH).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_lookup(|_| None);
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.hours_back, 48);
        assert_eq!(cfg.top_n, 18);
        assert_eq!(cfg.out_dir, PathBuf::from("out"));
    }

    #[test]
    fn values_are_parsed_and_invalid_ones_ignored() {
        let cfg = AppConfig::from_lookup(|k| match k {
            "HOURS_BACK" => Some(" 24 ".into()),
            "TOP_N" => Some("many".into()),
            "FETCH_TIMEOUT_SECS" => Some("0".into()),
            "DIGEST_OUT_DIR" => Some("/tmp/digest".into()),
            _ => None,
        });
        assert_eq!(cfg.hours_back, 24);
        assert_eq!(cfg.top_n, 18);
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(1));
        assert_eq!(cfg.out_dir, PathBuf::from("/tmp/digest"));
    }

    #[test]
    fn huge_hours_back_is_clamped() {
        let cfg = AppConfig::from_lookup(|k| match k {
            "HOURS_BACK" => Some("9223372036854775807".into()),
            _ => None,
        });
        assert_eq!(cfg.hours_back, MAX_HOURS_BACK);

        let cfg = AppConfig::from_lookup(|k| (k == "HOURS_BACK").then(|| "-5".to_string()));
        assert_eq!(cfg.hours_back, 0);
    }
}
