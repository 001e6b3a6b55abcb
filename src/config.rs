//! Runtime configuration read from the environment (and `.env` via dotenv)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::models::RenderSurface;
use crate::services::provider_service::MockSettings;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub surface: RenderSurface,
    pub chart_output: PathBuf,
    pub mock: MockSettings,
    pub default_asset: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            surface: RenderSurface::default(),
            chart_output: PathBuf::from("chart.png"),
            mock: MockSettings::default(),
            default_asset: "bitcoin".to_string(),
        }
    }
}

impl Config {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let width = parse_or(&lookup, "CHART_WIDTH", defaults.surface.width)?;
        let height = parse_or(&lookup, "CHART_HEIGHT", defaults.surface.height)?;
        let padding = parse_or(&lookup, "CHART_PADDING", defaults.surface.padding)?;
        let ratio = parse_or(&lookup, "DEVICE_PIXEL_RATIO", defaults.surface.device_pixel_ratio)?;

        if !(padding >= 0.0) {
            return Err(invalid("CHART_PADDING", padding, "must be non-negative"));
        }
        if !(width > 2.0 * padding) {
            return Err(invalid("CHART_WIDTH", width, "must exceed twice the padding"));
        }
        if !(height > 2.0 * padding) {
            return Err(invalid("CHART_HEIGHT", height, "must exceed twice the padding"));
        }
        if !(ratio > 0.0) || !ratio.is_finite() {
            return Err(invalid("DEVICE_PIXEL_RATIO", ratio, "must be a positive number"));
        }

        let default_delay_ms = defaults.mock.delay.as_millis() as u64;
        let delay_ms: u64 = parse_or(&lookup, "FETCH_DELAY_MS", default_delay_ms)?;
        let seed = match lookup("MOCK_SEED") {
            Some(raw) if !raw.trim().is_empty() => Some(parse("MOCK_SEED", &raw)?),
            _ => None,
        };
        let strict_lookup = match lookup("MOCK_STRICT_LOOKUP") {
            Some(raw) => parse_bool("MOCK_STRICT_LOOKUP", &raw)?,
            None => defaults.mock.strict_lookup,
        };

        let chart_output = lookup("CHART_OUTPUT")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.chart_output);
        let default_asset = lookup("DEFAULT_ASSET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_asset);

        Ok(Config {
            surface: RenderSurface::new(width, height, padding).with_device_pixel_ratio(ratio),
            chart_output,
            mock: MockSettings {
                delay: Duration::from_millis(delay_ms),
                seed,
                strict_lookup,
            },
            default_asset,
        })
    }
}

fn invalid(key: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(key, raw, &e.to_string()))
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse(key, &raw),
        None => Ok(default),
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(key, raw, "expected true or false")),
    }
}
