//! Process-wide configuration.
//!
//! [`ModelConfig`] is resolved once at startup from environment variables and
//! shared read-only afterwards (`Arc<ModelConfig>`). [`BridgeSettings`] holds
//! the knobs of the bridge loop itself.
//!
//! # Environment Variables
//!
//! - `GOOGLE_API_KEY` / `GENESIS_API_KEY` — provider credential (empty: fallback mode)
//! - `GENESIS_MODEL` — model name (default: `gemini-2.5-flash`)
//! - `GENESIS_TEMPERATURE` — sampling temperature (default: 0.8)
//! - `GENESIS_TOP_P` — nucleus sampling (default: 0.9)
//! - `GENESIS_TOP_K` — top-k sampling (default: 40)
//! - `GENESIS_MAX_TOKENS` — max output tokens (default: 8192)
//! - `GENESIS_REQUEST_TIMEOUT_SECS` — optional HTTP timeout for the provider
//! - `GENESIS_IDLE_PAUSE_MS` — pause taken on blank input lines (default: 100)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utilities::errors::ConfigError;

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;
/// Default nucleus sampling parameter.
pub const DEFAULT_TOP_P: f64 = 0.9;
/// Default top-k sampling parameter.
pub const DEFAULT_TOP_K: u32 = 40;
/// Default maximum output tokens.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
/// Default pause on blank input lines, in milliseconds.
pub const DEFAULT_IDLE_PAUSE_MS: u64 = 100;

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

/// Generative model configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider credential. `None` means no provider is configured.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name sent to the provider and echoed in responses.
    pub name: String,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    /// HTTP timeout for provider calls. `None` leaves calls unbounded.
    pub request_timeout: Option<Duration>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            name: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            request_timeout: None,
        }
    }
}

// The credential must never end up in logs.
impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ModelConfig {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary key lookup.
    ///
    /// Missing or empty values fall back to the defaults; present values that
    /// do not parse are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GOOGLE_API_KEY").or_else(|| non_empty("GENESIS_API_KEY"));
        let name = non_empty("GENESIS_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = parse_or(
            "GENESIS_TEMPERATURE",
            non_empty("GENESIS_TEMPERATURE"),
            DEFAULT_TEMPERATURE,
        )?;
        let top_p = parse_or("GENESIS_TOP_P", non_empty("GENESIS_TOP_P"), DEFAULT_TOP_P)?;
        let top_k = parse_or("GENESIS_TOP_K", non_empty("GENESIS_TOP_K"), DEFAULT_TOP_K)?;
        let max_output_tokens = parse_or(
            "GENESIS_MAX_TOKENS",
            non_empty("GENESIS_MAX_TOKENS"),
            DEFAULT_MAX_OUTPUT_TOKENS,
        )?;
        let request_timeout = match non_empty("GENESIS_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_value(
                "GENESIS_REQUEST_TIMEOUT_SECS",
                &raw,
            )?)),
            None => None,
        };

        Ok(Self {
            api_key,
            name,
            temperature,
            top_p,
            top_k,
            max_output_tokens,
            request_timeout,
        })
    }

    /// Whether a provider credential is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

// ---------------------------------------------------------------------------
// BridgeSettings
// ---------------------------------------------------------------------------

/// Settings for the bridge loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Pause taken when the input stream yields a blank line.
    pub idle_pause: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            idle_pause: Duration::from_millis(DEFAULT_IDLE_PAUSE_MS),
        }
    }
}

impl BridgeSettings {
    /// Resolve the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup("GENESIS_IDLE_PAUSE_MS").filter(|v| !v.trim().is_empty());
        let millis = parse_or("GENESIS_IDLE_PAUSE_MS", raw, DEFAULT_IDLE_PAUSE_MS)?;
        Ok(Self {
            idle_pause: Duration::from_millis(millis),
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_absent() {
        let config = ModelConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ModelConfig::default());
        assert!(!config.has_api_key());
        assert_eq!(config.name, "gemini-2.5-flash");
        assert_eq!(config.top_k, 40);
        assert_eq!(config.max_output_tokens, 8192);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ModelConfig::from_lookup(lookup_from(&[
            ("GENESIS_MODEL", "gemini-2.0-flash"),
            ("GENESIS_TEMPERATURE", "0.2"),
            ("GENESIS_TOP_P", "0.5"),
            ("GENESIS_TOP_K", "8"),
            ("GENESIS_MAX_TOKENS", "256"),
            ("GENESIS_REQUEST_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.name, "gemini-2.0-flash");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.top_p, 0.5);
        assert_eq!(config.top_k, 8);
        assert_eq!(config.max_output_tokens, 256);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_google_key_takes_precedence() {
        let config = ModelConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "google"),
            ("GENESIS_API_KEY", "genesis"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("google"));

        let config =
            ModelConfig::from_lookup(lookup_from(&[("GENESIS_API_KEY", "genesis")])).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("genesis"));
    }

    #[test]
    fn test_empty_key_means_fallback_mode() {
        let config = ModelConfig::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "  ")])).unwrap();
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = ModelConfig::from_lookup(lookup_from(&[("GENESIS_TOP_K", "many")]))
            .unwrap_err();
        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, "GENESIS_TOP_K");
                assert_eq!(value, "many");
            }
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ModelConfig {
            api_key: Some("secret-key".into()),
            ..ModelConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_bridge_settings() {
        let settings = BridgeSettings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.idle_pause, Duration::from_millis(100));

        let settings =
            BridgeSettings::from_lookup(lookup_from(&[("GENESIS_IDLE_PAUSE_MS", "5")])).unwrap();
        assert_eq!(settings.idle_pause, Duration::from_millis(5));

        let negative = lookup_from(&[("GENESIS_IDLE_PAUSE_MS", "-1")]);
        assert!(BridgeSettings::from_lookup(negative).is_err());
    }
}
