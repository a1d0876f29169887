//! Application configuration.
//!
//! Loaded once at startup (environment plus an optional `.env` file) and
//! passed explicitly to the components that need it.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Provider backend (`gemini` or `ollama`).
pub const PROVIDER_ENV: &str = "MEDI_ASSIST_PROVIDER";
/// Model identifier.
pub const MODEL_ENV: &str = "MEDI_ASSIST_MODEL";
/// Provider base URL override.
pub const BASE_URL_ENV: &str = "MEDI_ASSIST_BASE_URL";
/// Sampling temperature.
pub const TEMPERATURE_ENV: &str = "MEDI_ASSIST_TEMPERATURE";
/// Output token budget.
pub const MAX_OUTPUT_TOKENS_ENV: &str = "MEDI_ASSIST_MAX_OUTPUT_TOKENS";
/// Provider request timeout in seconds.
pub const TIMEOUT_ENV: &str = "MEDI_ASSIST_TIMEOUT_SECS";
/// HTTP listen port.
pub const PORT_ENV: &str = "MEDI_ASSIST_PORT";
/// Enable or disable the prompt cache.
pub const CACHE_ENV: &str = "MEDI_ASSIST_CACHE";
/// Prompt cache capacity (0 = unbounded).
pub const CACHE_MAX_ENTRIES_ENV: &str = "MEDI_ASSIST_CACHE_MAX_ENTRIES";
/// Prompt cache TTL in seconds.
pub const CACHE_TTL_ENV: &str = "MEDI_ASSIST_CACHE_TTL_SECS";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    /// Unknown provider backend.
    #[error("unknown provider `{0}` (expected `gemini` or `ollama`)")]
    UnknownProvider(String),
    /// Invalid base URL.
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// A setting is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Convenience result alias for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Supported provider backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Generative Language API.
    #[default]
    Gemini,
    /// Local Ollama runtime.
    Ollama,
}

impl ProviderKind {
    /// Model used when none is configured.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::Ollama => "mistral:7b-instruct-q8_0",
        }
    }

    /// Whether the backend needs an API key.
    #[must_use]
    pub const fn requires_api_key(self) -> bool {
        matches!(self, Self::Gemini)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text-generation provider settings.
    pub provider: ProviderConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Prompt cache settings.
    pub cache: CacheConfig,
}

/// Provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend kind.
    pub kind: ProviderKind,
    /// API key, when the backend needs one.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Output token budget.
    pub max_output_tokens: Option<u32>,
    /// Request timeout.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    /// Connection timeout.
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Gemini,
            api_key: None,
            model: ProviderKind::Gemini.default_model().to_string(),
            base_url: None,
            temperature: None,
            max_output_tokens: None,
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ProviderConfig {
    /// Whether a non-blank API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

// Keep the credential out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Prompt cache settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Maximum number of entries; 0 means unbounded.
    pub max_entries: usize,
    /// Entry lifetime in seconds; `None` keeps entries for the process lifetime.
    pub ttl_seconds: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 0,
            ttl_seconds: None,
        }
    }
}

impl AppConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    /// Returns an error if a variable is malformed or validation fails.
    pub fn from_env() -> ConfigResult<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable is malformed or validation fails.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::default();

        if let Some(kind) = get(PROVIDER_ENV) {
            config.provider.kind = kind.parse()?;
            config.provider.model = config.provider.kind.default_model().to_string();
        }
        config.provider.api_key = get(API_KEY_ENV);
        if let Some(model) = get(MODEL_ENV) {
            config.provider.model = model;
        }
        config.provider.base_url = get(BASE_URL_ENV);
        config.provider.temperature = parse_opt(TEMPERATURE_ENV, get(TEMPERATURE_ENV))?;
        config.provider.max_output_tokens =
            parse_opt(MAX_OUTPUT_TOKENS_ENV, get(MAX_OUTPUT_TOKENS_ENV))?;
        if let Some(secs) = parse_opt::<u64>(TIMEOUT_ENV, get(TIMEOUT_ENV))? {
            config.provider.request_timeout = Duration::from_secs(secs);
        }

        if let Some(port) = parse_opt(PORT_ENV, get(PORT_ENV))? {
            config.server.port = port;
        }

        if let Some(flag) = get(CACHE_ENV) {
            config.cache.enabled = parse_bool(CACHE_ENV, &flag)?;
        }
        if let Some(max) = parse_opt(CACHE_MAX_ENTRIES_ENV, get(CACHE_MAX_ENTRIES_ENV))? {
            config.cache.max_entries = max;
        }
        config.cache.ttl_seconds = parse_opt(CACHE_TTL_ENV, get(CACHE_TTL_ENV))?;

        config.validate()?;
        Ok(config)
    }

    /// Set the provider backend and its default model.
    #[must_use]
    pub fn with_provider(mut self, kind: ProviderKind) -> Self {
        self.provider.kind = kind;
        self.provider.model = kind.default_model().to_string();
        self
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.provider.model = model.into();
        self
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.provider.api_key = Some(key.into());
        self
    }

    /// Enable or disable the prompt cache.
    #[must_use]
    pub const fn with_cache(mut self, enabled: bool) -> Self {
        self.cache.enabled = enabled;
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }

        if let Some(t) = self.provider.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid(format!(
                    "temperature must be within 0.0..=2.0, got {t}"
                )));
            }
        }

        if self.provider.max_output_tokens == Some(0) {
            return Err(ConfigError::Invalid(
                "max_output_tokens must be > 0".to_string(),
            ));
        }

        if self.provider.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "request timeout must be > 0".to_string(),
            ));
        }

        if self.cache.ttl_seconds == Some(0) {
            return Err(ConfigError::Invalid(
                "cache ttl must be > 0 (disable the cache instead)".to_string(),
            ));
        }

        if let Some(base_url) = &self.provider.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

fn parse_opt<T: FromStr>(key: &'static str, value: Option<String>) -> ConfigResult<Option<T>> {
    value
        .map(|v| v.parse::<T>().map_err(|_| ConfigError::InvalidValue(key, v)))
        .transpose()
}

fn parse_bool(key: &'static str, value: &str) -> ConfigResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key, value.to_string())),
    }
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.model, "gemini-1.5-flash");
        assert!(!config.provider.has_api_key());
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 0);
        assert!(config.cache.ttl_seconds.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "secret"),
            (PROVIDER_ENV, "Ollama"),
            (PORT_ENV, "8080"),
            (CACHE_ENV, "off"),
            (CACHE_MAX_ENTRIES_ENV, "100"),
            (TEMPERATURE_ENV, "0.1"),
        ]))
        .unwrap();

        assert_eq!(config.provider.kind, ProviderKind::Ollama);
        assert_eq!(config.provider.model, "mistral:7b-instruct-q8_0");
        assert_eq!(config.provider.api_key.as_deref(), Some("secret"));
        assert_eq!(config.server.port, 8080);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.provider.temperature, Some(0.1));
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = AppConfig::from_lookup(lookup(&[(API_KEY_ENV, "   ")])).unwrap();
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(PORT_ENV, "http")])),
            Err(ConfigError::InvalidValue(PORT_ENV, _))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(PROVIDER_ENV, "openai")])),
            Err(ConfigError::UnknownProvider(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(TEMPERATURE_ENV, "3.5")])),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(BASE_URL_ENV, "not a url")])),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(CACHE_TTL_ENV, "0")])),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = AppConfig::new().with_api_key("super-secret");
        let rendered = format!("{:?}", config.provider);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_config_builder() {
        let config = AppConfig::new()
            .with_provider(ProviderKind::Ollama)
            .with_model("llama3")
            .with_cache(false);
        assert_eq!(config.provider.kind, ProviderKind::Ollama);
        assert_eq!(config.provider.model, "llama3");
        assert!(!config.cache.enabled);
        assert!(!config.provider.kind.requires_api_key());
    }
}
