use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::translation::PacingPolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Locale whose key set defines completeness for every other locale
    #[serde(default = "default_baseline_locale")]
    pub baseline_locale: String,

    /// Locales kept in sync with the baseline (the baseline included)
    #[serde(default = "default_supported_locales")]
    pub supported_locales: Vec<String>,

    /// SQLite database file; the user data directory is used when unset
    #[serde(default)]
    pub database_path: Option<String>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Base URL of the chat-completions compatible service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Service name handed to the credential supplier
    #[serde(default = "default_credential_service")]
    pub credential_service: String,

    /// Environment variable consulted for the credential
    #[serde(default = "default_credential_env_var")]
    pub credential_env_var: String,

    /// Candidate models in fallback order
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Completion budget for single-item calls
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Completion budget for batch calls
    #[serde(default = "default_batch_max_tokens")]
    pub batch_max_tokens: u32,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Timeout for single-item requests in seconds
    #[serde(default = "default_single_timeout_secs")]
    pub single_timeout_secs: u64,

    /// Timeout for batch requests in seconds
    #[serde(default = "default_batch_timeout_secs")]
    pub batch_timeout_secs: u64,

    /// Pause after a successful per-key translation, in milliseconds
    #[serde(default = "default_success_delay_ms")]
    pub success_delay_ms: u64,

    /// Pause after a failed per-key translation, in milliseconds
    #[serde(default = "default_failure_delay_ms")]
    pub failure_delay_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            credential_service: default_credential_service(),
            credential_env_var: default_credential_env_var(),
            models: default_models(),
            max_tokens: default_max_tokens(),
            batch_max_tokens: default_batch_max_tokens(),
            temperature: default_temperature(),
            single_timeout_secs: default_single_timeout_secs(),
            batch_timeout_secs: default_batch_timeout_secs(),
            success_delay_ms: default_success_delay_ms(),
            failure_delay_ms: default_failure_delay_ms(),
        }
    }
}

impl TranslationConfig {
    /// Pacing policy for the per-key translation loop
    pub fn pacing(&self) -> PacingPolicy {
        PacingPolicy::new(
            Duration::from_millis(self.success_delay_ms),
            Duration::from_millis(self.failure_delay_ms),
        )
    }

    pub fn single_timeout(&self) -> Duration {
        Duration::from_secs(self.single_timeout_secs)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_baseline_locale() -> String {
    "en".to_string()
}

fn default_supported_locales() -> Vec<String> {
    ["en", "ru", "de", "fr", "es", "zh"]
        .iter()
        .map(|l| l.to_string())
        .collect()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_credential_service() -> String {
    "openai".to_string()
}

fn default_credential_env_var() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "gpt-4o-mini".to_string(),
        "gpt-4o".to_string(),
        "gpt-3.5-turbo".to_string(),
    ]
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_batch_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.3
}

fn default_single_timeout_secs() -> u64 {
    30
}

fn default_batch_timeout_secs() -> u64 {
    60
}

fn default_success_delay_ms() -> u64 {
    3000
}

fn default_failure_delay_ms() -> u64 {
    2000
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the configuration, writing a default file first if none exists
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        for locale in &self.supported_locales {
            crate::language_utils::get_language_name(locale)
                .with_context(|| format!("Unsupported locale in configuration: {}", locale))?;
        }

        if !self.supported_locales.iter().any(|l| l == &self.baseline_locale) {
            return Err(anyhow!(
                "Baseline locale '{}' must be listed in supported_locales",
                self.baseline_locale
            ));
        }

        if self.translation.models.iter().all(|m| m.trim().is_empty()) {
            return Err(anyhow!("At least one translation model must be configured"));
        }

        url::Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;

        if self.translation.success_delay_ms == 0 || self.translation.failure_delay_ms == 0 {
            return Err(anyhow!("Pacing delays must be non-zero"));
        }

        if self.translation.single_timeout_secs == 0 || self.translation.batch_timeout_secs == 0 {
            return Err(anyhow!("Call timeouts must be non-zero"));
        }

        Ok(())
    }

    /// Locales other than the baseline, in configured order
    pub fn target_locales(&self) -> Vec<String> {
        self.supported_locales
            .iter()
            .filter(|l| **l != self.baseline_locale)
            .cloned()
            .collect()
    }

    /// Configured spelling of a supported locale
    ///
    /// An exact match wins; otherwise ISO variants of the same language and
    /// region are accepted (`fre` resolves to a configured `fr`).
    pub fn resolve_locale(&self, locale: &str) -> Option<&str> {
        self.supported_locales
            .iter()
            .find(|l| l.as_str() == locale)
            .or_else(|| {
                self.supported_locales
                    .iter()
                    .find(|l| crate::language_utils::locales_match(l, locale))
            })
            .map(String::as_str)
    }

    /// Resolve the database location
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            baseline_locale: default_baseline_locale(),
            supported_locales: default_supported_locales(),
            database_path: None,
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
