use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::scoring::ScoreWeights;
use crate::discovery::DiscoveryConfig;
use crate::session::SessionConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub backend: BackendSettings,
    pub collection: CollectionSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub swipe: SwipeSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub profiles: String,
    pub matches: String,
    pub quotas: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            load_timeout_secs: default_load_timeout_secs(),
        }
    }
}

fn default_retry_attempts() -> u32 { 3 }
fn default_retry_base_delay_ms() -> u64 { 200 }
fn default_load_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct SwipeSettings {
    /// Horizontal drag distance that turns a gesture into a decision.
    /// A presentation tuning parameter, not a correctness one.
    #[serde(default = "default_commit_threshold")]
    pub commit_threshold: f32,
}

impl Default for SwipeSettings {
    fn default() -> Self {
        Self {
            commit_threshold: default_commit_threshold(),
        }
    }
}

fn default_commit_threshold() -> f32 { 110.0 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_genre_weight")]
    pub genre: f64,
    #[serde(default = "default_role_complement_weight")]
    pub role_complement: f64,
    #[serde(default = "default_role_identical_weight")]
    pub role_identical: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            genre: default_genre_weight(),
            role_complement: default_role_complement_weight(),
            role_identical: default_role_identical_weight(),
            location: default_location_weight(),
        }
    }
}

impl From<WeightsConfig> for ScoreWeights {
    fn from(value: WeightsConfig) -> Self {
        Self {
            genre: value.genre,
            role_complement: value.role_complement,
            role_identical: value.role_identical,
            location: value.location,
        }
    }
}

fn default_genre_weight() -> f64 { 40.0 }
fn default_role_complement_weight() -> f64 { 30.0 }
fn default_role_identical_weight() -> f64 { 15.0 }
fn default_location_weight() -> f64 { 20.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with JAMLINK_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with JAMLINK_)
            // e.g., JAMLINK_SWIPE__COMMIT_THRESHOLD -> swipe.commit_threshold
            .add_source(
                Environment::with_prefix("JAMLINK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("JAMLINK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Session bootstrap tuning
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            retry_attempts: self.session.retry_attempts,
            retry_base_delay_ms: self.session.retry_base_delay_ms,
            load_timeout_secs: self.session.load_timeout_secs,
        }
    }

    /// Full discovery-session tuning
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            commit_threshold: self.swipe.commit_threshold,
            weights: self.scoring.weights.clone().into(),
            session: self.session_config(),
        }
    }
}
