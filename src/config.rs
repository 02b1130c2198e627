//! Configuration for the verification pipeline
//!
//! Loaded from a TOML file, with environment variable overrides for the
//! uniqueness-store knobs. The core never reads configuration itself; it is
//! handed a config at composition time.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tuning for the uniqueness store's bounded-memory eviction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UniquenessStoreConfig {
    /// Entry count ceiling; oldest entries are evicted past this
    pub size_threshold: usize,
    /// Maximum entry age before time-based eviction
    #[serde(with = "duration_millis")]
    pub time_threshold: Duration,
    /// False-positive probability for the Bloom filter strategy
    pub bloom_fpp: f64,
}

impl Default for UniquenessStoreConfig {
    fn default() -> Self {
        UniquenessStoreConfig {
            size_threshold: 10_000,
            time_threshold: Duration::from_millis(300_000), // 5 minutes
            bloom_fpp: 0.01,
        }
    }
}

impl UniquenessStoreConfig {
    /// Configuration for tests (small thresholds, fast eviction)
    pub fn test() -> Self {
        UniquenessStoreConfig {
            size_threshold: 100,
            time_threshold: Duration::from_millis(1000),
            bloom_fpp: 0.01,
        }
    }

    pub(crate) fn time_threshold_ms(&self) -> u64 {
        self.time_threshold.as_millis() as u64
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.size_threshold == 0 {
            return Err(ConfigError::InvalidValue(
                "size_threshold must be at least 1".to_string(),
            ));
        }
        if !(self.bloom_fpp > 0.0 && self.bloom_fpp < 1.0) {
            return Err(ConfigError::InvalidValue(format!(
                "bloom_fpp must be in (0, 1), got {}",
                self.bloom_fpp
            )));
        }
        Ok(())
    }
}

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub uniqueness: UniquenessStoreConfig,
}

impl CheckpointConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: CheckpointConfig = toml::from_str(&raw)?;
        config.uniqueness.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides:
    /// `CHECKPOINT_SIZE_THRESHOLD`, `CHECKPOINT_TIME_THRESHOLD_MILLIS`,
    /// `CHECKPOINT_BLOOM_FPP`. Unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse::<usize>("CHECKPOINT_SIZE_THRESHOLD") {
            self.uniqueness.size_threshold = v;
        }
        if let Some(v) = env_parse::<u64>("CHECKPOINT_TIME_THRESHOLD_MILLIS") {
            self.uniqueness.time_threshold = Duration::from_millis(v);
        }
        if let Some(v) = env_parse::<f64>("CHECKPOINT_BLOOM_FPP") {
            self.uniqueness.bloom_fpp = v;
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading the config file
    Io(std::io::Error),
    /// TOML parse error
    Parse(toml::de::Error),
    /// A value is out of its valid range
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Serde helper for Duration as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
