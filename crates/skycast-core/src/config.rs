use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file to load instead of `./skycast.toml`.
pub const CONFIG_PATH_ENV: &str = "SKYCAST_CONFIG";

/// Environment variable overriding the weather provider API key.
pub const API_KEY_ENV: &str = "SKYCAST_API_KEY";

const DEFAULT_CONFIG_FILE: &str = "skycast.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Search history database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Upstream weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Outbound mail settings for the statistics report
    #[serde(default)]
    pub mail: MailConfig,

    /// Daily statistics job settings
    #[serde(default)]
    pub stats: StatsConfig,

    /// Anonymous rate throttle settings
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("skycast.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API key for the upstream provider (may also come from SKYCAST_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the current-weather endpoint
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MailConfig {
    /// SMTP relay host
    #[serde(default)]
    pub smtp_host: String,

    /// SMTP username (optional; unauthenticated relay if empty)
    #[serde(default)]
    pub smtp_username: String,

    /// SMTP password
    #[serde(default)]
    pub smtp_password: String,

    /// Sender address for the statistics report
    #[serde(default)]
    pub from_address: String,

    /// Administrator address that receives the statistics report
    #[serde(default)]
    pub admin_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Interval between statistics job runs, in minutes (0 disables the job)
    #[serde(default = "default_stats_interval")]
    pub interval_minutes: u64,
}

fn default_stats_interval() -> u64 {
    // Once per day
    1440
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_stats_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Maximum requests per client per window
    #[serde(default = "default_throttle_max")]
    pub max_requests: u32,

    /// Window length in seconds
    #[serde(default = "default_throttle_window")]
    pub window_seconds: u64,
}

fn default_throttle_max() -> u32 {
    60
}

fn default_throttle_window() -> u64 {
    60
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_requests: default_throttle_max(),
            window_seconds: default_throttle_window(),
        }
    }
}

impl Config {
    /// Load configuration from `$SKYCAST_CONFIG`, falling back to `./skycast.toml`.
    ///
    /// A missing file yields the defaults; `SKYCAST_API_KEY` in the environment
    /// overrides the configured provider API key either way.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.weather.api_key = key;
        }

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.weather.api_key.trim().is_empty() {
            result.add_error(
                "weather.api_key",
                "Weather provider API key is required (or set SKYCAST_API_KEY)",
            );
        }

        if self.weather.base_url.trim().is_empty() {
            result.add_error("weather.base_url", "Weather provider base URL is required");
        }

        if self.throttle.window_seconds == 0 {
            result.add_error(
                "throttle.window_seconds",
                "Throttle window must be greater than 0",
            );
        }

        if self.throttle.max_requests == 0 {
            result.add_warning(
                "throttle.max_requests",
                "Throttle threshold of 0 rejects every request",
            );
        }

        if self.stats.interval_minutes == 0 {
            result.add_warning(
                "stats.interval_minutes",
                "Statistics job disabled (0 minutes)",
            );
        } else {
            if self.mail.smtp_host.trim().is_empty() {
                result.add_error(
                    "mail.smtp_host",
                    "SMTP host is required while the statistics job is enabled",
                );
            }
            if self.mail.from_address.trim().is_empty() {
                result.add_error(
                    "mail.from_address",
                    "Sender address is required while the statistics job is enabled",
                );
            }
            if self.mail.admin_address.trim().is_empty() {
                result.add_error(
                    "mail.admin_address",
                    "Administrator address is required while the statistics job is enabled",
                );
            }
            if self.stats.interval_minutes < 5 {
                result.add_warning(
                    "stats.interval_minutes",
                    "Statistics interval under 5 minutes is only useful for testing",
                );
            }
        }

        result
    }
}
