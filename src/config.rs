use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const MAX_DEBOUNCE_MS: u64 = 60 * 60 * 1000;
const MAX_AUTOSAVE_INTERVAL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub autosave: AutosaveConfig,

    #[serde(default)]
    pub resume: ResumeConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Throttle and completion tuning for the progress tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Percent at or above which a lesson counts as complete
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold_percent: f64,

    /// Minimum wall-clock gap between accepted writes for one lesson
    #[serde(default = "default_min_write_interval")]
    pub min_write_interval_secs: u64,

    #[serde(default = "default_min_percent_delta")]
    pub min_percent_delta: f64,

    #[serde(default = "default_min_time_delta")]
    pub min_time_delta_secs: f64,

    /// Quiet period used to coalesce bursts of samples
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Upper bound on how long a steady sample stream can postpone evaluation
    #[serde(default = "default_debounce_max_wait_ms")]
    pub debounce_max_wait_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_autosave_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeConfig {
    #[serde(default = "default_true")]
    pub auto_resume: bool,

    /// Saved positions below this are not worth seeking to
    #[serde(default = "default_resume_threshold")]
    pub resume_threshold_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_flush_timeout")]
    pub unload_flush_timeout_ms: u64,

    /// Total attempts for the initial resume and course loads
    #[serde(default = "default_load_attempts")]
    pub load_max_attempts: u32,

    #[serde(default = "default_load_backoff")]
    pub load_backoff_ms: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        config.validate()?;
        info!("Config loaded successfully");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.tracking.completion_threshold_percent;
        if !(0.0..=100.0).contains(&threshold) {
            bail!("completion_threshold_percent must be within 0..=100, got {threshold}");
        }
        if self.tracking.min_percent_delta < 0.0 || self.tracking.min_time_delta_secs < 0.0 {
            bail!("throttle deltas must not be negative");
        }
        if self.tracking.debounce_ms > MAX_DEBOUNCE_MS
            || self.tracking.debounce_max_wait_ms > MAX_DEBOUNCE_MS
        {
            bail!("debounce windows must not exceed {MAX_DEBOUNCE_MS}ms");
        }
        if self.autosave.enabled && self.autosave.interval_secs == 0 {
            bail!("autosave interval must be at least one second");
        }
        if self.autosave.interval_secs > MAX_AUTOSAVE_INTERVAL_SECS {
            bail!("autosave interval must not exceed {MAX_AUTOSAVE_INTERVAL_SECS}s");
        }
        if self.network.load_max_attempts == 0 {
            bail!("load_max_attempts must be at least 1");
        }
        Url::parse(&self.network.base_url)
            .with_context(|| format!("Invalid base_url {:?}", self.network.base_url))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("course-player").join("config.toml"))
    }
}

impl TrackingConfig {
    pub fn min_write_interval(&self) -> Duration {
        Duration::from_secs(self.min_write_interval_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn debounce_max_wait(&self) -> Duration {
        Duration::from_millis(self.debounce_max_wait_ms.max(self.debounce_ms))
    }
}

impl AutosaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn unload_flush_timeout(&self) -> Duration {
        Duration::from_millis(self.unload_flush_timeout_ms)
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            completion_threshold_percent: default_completion_threshold(),
            min_write_interval_secs: default_min_write_interval(),
            min_percent_delta: default_min_percent_delta(),
            min_time_delta_secs: default_min_time_delta(),
            debounce_ms: default_debounce_ms(),
            debounce_max_wait_ms: default_debounce_max_wait_ms(),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_secs: default_autosave_interval(),
        }
    }
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            auto_resume: default_true(),
            resume_threshold_secs: default_resume_threshold(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout(),
            unload_flush_timeout_ms: default_flush_timeout(),
            load_max_attempts: default_load_attempts(),
            load_backoff_ms: default_load_backoff(),
        }
    }
}

// Default value functions
fn default_completion_threshold() -> f64 { 90.0 }
fn default_min_write_interval() -> u64 { 15 }
fn default_min_percent_delta() -> f64 { 2.0 }
fn default_min_time_delta() -> f64 { 5.0 }
fn default_debounce_ms() -> u64 { 1000 }
fn default_debounce_max_wait_ms() -> u64 { 5000 }
fn default_true() -> bool { true }
fn default_autosave_interval() -> u64 { 5 }
fn default_resume_threshold() -> u64 { 5 }
fn default_base_url() -> String { "http://localhost:8080/api".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_flush_timeout() -> u64 { 2000 }
fn default_load_attempts() -> u32 { 3 }
fn default_load_backoff() -> u64 { 500 }
