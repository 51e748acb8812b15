use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub push: PushConfig,
}

/// Where the classification backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Timings of the live scan/guess/reveal loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,
    #[serde(default = "default_availability_retry_ms")]
    pub availability_retry_ms: u64,
    #[serde(default = "default_three_secs")]
    pub processing_secs: u32,
    #[serde(default = "default_guess_secs")]
    pub guess_secs: u32,
    #[serde(default = "default_three_secs")]
    pub reveal_secs: u32,
    #[serde(default = "default_three_secs")]
    pub cooldown_secs: u32,
    #[serde(default = "default_three_secs")]
    pub unknown_prompt_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Confidence pre-filled in the edit dialog.
    #[serde(default = "default_confidence")]
    pub default_confidence: f64,
}

/// Optional server push channel.  When `events_url` is unset the client
/// watches `/api/system_status` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_url: Option<String>,
    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,
    #[serde(default = "default_fallback_poll_ms")]
    pub fallback_poll_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            monitor_interval_ms: default_monitor_interval_ms(),
            availability_retry_ms: default_availability_retry_ms(),
            processing_secs: default_three_secs(),
            guess_secs: default_guess_secs(),
            reveal_secs: default_three_secs(),
            cooldown_secs: default_three_secs(),
            unknown_prompt_secs: default_three_secs(),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            default_confidence: default_confidence(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            events_url: None,
            reload_delay_ms: default_reload_delay_ms(),
            fallback_poll_ms: default_fallback_poll_ms(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    pub fn availability_retry(&self) -> Duration {
        Duration::from_millis(self.availability_retry_ms)
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_monitor_interval_ms() -> u64 {
    1000
}

fn default_availability_retry_ms() -> u64 {
    2000
}

fn default_three_secs() -> u32 {
    3
}

fn default_guess_secs() -> u32 {
    5
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_confidence() -> f64 {
    95.0
}

fn default_reload_delay_ms() -> u64 {
    2000
}

fn default_fallback_poll_ms() -> u64 {
    1000
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
