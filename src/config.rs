use std::path::Path;
use std::time::Duration;

use outpin::VirtualKey;
use serde::Deserialize;

/// Demo configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// event loop polling interval in milliseconds
    poll_interval_ms: u64,
    /// the LED driven by the repeating toggle
    pub repeat_led: RepeatLedConfig,
    /// the LED driven by the auto-off toggle
    pub timeout_led: TimeoutLedConfig,
}

impl AppConfig {
    /// Load configuration from the specified file path
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {:?}: {}", path, e))?;
        let config: AppConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {:?}: {}", path, e))?;
        Ok(config)
    }

    /// Polling interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Configuration for the repeating LED
#[derive(Debug, Clone, Deserialize)]
pub struct RepeatLedConfig {
    /// output line identifier, e.g. "BCM6"
    pub line: String,
    /// virtual key the driver's transitions are reported as
    pub key: VirtualKey,
    debounce_ms: u64,
    /// stop the repeat after this many observed presses
    pub press_limit: u32,
}

impl RepeatLedConfig {
    /// Minimum interval between accepted immediate toggles
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Configuration for the auto-off LED
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutLedConfig {
    /// output line identifier, e.g. "BCM5"
    pub line: String,
    /// virtual key the driver's transitions are reported as
    pub key: VirtualKey,
    timeout_ms: u64,
}

impl TimeoutLedConfig {
    /// Delay before the automatic flip-back
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
