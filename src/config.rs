//! System configuration parameters
//!
//! All tunable parameters for the SensorHub. Wi-Fi credentials and the
//! hostname can be baked in at build time through the `WIFI_SSID`,
//! `WIFI_PASSWORD` and `SENSORHUB_HOSTNAME` environment variables.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::scheduler::ScheduleMode;

/// Fallback SSID when `WIFI_SSID` is not set at build time.
const DEFAULT_SSID: &str = "sensorhub-ap";

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Wi-Fi ---
    /// Access point to associate with (1-32 printable ASCII bytes).
    pub wifi_ssid: heapless::String<32>,
    /// WPA2 passphrase (8-64 bytes), or empty for an open network.
    pub wifi_password: heapless::String<64>,
    /// Station hostname. Empty = derive from the MAC address.
    pub hostname: heapless::String<32>,

    // --- HTTP ---
    /// TCP port the HTTP server listens on.
    pub http_port: u16,
    /// Idle connection timeout enforced by the server (seconds).
    pub http_idle_timeout_secs: u16,
    /// `max-age` advertised for `/netinfo` (seconds).
    pub netinfo_max_age_secs: u32,
    /// `max-age` advertised for the embedded dashboard assets (seconds).
    pub asset_max_age_secs: u32,

    // --- Timing ---
    /// Interval between environment sensor samples (milliseconds).
    pub sensor_interval_ms: u32,
    /// Interval between RSSI queries (milliseconds).
    pub rssi_interval_ms: u32,
    /// Where the RSSI poller runs.
    pub rssi_schedule: ScheduleMode,
    /// Main-loop sleep between event-loop polls (milliseconds).
    pub poll_sleep_ms: u32,

    // --- I2C ---
    /// Bus clock in Hz.
    pub i2c_baudrate_hz: u32,
    /// SSD1306 7-bit address.
    pub display_addr: u8,
    /// BME280 7-bit address.
    pub sensor_addr: u8,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Wi-Fi
            wifi_ssid: bounded(option_env!("WIFI_SSID").unwrap_or(DEFAULT_SSID)),
            wifi_password: bounded(option_env!("WIFI_PASSWORD").unwrap_or("")),
            hostname: bounded(option_env!("SENSORHUB_HOSTNAME").unwrap_or("")),

            // HTTP
            http_port: 8091,
            http_idle_timeout_secs: 30,
            netinfo_max_age_secs: 3600, // 1 h
            asset_max_age_secs: 86_400, // 1 day

            // Timing
            sensor_interval_ms: 1000, // 1 Hz
            rssi_interval_ms: 5000,   // every 5 s
            rssi_schedule: ScheduleMode::Polled,
            poll_sleep_ms: 1,

            // I2C
            i2c_baudrate_hz: 400_000,
            display_addr: 0x3C,
            sensor_addr: 0x76,
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Boot refuses to continue on an invalid config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_ssid.is_empty() {
            return Err(ConfigError::ValidationFailed("wifi_ssid is empty"));
        }
        let pw = self.wifi_password.len();
        if pw != 0 && !(8..=64).contains(&pw) {
            return Err(ConfigError::ValidationFailed(
                "wifi_password must be empty or 8-64 bytes",
            ));
        }
        if self.http_port == 0 {
            return Err(ConfigError::ValidationFailed("http_port is 0"));
        }
        if self.sensor_interval_ms == 0 || self.rssi_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("sampling intervals must be > 0"));
        }
        if self.poll_sleep_ms >= self.rssi_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "poll_sleep_ms must be shorter than rssi_interval_ms",
            ));
        }
        if self.display_addr > 0x7F || self.sensor_addr > 0x7F {
            return Err(ConfigError::ValidationFailed("I2C addresses are 7-bit"));
        }
        if self.display_addr == self.sensor_addr {
            return Err(ConfigError::ValidationFailed(
                "display and sensor share an I2C address",
            ));
        }
        Ok(())
    }
}

/// Truncating conversion for build-time strings; over-long values are cut
/// at the capacity rather than rejected.
fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Errors from [`SystemConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
