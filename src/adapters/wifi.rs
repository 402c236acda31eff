//! WiFi station-mode adapter.
//!
//! Associates with the configured access point, captures the
//! [`NetworkIdentity`] once the interface has an address, and provides the
//! radio-backed [`LinkQualityPort`] used by the RSSI poller.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Association policy
//!
//! Boot cannot serve anything useful without a link, so association is
//! retried until it succeeds, waiting an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) between attempts.

use core::fmt;
use std::time::Duration;

use log::{info, warn};

use crate::app::ports::LinkQualityPort;
use crate::error::LinkError;
use crate::identity::{MacAddress, NameString, NetworkIdentity, format_mac, hostname_from_mac};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    /// The interface is up but its address or MAC could not be read.
    NetifFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::NetifFailed => write!(f, "station interface query failed"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

/// Delay sequence between association attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    secs: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }
}

impl Backoff {
    /// Current delay; the following call returns double, up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let d = Duration::from_secs(u64::from(self.secs));
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
        d
    }

    pub fn reset(&mut self) {
        self.secs = INITIAL_BACKOFF_SECS;
    }
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Station
// ───────────────────────────────────────────────────────────────

pub struct WifiStation {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    /// Configured hostname, or derived from the MAC before the first attempt.
    hostname: NameString,
    backoff: Backoff,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: counts platform_connect() calls for deterministic failures.
    #[cfg(not(target_os = "espidf"))]
    sim_connect_counter: u32,
}

impl WifiStation {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            hostname: NameString::new(),
            backoff: Backoff::default(),
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            hostname: NameString::new(),
            backoff: Backoff::default(),
            sim_connect_counter: 0,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Validate and store credentials. An empty `hostname` is replaced by
    /// the MAC-derived default when connecting.
    pub fn set_credentials(&mut self, ssid: &str, password: &str, hostname: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        self.hostname.clear();
        // NameString and the config hostname share a capacity.
        let _ = self.hostname.push_str(hostname);
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Associate, retrying with backoff until the interface is up.
    pub fn connect_until_up(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.hostname.is_empty() {
            let mac = self.platform_mac()?;
            self.hostname = hostname_from_mac(&mac);
        }
        self.platform_prepare()?;

        info!("WiFi: connecting to '{}' as '{}'", self.ssid, self.hostname);
        self.state = WifiState::Connecting;
        let mut attempt = 0;
        loop {
            match self.platform_connect() {
                Ok(()) => {
                    self.state = WifiState::Connected;
                    self.backoff.reset();
                    info!("WiFi: connected after {} retries", attempt);
                    return Ok(());
                }
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    warn!(
                        "WiFi: attempt {} failed ({}), retrying in {}s",
                        attempt + 1,
                        e,
                        delay.as_secs()
                    );
                    attempt += 1;
                    self.state = WifiState::Reconnecting { attempt };
                    std::thread::sleep(delay);
                }
            }
        }
    }

    /// IP, MAC, SSID and hostname of the associated station.
    pub fn network_identity(&self) -> Result<NetworkIdentity, ConnectivityError> {
        if self.state != WifiState::Connected {
            return Err(ConnectivityError::ConnectionFailed);
        }
        let ip = self.platform_ip()?;
        let mac = format_mac(&self.platform_mac()?);
        NetworkIdentity::new(&ip, &mac, &self.ssid, &self.hostname)
            .map_err(|_| ConnectivityError::NetifFailed)
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_prepare(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        self.wifi
            .set_configuration(&conf)
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        self.wifi
            .wifi_mut()
            .sta_netif_mut()
            .set_hostname(&self.hostname)
            .map_err(|_| ConnectivityError::NetifFailed)?;
        self.wifi.start().map_err(|_| ConnectivityError::ConnectionFailed)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_prepare(&mut self) -> Result<(), ConnectivityError> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let result = self
            .wifi
            .connect()
            .and_then(|()| self.wifi.wait_netif_up());
        if let Err(e) = result {
            warn!("WiFi(espidf): {}", e);
            let _ = self.wifi.disconnect();
            return Err(ConnectivityError::ConnectionFailed);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim_connect_counter = self.sim_connect_counter.wrapping_add(1);
        // The 3rd, 13th, 23rd... attempts fail to exercise the retry path.
        if self.sim_connect_counter % 10 == 3 {
            warn!("WiFi(sim): simulated association failure (attempt {})", self.sim_connect_counter);
            return Err(ConnectivityError::ConnectionFailed);
        }
        info!("WiFi(sim): connected to '{}' (attempt {})", self.ssid, self.sim_connect_counter);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_mac(&self) -> Result<MacAddress, ConnectivityError> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_mac()
            .map_err(|_| ConnectivityError::NetifFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_mac(&self) -> Result<MacAddress, ConnectivityError> {
        Ok([0x02, 0x00, 0x00, 0x5e, 0x10, 0x01])
    }

    #[cfg(target_os = "espidf")]
    fn platform_ip(&self) -> Result<String, ConnectivityError> {
        let info = self
            .wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .map_err(|_| ConnectivityError::NetifFailed)?;
        Ok(info.ip.to_string())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_ip(&self) -> Result<String, ConnectivityError> {
        Ok("192.168.4.2".to_owned())
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiStation {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Link quality
// ───────────────────────────────────────────────────────────────

/// RSSI of the currently associated access point.
pub struct StaLinkQuality {
    #[cfg(not(target_os = "espidf"))]
    sim_tick: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
}

impl StaLinkQuality {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            sim_tick: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_associated: true,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_associated(&mut self, associated: bool) {
        self.sim_associated = associated;
    }
}

impl Default for StaLinkQuality {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
impl LinkQualityPort for StaLinkQuality {
    fn query_rssi(&mut self) -> Result<i32, LinkError> {
        use esp_idf_svc::sys::{ESP_ERR_WIFI_NOT_CONNECT, ESP_OK, esp_wifi_sta_get_ap_info, wifi_ap_record_t};

        let mut ap_info = wifi_ap_record_t::default();
        // SAFETY: `ap_info` is a valid, exclusively borrowed out-parameter.
        let rc = unsafe { esp_wifi_sta_get_ap_info(&mut ap_info) };
        match rc {
            rc if rc == ESP_OK as i32 => Ok(i32::from(ap_info.rssi)),
            rc if rc == ESP_ERR_WIFI_NOT_CONNECT as i32 => Err(LinkError::NotAssociated),
            rc => Err(LinkError::QueryFailed(rc)),
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl LinkQualityPort for StaLinkQuality {
    fn query_rssi(&mut self) -> Result<i32, LinkError> {
        if !self.sim_associated {
            return Err(LinkError::NotAssociated);
        }
        // Oscillate between -66 and -55 dBm.
        self.sim_tick = self.sim_tick.wrapping_add(1);
        Ok(-60 + (self.sim_tick % 12) as i32 - 6)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
