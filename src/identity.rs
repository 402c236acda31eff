//! Network identity captured once after Wi-Fi association.
//!
//! The MAC is rendered in lowercase colon-hex (`aa:bb:cc:dd:ee:ff`). When no
//! hostname is configured, one is derived from the last three MAC bytes:
//! - Deterministic across reboots (factory-burned eFuse MAC)
//! - Used as the DHCP hostname (`sensorhub-xxyyzz`)
//! - Reported by `/netinfo` and folded into its ETag

use core::fmt::Write;

use crate::error::Error;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Longest dotted-quad IPv4 string is `255.255.255.255` (15 bytes).
pub type IpString = heapless::String<16>;
/// `aa:bb:cc:dd:ee:ff` (17 bytes).
pub type MacString = heapless::String<17>;
pub type NameString = heapless::String<32>;

/// IP, MAC, SSID and hostname of the station. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkIdentity {
    ip: IpString,
    mac: MacString,
    ssid: NameString,
    hostname: NameString,
}

impl NetworkIdentity {
    pub fn new(ip: &str, mac: &str, ssid: &str, hostname: &str) -> Result<Self, Error> {
        Ok(Self {
            ip: copy_bounded(ip).ok_or(Error::Config("ip address too long"))?,
            mac: copy_bounded(mac).ok_or(Error::Config("mac address too long"))?,
            ssid: copy_bounded(ssid).ok_or(Error::Config("ssid too long"))?,
            hostname: copy_bounded(hostname).ok_or(Error::Config("hostname too long"))?,
        })
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

fn copy_bounded<const N: usize>(s: &str) -> Option<heapless::String<N>> {
    let mut out = heapless::String::new();
    out.push_str(s).ok()?;
    Some(out)
}

/// Lowercase colon-hex rendering of a MAC address.
pub fn format_mac(mac: &MacAddress) -> MacString {
    let mut s = MacString::new();
    let _ = write!(
        s,
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    s
}

/// Derive the station hostname from the last 3 MAC bytes.
/// Format: `sensorhub-xxyyzz` (lowercase).
pub fn hostname_from_mac(mac: &MacAddress) -> NameString {
    let mut name = NameString::new();
    let _ = write!(name, "sensorhub-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    name
}
