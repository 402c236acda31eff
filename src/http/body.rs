//! Typed JSON response bodies.
//!
//! Field order in each struct is the field order on the wire.

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::error::HttpError;
use crate::identity::NetworkIdentity;
use crate::telemetry::{Rssi, SensorReading};

/// A float emitted as a JSON number with exactly two decimals (`45.00`,
/// not `45.0`). Non-finite values refuse to serialise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoDecimals(pub f32);

impl Serialize for TwoDecimals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.0.is_finite() {
            return Err(S::Error::custom("non-finite value"));
        }
        let raw = RawValue::from_string(format!("{:.2}", self.0)).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}

#[derive(Debug, Serialize)]
pub struct SensorBody {
    pub temperature: TwoDecimals,
    pub humidity: TwoDecimals,
    pub pressure: TwoDecimals,
}

impl From<SensorReading> for SensorBody {
    fn from(r: SensorReading) -> Self {
        Self {
            temperature: TwoDecimals(r.temperature),
            humidity: TwoDecimals(r.humidity),
            pressure: TwoDecimals(r.pressure),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RssiBody {
    pub valid: bool,
    pub rssi: i32,
}

impl From<Rssi> for RssiBody {
    fn from(r: Rssi) -> Self {
        Self {
            valid: r.is_valid(),
            rssi: r.dbm(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NetInfoBody<'a> {
    pub ssid: &'a str,
    pub host: &'a str,
    pub ip: &'a str,
    pub mac: &'a str,
}

impl<'a> From<&'a NetworkIdentity> for NetInfoBody<'a> {
    fn from(id: &'a NetworkIdentity) -> Self {
        Self {
            ssid: id.ssid(),
            host: id.hostname(),
            ip: id.ip(),
            mac: id.mac(),
        }
    }
}

pub fn to_json<T: Serialize>(body: &T) -> Result<Vec<u8>, HttpError> {
    serde_json::to_vec(body).map_err(|_| HttpError::Serialize)
}
