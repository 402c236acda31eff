//! Cross-core telemetry store.
//!
//! ```text
//!  Sampler (APP core) ──▶ ┌──────────────────────┐ ◀── HTTP handlers (read)
//!                         │ sensor  [mutex A]    │
//!  RSSI poller (PRO) ───▶ │ rssi    [mutex B]    │
//!                         │ identity [once]      │
//!                         └──────────────────────┘
//! ```
//!
//! Each field group sits behind its own blocking mutex, held only for the
//! `Cell` copy in or out. No caller ever holds two of them, and none is held
//! across I/O. The network identity is written once before the HTTP server
//! starts and read lock-free afterwards.
//!
//! The store is generic over the raw mutex so host tests and alternative
//! platforms can substitute their own primitive; firmware uses
//! [`CriticalSectionRawMutex`].

use core::cell::Cell;
use std::sync::OnceLock;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use log::info;

use crate::app::ports::TelemetryPort;
use crate::error::Error;
use crate::identity::NetworkIdentity;

/// One environment sample in physical units: °C, %RH, hPa.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
}

impl SensorReading {
    pub const fn new(temperature: f32, humidity: f32, pressure: f32) -> Self {
        Self {
            temperature,
            humidity,
            pressure,
        }
    }
}

/// Received signal strength in dBm, or [`Rssi::INVALID`] when no reading
/// has been obtained (or the last query failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rssi(i32);

impl Rssi {
    /// 32-bit sentinel. No radio reports anything near `i32::MIN` dBm.
    pub const INVALID: Self = Self(i32::MIN);

    pub const fn new(dbm: i32) -> Self {
        Self(dbm)
    }

    pub const fn dbm(self) -> i32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl Default for Rssi {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Both field groups copied out together. The two halves come from separate
/// critical sections and are not mutually consistent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    pub sensor: SensorReading,
    pub rssi: Rssi,
}

/// Shared state between the sampling core and the network core.
pub struct TelemetryStore<M: RawMutex = CriticalSectionRawMutex> {
    sensor: Mutex<M, Cell<SensorReading>>,
    rssi: Mutex<M, Cell<Rssi>>,
    identity: OnceLock<NetworkIdentity>,
}

impl<M: RawMutex> Default for TelemetryStore<M> {
    fn default() -> Self {
        Self::with_raw_mutex()
    }
}

impl TelemetryStore {
    /// Zeroed sensor group, sentinel RSSI, no identity.
    pub const fn new() -> Self {
        Self::with_raw_mutex()
    }
}

impl<M: RawMutex> TelemetryStore<M> {
    /// Same as [`TelemetryStore::new`] over a caller-chosen raw mutex.
    pub const fn with_raw_mutex() -> Self {
        Self {
            sensor: Mutex::new(Cell::new(SensorReading::new(0.0, 0.0, 0.0))),
            rssi: Mutex::new(Cell::new(Rssi::INVALID)),
            identity: OnceLock::new(),
        }
    }

    // ── Sensor group ──────────────────────────────────────────

    pub fn set_sensor_reading(&self, reading: SensorReading) {
        self.sensor.lock(|cell| cell.set(reading));
    }

    pub fn get_sensor_reading(&self) -> SensorReading {
        self.sensor.lock(Cell::get)
    }

    // ── Link-quality group ────────────────────────────────────

    pub fn set_signal_strength(&self, rssi: Rssi) {
        self.rssi.lock(|cell| cell.set(rssi));
    }

    pub fn get_signal_strength(&self) -> Rssi {
        self.rssi.lock(Cell::get)
    }

    /// Copy both groups, one lock at a time.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let sensor = self.get_sensor_reading();
        let rssi = self.get_signal_strength();
        TelemetrySnapshot { sensor, rssi }
    }

    // ── Network identity ──────────────────────────────────────

    /// Install the identity. Must happen before the HTTP server starts;
    /// a second call is rejected and leaves the first identity in place.
    pub fn init_network_identity(&self, identity: NetworkIdentity) -> Result<(), Error> {
        self.identity
            .set(identity)
            .map_err(|_| Error::Config("network identity already initialised"))?;
        if let Some(id) = self.identity.get() {
            info!(
                "telemetry: identity ip={} mac={} ssid='{}' host={}",
                id.ip(),
                id.mac(),
                id.ssid(),
                id.hostname()
            );
        }
        Ok(())
    }

    pub fn network_identity(&self) -> Option<&NetworkIdentity> {
        self.identity.get()
    }
}

impl<M: RawMutex + Sync + Send> TelemetryPort for TelemetryStore<M> {
    fn publish_sensor_reading(&self, reading: SensorReading) {
        self.set_sensor_reading(reading);
    }

    fn publish_signal_strength(&self, rssi: Rssi) {
        self.set_signal_strength(rssi);
    }

    fn read_sensor_reading(&self) -> SensorReading {
        self.get_sensor_reading()
    }

    fn read_signal_strength(&self) -> Rssi {
        self.get_signal_strength()
    }

    fn get_network_identity(&self) -> Option<&NetworkIdentity> {
        self.network_identity()
    }
}
