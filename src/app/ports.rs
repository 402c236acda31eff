//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Sampler / RSSI poller / HTTP exposition
//! ```
//!
//! Driven adapters (BME280, SSD1306, Wi-Fi radio) implement these traits.
//! The sampling and polling loops consume them via generics, so the domain
//! core never touches hardware directly and every loop can be driven by
//! mocks on the host.

use crate::error::{DisplayError, LinkError, SensorError};
use crate::identity::NetworkIdentity;
use crate::telemetry::{Rssi, SensorReading};

use super::sampler::RawSample;

// ───────────────────────────────────────────────────────────────
// Telemetry port (shared state between the two cores)
// ───────────────────────────────────────────────────────────────

/// The only entry points into the telemetry store.
///
/// Every method copies a few scalars under its own short critical section;
/// none of them blocks on I/O.
pub trait TelemetryPort: Send + Sync {
    /// Publish a complete sensor triple (one sampling pass).
    fn publish_sensor_reading(&self, reading: SensorReading);

    /// Publish a link-quality value, or [`Rssi::INVALID`].
    fn publish_signal_strength(&self, rssi: Rssi);

    fn read_sensor_reading(&self) -> SensorReading;

    fn read_signal_strength(&self) -> Rssi;

    /// `None` until the network core has installed the identity.
    fn get_network_identity(&self) -> Option<&NetworkIdentity>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Environment sensor on the sampling core.
pub trait SensorPort {
    /// Probe and configure the device. Failure here is fatal.
    fn init(&mut self) -> Result<(), SensorError>;

    /// One blocking measurement in the device's compensated fixed-point units.
    fn read_raw(&mut self) -> Result<RawSample, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → status display)
// ───────────────────────────────────────────────────────────────

/// Small text status display.
pub trait DisplayPort {
    /// Bring up the controller. Failure here is fatal.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Clear the frame and draw `lines` top to bottom, then flush.
    fn show_lines(&mut self, lines: &[&str]) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Link-quality port (driven adapter: radio → domain)
// ───────────────────────────────────────────────────────────────

/// Signal strength of the associated access point.
pub trait LinkQualityPort {
    /// Query the radio. May take a while; never call from a timer callback.
    fn query_rssi(&mut self) -> Result<i32, LinkError>;
}
