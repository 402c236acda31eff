//! Sampling producer. Runs alone on the APP core.
//!
//! ```text
//!  INITIALIZING ──ok──▶ RUNNING ─┐  sleep → read → convert → publish → render
//!       │                  ▲     │
//!     error                └─────┘
//!       ▼
//!     abort
//! ```
//!
//! A failed read (or an implausible conversion) is logged and skipped: the
//! previously published triple stays in the store.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::error::{Error, SensorError};
use crate::telemetry::SensorReading;

use super::ports::{DisplayPort, SensorPort, TelemetryPort};
use super::status::status_lines;

// ───────────────────────────────────────────────────────────────
// Raw units
// ───────────────────────────────────────────────────────────────

/// Compensated output of the BME280 in its datasheet fixed-point formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// Hundredths of a degree Celsius.
    pub temperature: i32,
    /// Q22.10 %RH (1/1024 %RH per LSB).
    pub humidity: u32,
    /// Q24.8 Pa (1/256 Pa per LSB).
    pub pressure: u32,
}

const TEMP_RANGE_C: (f32, f32) = (-40.0, 85.0);
const HUMIDITY_RANGE: (f32, f32) = (0.0, 100.0);
const PRESSURE_RANGE_HPA: (f32, f32) = (300.0, 1100.0);

impl RawSample {
    /// Convert to °C, %RH and hPa, rejecting anything outside the
    /// sensor's operating range.
    pub fn to_reading(self) -> Result<SensorReading, SensorError> {
        let temperature = self.temperature as f32 / 100.0;
        let humidity = self.humidity as f32 / 1024.0;
        let pressure = self.pressure as f32 / 256.0 / 100.0;

        let in_range = |v: f32, (lo, hi): (f32, f32)| v.is_finite() && v >= lo && v <= hi;
        if !in_range(temperature, TEMP_RANGE_C)
            || !in_range(humidity, HUMIDITY_RANGE)
            || !in_range(pressure, PRESSURE_RANGE_HPA)
        {
            return Err(SensorError::OutOfRange);
        }
        Ok(SensorReading::new(temperature, humidity, pressure))
    }
}

// ───────────────────────────────────────────────────────────────
// State machine
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Initializing,
    Running,
}

/// Result of one sampling pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// A new triple was published (the display may still have failed).
    Published(SensorReading),
    /// The read or the conversion failed; the store was left untouched.
    Skipped(SensorError),
}

/// Running counters, mainly for tests and the boot log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerStats {
    pub published: u32,
    pub read_failures: u32,
    pub display_failures: u32,
}

pub struct Sampler<S, D, T: ?Sized> {
    sensor: S,
    display: D,
    store: Arc<T>,
    state: SamplerState,
    interval: Duration,
    stats: SamplerStats,
}

impl<S, D, T> Sampler<S, D, T>
where
    S: SensorPort,
    D: DisplayPort,
    T: TelemetryPort + ?Sized,
{
    pub fn new(sensor: S, display: D, store: Arc<T>, interval: Duration) -> Self {
        Self {
            sensor,
            display,
            store,
            state: SamplerState::Initializing,
            interval,
            stats: SamplerStats::default(),
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn stats(&self) -> SamplerStats {
        self.stats
    }

    /// INITIALIZING → RUNNING. There is no degraded mode: a sensor or
    /// display that does not come up is reported to the caller, which
    /// aborts.
    pub fn init(&mut self) -> Result<(), Error> {
        if self.state == SamplerState::Running {
            return Ok(());
        }
        self.sensor.init()?;
        self.display.init()?;
        self.state = SamplerState::Running;
        info!("sampler: running (interval {} ms)", self.interval.as_millis());
        Ok(())
    }

    /// One read → convert → publish → render pass, without the sleep.
    pub fn step(&mut self) -> Result<StepOutcome, Error> {
        if self.state != SamplerState::Running {
            return Err(Error::Init("sampler stepped before init"));
        }

        let reading = match self.sensor.read_raw().and_then(RawSample::to_reading) {
            Ok(r) => r,
            Err(e) => {
                self.stats.read_failures = self.stats.read_failures.saturating_add(1);
                warn!("sampler: read failed ({}), keeping previous reading", e);
                return Ok(StepOutcome::Skipped(e));
            }
        };

        self.store.publish_sensor_reading(reading);
        self.stats.published = self.stats.published.saturating_add(1);
        debug!(
            "sampler: T={:.2}C H={:.2}%RH P={:.2}hPa",
            reading.temperature, reading.humidity, reading.pressure
        );

        let lines = status_lines(&reading);
        let refs = [lines[0].as_str(), lines[1].as_str(), lines[2].as_str()];
        if let Err(e) = self.display.show_lines(&refs) {
            self.stats.display_failures = self.stats.display_failures.saturating_add(1);
            warn!("sampler: display update failed ({})", e);
        }

        Ok(StepOutcome::Published(reading))
    }

    /// Initialise, then sample forever. Never returns; an init failure
    /// aborts the process.
    pub fn run(mut self) -> ! {
        if let Err(e) = self.init() {
            error!("sampler: init failed ({}), aborting", e);
            std::process::abort();
        }
        loop {
            std::thread::sleep(self.interval);
            // step() only errs before init, which cannot happen here.
            let _ = self.step();
        }
    }
}
