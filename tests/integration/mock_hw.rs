//! Mock hardware adapters for integration tests.
//!
//! The sensor and link mocks replay a script and can be fed more entries
//! after they have been moved into a sampler or poller. The display
//! records every frame. `FakeI2c` stands in for the shared bus when the
//! real driver adapters are exercised.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use sensorhub::app::ports::{DisplayPort, LinkQualityPort, SensorPort};
use sensorhub::app::sampler::RawSample;
use sensorhub::error::{DisplayError, LinkError, SensorError};

// ── Sensor ────────────────────────────────────────────────────

/// Raw sample for the given physical values.
pub fn raw(temperature_c: f32, humidity_pct: f32, pressure_hpa: f32) -> RawSample {
    RawSample {
        temperature: (temperature_c * 100.0).round() as i32,
        humidity: (humidity_pct * 1024.0).round() as u32,
        pressure: (pressure_hpa * 25_600.0).round() as u32,
    }
}

#[derive(Clone, Default)]
pub struct MockSensor {
    script: Arc<Mutex<VecDeque<Result<RawSample, SensorError>>>>,
    pub fail_init: bool,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, r: Result<RawSample, SensorError>) {
        self.script.lock().unwrap().push_back(r);
    }
}

impl SensorPort for MockSensor {
    fn init(&mut self) -> Result<(), SensorError> {
        if self.fail_init { Err(SensorError::NotDetected) } else { Ok(()) }
    }

    fn read_raw(&mut self) -> Result<RawSample, SensorError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SensorError::ReadFailed))
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDisplay {
    pub frames: Arc<Mutex<Vec<Vec<String>>>>,
    pub fail_draw: bool,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<Vec<String>> {
        self.frames.lock().unwrap().last().cloned()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl DisplayPort for MockDisplay {
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn show_lines(&mut self, lines: &[&str]) -> Result<(), DisplayError> {
        if self.fail_draw {
            return Err(DisplayError::DrawFailed);
        }
        self.frames
            .lock()
            .unwrap()
            .push(lines.iter().map(|l| (*l).to_owned()).collect());
        Ok(())
    }
}

// ── Link quality ──────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockLink {
    script: Arc<Mutex<VecDeque<Result<i32, LinkError>>>>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, r: Result<i32, LinkError>) {
        self.script.lock().unwrap().push_back(r);
    }
}

impl LinkQualityPort for MockLink {
    fn query_rssi(&mut self) -> Result<i32, LinkError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LinkError::NotAssociated))
    }
}

// ── I2C bus ───────────────────────────────────────────────────

/// Records writes; reads return `read_fill`; `fail` makes every
/// transaction a bus error.
#[derive(Default)]
pub struct FakeI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub read_fill: u8,
    pub fail: bool,
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(ErrorKind::Bus);
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buf) => buf.fill(self.read_fill),
            }
        }
        Ok(())
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
