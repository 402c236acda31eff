//! BME280 environment sensor adapter.
//!
//! Implements [`SensorPort`] on top of the `bme280` driver. The driver
//! already applies the factory compensation and hands back floats; they
//! are re-quantised here to the datasheet's fixed-point output so the
//! sampler owns the one and only unit conversion.
//!
//! Generic over any embedded-hal 1.0 I2C bus, so the same code runs on a
//! shared bus handle on the device and on a fake bus in host tests.

use bme280::i2c::BME280;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::info;

use crate::app::ports::SensorPort;
use crate::app::sampler::RawSample;
use crate::error::SensorError;

/// Primary (SDO → GND) and secondary (SDO → VDDIO) addresses.
pub const ADDR_PRIMARY: u8 = 0x76;
pub const ADDR_SECONDARY: u8 = 0x77;

pub struct Bme280Sensor<I2C, D> {
    dev: BME280<I2C>,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Bme280Sensor<I2C, D> {
    pub fn new(i2c: I2C, addr: u8, delay: D) -> Result<Self, SensorError> {
        let dev = match addr {
            ADDR_PRIMARY => BME280::new_primary(i2c),
            ADDR_SECONDARY => BME280::new_secondary(i2c),
            _ => return Err(SensorError::NotDetected),
        };
        Ok(Self { dev, delay })
    }
}

fn map_err<E>(e: &bme280::Error<E>) -> SensorError {
    match e {
        bme280::Error::UnsupportedChip => SensorError::NotDetected,
        bme280::Error::CompensationFailed
        | bme280::Error::InvalidData
        | bme280::Error::NoCalibrationData => SensorError::ReadFailed,
        _ => SensorError::BusFault,
    }
}

/// °C, %RH and Pa back to 0.01 °C, 1/1024 %RH and 1/256 Pa.
pub fn quantise(temperature_c: f32, humidity_pct: f32, pressure_pa: f32) -> Result<RawSample, SensorError> {
    if !(temperature_c.is_finite() && humidity_pct.is_finite() && pressure_pa.is_finite()) {
        return Err(SensorError::OutOfRange);
    }
    if humidity_pct < 0.0 || pressure_pa < 0.0 {
        return Err(SensorError::OutOfRange);
    }
    Ok(RawSample {
        temperature: (temperature_c * 100.0).round() as i32,
        humidity: (humidity_pct * 1024.0).round() as u32,
        pressure: (pressure_pa * 256.0).round() as u32,
    })
}

impl<I2C: I2c, D: DelayNs> SensorPort for Bme280Sensor<I2C, D> {
    fn init(&mut self) -> Result<(), SensorError> {
        self.dev.init(&mut self.delay).map_err(|e| map_err(&e))?;
        info!("bme280: initialised");
        Ok(())
    }

    fn read_raw(&mut self) -> Result<RawSample, SensorError> {
        let m = self.dev.measure(&mut self.delay).map_err(|e| map_err(&e))?;
        quantise(m.temperature, m.humidity, m.pressure)
    }
}
