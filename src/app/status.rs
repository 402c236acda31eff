//! Status display text.
//!
//! Three lines on a 128×32 panel, one per quantity, two decimals each.

use core::fmt::Write;

use crate::telemetry::SensorReading;

/// Widest line is `-40.00 C` / `1100.00 hPa`; 20 leaves headroom for junk
/// readings that slipped past range checks on a misbehaving device.
pub type StatusLine = heapless::String<20>;

pub fn status_lines(reading: &SensorReading) -> [StatusLine; 3] {
    let mut t = StatusLine::new();
    let mut h = StatusLine::new();
    let mut p = StatusLine::new();
    let _ = write!(t, "{:.2} C", reading.temperature);
    let _ = write!(h, "{:.2} %RH", reading.humidity);
    let _ = write!(p, "{:.2} hPa", reading.pressure);
    [t, h, p]
}
