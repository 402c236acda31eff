//! GPIO / peripheral pin assignments for the SensorHub board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Shared I2C bus (BME280 + SSD1306)
// ---------------------------------------------------------------------------

/// I2C0 data line.
pub const I2C_SDA_GPIO: i32 = 8;
/// I2C0 clock line.
pub const I2C_SCL_GPIO: i32 = 9;
