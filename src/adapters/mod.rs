//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements       | Connects to                 |
//! |---------------|------------------|-----------------------------|
//! | `env_sensor`  | SensorPort       | BME280 over shared I2C      |
//! | `oled`        | DisplayPort      | SSD1306 128×32 over I2C     |
//! | `wifi`        | LinkQualityPort  | ESP-IDF WiFi STA            |
//! | `http_server` | HttpExchange     | ESP-IDF httpd               |

pub mod env_sensor;
#[cfg(target_os = "espidf")]
pub mod http_server;
pub mod oled;
pub mod wifi;
