//! SensorHub firmware entry point.
//!
//! ```text
//! ┌─────────────────────────── PRO core (0) ───────────────────────────┐
//! │  WiFi STA ──▶ NetworkIdentity ──▶ TelemetryStore::init_identity    │
//! │  esp_timer ─raise─▶ DueFlag ◀─poll─ main loop ──▶ LinkQualityPoller │
//! │  httpd ──▶ Exposition (/sensor /rssi /netinfo / /main.js)          │
//! └────────────────────────────────┬───────────────────────────────────┘
//!                                  │  TelemetryStore (critical sections)
//! ┌────────────────────────────────┴─── APP core (1) ──────────────────┐
//! │  Sampler: BME280 ──▶ convert ──▶ publish ──▶ SSD1306               │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2c::{I2C0, I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info};

use sensorhub::adapters::env_sensor::Bme280Sensor;
use sensorhub::adapters::http_server;
use sensorhub::adapters::oled::OledDisplay;
use sensorhub::adapters::wifi::{StaLinkQuality, WifiStation};
use sensorhub::app::link_poller::LinkQualityPoller;
use sensorhub::app::sampler::Sampler;
use sensorhub::config::SystemConfig;
use sensorhub::drivers::task_pin::{Core, spawn_on_core};
use sensorhub::http::Exposition;
use sensorhub::pins;
use sensorhub::scheduler::Runner;
use sensorhub::telemetry::TelemetryStore;

/// Sampler task: stack (KB) and FreeRTOS priority.
const SAMPLER_STACK_KB: usize = 8;
const SAMPLER_PRIORITY: u8 = 5;

// ── Sampler task (APP core) ───────────────────────────────────

/// Bring up the shared I2C bus and run the sampler forever. Any
/// bring-up failure aborts: there is no useful degraded mode.
fn run_sampler(i2c0: I2C0, sda: AnyIOPin, scl: AnyIOPin, cfg: SystemConfig, store: Arc<TelemetryStore>) -> ! {
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(cfg.i2c_baudrate_hz));
    let i2c = match I2cDriver::new(i2c0, sda, scl, &i2c_cfg) {
        Ok(d) => d,
        Err(e) => {
            error!("sampler: I2C init failed ({}), aborting", e);
            std::process::abort();
        }
    };
    let bus = RefCell::new(i2c);

    let sensor = match Bme280Sensor::new(RefCellDevice::new(&bus), cfg.sensor_addr, FreeRtos) {
        Ok(s) => s,
        Err(e) => {
            error!("sampler: sensor address 0x{:02x} unusable ({}), aborting", cfg.sensor_addr, e);
            std::process::abort();
        }
    };
    let display = OledDisplay::new(RefCellDevice::new(&bus), cfg.display_addr);

    let interval = Duration::from_millis(u64::from(cfg.sensor_interval_ms));
    Sampler::new(sensor, display, store, interval).run()
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SensorHub v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let cfg = SystemConfig::default();
    cfg.validate()?;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let store = Arc::new(TelemetryStore::new());

    // ── 3. Sampling producer on the APP core ──────────────────
    // SAFETY: the pin numbers come from `pins` and are used by nothing else.
    let (sda, scl) = unsafe { (AnyIOPin::new(pins::I2C_SDA_GPIO), AnyIOPin::new(pins::I2C_SCL_GPIO)) };
    let i2c0 = peripherals.i2c0;
    {
        let cfg = cfg.clone();
        let store = Arc::clone(&store);
        spawn_on_core(Core::App, SAMPLER_PRIORITY, SAMPLER_STACK_KB, "sampler\0", move || {
            run_sampler(i2c0, sda, scl, cfg, store)
        })?;
    }

    // ── 4. WiFi + network identity ────────────────────────────
    let mut wifi = WifiStation::new(peripherals.modem, sysloop, nvs)?;
    wifi.set_credentials(&cfg.wifi_ssid, &cfg.wifi_password, &cfg.hostname)?;
    wifi.connect_until_up()?;
    store.init_network_identity(wifi.network_identity()?)?;

    // ── 5. RSSI poller ────────────────────────────────────────
    let poller = LinkQualityPoller::new(StaLinkQuality::new(), Arc::clone(&store));
    let mut rssi = Runner::start(
        cfg.rssi_schedule,
        poller,
        Duration::from_millis(u64::from(cfg.rssi_interval_ms)),
    )?;

    // ── 6. HTTP server ────────────────────────────────────────
    let exposition = Arc::new(Exposition::from_config(Arc::clone(&store), &cfg));
    let _server = http_server::start(exposition, &cfg)?;

    // ── 7. Main loop ──────────────────────────────────────────
    info!("Entering main loop (RSSI {:?})", rssi.mode());
    let poll_sleep = Duration::from_millis(u64::from(cfg.poll_sleep_ms));
    loop {
        rssi.poll();
        std::thread::sleep(poll_sleep);
    }
}
