//! Sampler and RSSI poller driving the store, observed through HTTP.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sensorhub::app::link_poller::LinkQualityPoller;
use sensorhub::app::ports::TelemetryPort;
use sensorhub::app::sampler::{Sampler, SamplerState, StepOutcome};
use sensorhub::config::SystemConfig;
use sensorhub::error::{Error, LinkError, SensorError};
use sensorhub::http::recorder::ResponseRecorder;
use sensorhub::http::{Endpoint, Exposition};
use sensorhub::scheduler::{Runner, ScheduleMode};
use sensorhub::telemetry::{Rssi, SensorReading, TelemetryStore};

use crate::mock_hw::{MockDisplay, MockLink, MockSensor, raw};

fn body(exp: &Exposition<TelemetryStore>, ep: Endpoint) -> String {
    let mut r = ResponseRecorder::get();
    exp.serve(ep, &mut r).unwrap();
    r.body_str().to_owned()
}

#[test]
fn sample_is_served_and_displayed() {
    let store = Arc::new(TelemetryStore::new());
    let exp = Exposition::from_config(Arc::clone(&store), &SystemConfig::default());
    let sensor = MockSensor::new();
    let display = MockDisplay::new();
    let mut sampler = Sampler::new(sensor.clone(), display.clone(), Arc::clone(&store), Duration::from_millis(1));

    assert_eq!(
        body(&exp, Endpoint::Sensor),
        r#"{"temperature":0.00,"humidity":0.00,"pressure":0.00}"#
    );

    sampler.init().unwrap();
    assert_eq!(sampler.state(), SamplerState::Running);
    sensor.push(Ok(raw(21.5, 45.0, 1013.25)));
    sampler.step().unwrap();

    assert_eq!(
        body(&exp, Endpoint::Sensor),
        r#"{"temperature":21.50,"humidity":45.00,"pressure":1013.25}"#
    );
    assert_eq!(
        display.last_frame().unwrap(),
        vec!["21.50 C", "45.00 %RH", "1013.25 hPa"]
    );
}

#[test]
fn transient_failures_keep_last_good_triple() {
    let store = Arc::new(TelemetryStore::new());
    let sensor = MockSensor::new();
    let display = MockDisplay::new();
    let mut sampler = Sampler::new(sensor.clone(), display.clone(), Arc::clone(&store), Duration::from_millis(1));
    sampler.init().unwrap();

    sensor.push(Ok(raw(19.25, 50.0, 990.0)));
    sensor.push(Err(SensorError::BusFault));
    sensor.push(Ok(raw(200.0, 50.0, 990.0)));
    sensor.push(Err(SensorError::ReadFailed));

    assert!(matches!(sampler.step().unwrap(), StepOutcome::Published(_)));
    for _ in 0..3 {
        assert!(matches!(sampler.step().unwrap(), StepOutcome::Skipped(_)));
    }

    assert_eq!(store.read_sensor_reading(), SensorReading::new(19.25, 50.0, 990.0));
    assert_eq!(sampler.stats().read_failures, 3);
    assert_eq!(display.frame_count(), 1);
}

#[test]
fn sampler_init_failure_is_fatal_error() {
    let store = Arc::new(TelemetryStore::new());
    let mut sensor = MockSensor::new();
    sensor.fail_init = true;
    let mut sampler = Sampler::new(sensor, MockDisplay::new(), store, Duration::from_millis(1));
    assert_eq!(sampler.init(), Err(Error::Sensor(SensorError::NotDetected)));
    assert!(sampler.step().is_err());
}

#[test]
fn display_failure_still_publishes() {
    let store = Arc::new(TelemetryStore::new());
    let sensor = MockSensor::new();
    let mut display = MockDisplay::new();
    display.fail_draw = true;
    let mut sampler = Sampler::new(sensor.clone(), display, Arc::clone(&store), Duration::from_millis(1));
    sampler.init().unwrap();
    sensor.push(Ok(raw(10.0, 20.0, 1000.0)));
    sampler.step().unwrap();
    assert_eq!(store.read_sensor_reading(), SensorReading::new(10.0, 20.0, 1000.0));
    assert_eq!(sampler.stats().display_failures, 1);
}

#[test]
fn sampler_thread_publishes_continuously() {
    let store = Arc::new(TelemetryStore::new());
    let sensor = MockSensor::new();
    for i in 0..50 {
        sensor.push(Ok(raw(20.0 + i as f32 / 10.0, 40.0, 1000.0)));
    }
    let sampler = Sampler::new(sensor, MockDisplay::new(), Arc::clone(&store), Duration::from_millis(1));
    std::thread::spawn(move || sampler.run());

    let deadline = Instant::now() + Duration::from_secs(2);
    while store.read_sensor_reading().temperature == 0.0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(store.read_sensor_reading().temperature >= 20.0);
}

#[test]
fn rssi_poller_publishes_value_then_sentinel() {
    let store = Arc::new(TelemetryStore::new());
    let exp = Exposition::from_config(Arc::clone(&store), &SystemConfig::default());
    let link = MockLink::new();
    link.push(Ok(-61));
    link.push(Err(LinkError::QueryFailed(-1)));

    let mut poller = LinkQualityPoller::new(link, Arc::clone(&store));
    poller.poll_once();
    assert_eq!(body(&exp, Endpoint::Rssi), r#"{"valid":true,"rssi":-61}"#);

    poller.poll_once();
    assert_eq!(body(&exp, Endpoint::Rssi), r#"{"valid":false,"rssi":-2147483648}"#);
}

#[test]
fn polled_schedule_reads_immediately_and_on_ticks() {
    let store = Arc::new(TelemetryStore::new());
    let link = MockLink::new();
    link.push(Ok(-50));
    link.push(Ok(-51));

    let poller = LinkQualityPoller::new(link.clone(), Arc::clone(&store));
    let mut runner = Runner::start(ScheduleMode::Polled, poller, Duration::from_millis(5)).unwrap();

    // Initial read at start, before any tick.
    assert_eq!(store.read_signal_strength(), Rssi::new(-50));

    let deadline = Instant::now() + Duration::from_secs(2);
    while store.read_signal_strength() == Rssi::new(-50) && Instant::now() < deadline {
        runner.poll();
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(store.read_signal_strength(), Rssi::new(-51));
}

#[test]
fn dedicated_schedule_runs_without_polling() {
    let store = Arc::new(TelemetryStore::new());
    let link = MockLink::new();
    link.push(Ok(-70));
    link.push(Ok(-71));

    let poller = LinkQualityPoller::new(link, Arc::clone(&store));
    let runner = Runner::start(ScheduleMode::Dedicated, poller, Duration::from_millis(5)).unwrap();
    assert_eq!(runner.mode(), ScheduleMode::Dedicated);
    assert_eq!(store.read_signal_strength(), Rssi::new(-70));

    // Script runs out after -71; the link then reports NotAssociated.
    let deadline = Instant::now() + Duration::from_secs(2);
    while store.read_signal_strength() != Rssi::INVALID && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(store.read_signal_strength(), Rssi::INVALID);
}
