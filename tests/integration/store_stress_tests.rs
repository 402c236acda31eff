//! Concurrent writers and readers against one store. A reader must never
//! see a triple mixed from two different writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use sensorhub::app::ports::TelemetryPort;
use sensorhub::config::SystemConfig;
use sensorhub::http::recorder::ResponseRecorder;
use sensorhub::http::{Endpoint, Exposition};
use sensorhub::telemetry::{Rssi, SensorReading, TelemetryStore};

const WRITES_PER_THREAD: u32 = 20_000;

/// Every published triple is (x, x + 1, x + 2).
fn consistent(r: SensorReading) -> bool {
    r.humidity == r.temperature + 1.0 && r.pressure == r.temperature + 2.0
}

#[test]
fn readers_never_see_torn_triples() {
    let store = Arc::new(TelemetryStore::new());
    store.publish_sensor_reading(SensorReading::new(0.0, 1.0, 2.0));
    let done = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = (0..2u32)
        .map(|w| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..WRITES_PER_THREAD {
                    // Distinct ranges per writer, all exact in f32.
                    let x = (w * WRITES_PER_THREAD + i) as f32;
                    store.publish_sensor_reading(SensorReading::new(x, x + 1.0, x + 2.0));
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut seen = 0u64;
                while !done.load(Ordering::Relaxed) {
                    let r = store.read_sensor_reading();
                    assert!(consistent(r), "torn read {:?}", r);
                    seen += 1;
                }
                seen
            })
        })
        .collect();

    for w in writers {
        w.join().unwrap();
    }
    done.store(true, Ordering::Relaxed);
    for r in readers {
        assert!(r.join().unwrap() > 0);
    }
    assert!(consistent(store.read_sensor_reading()));
}

#[test]
fn rssi_writer_and_sensor_writer_do_not_interfere() {
    let store = Arc::new(TelemetryStore::new());
    let done = Arc::new(AtomicBool::new(false));

    let sensor_writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..WRITES_PER_THREAD {
                let x = i as f32;
                store.publish_sensor_reading(SensorReading::new(x, x + 1.0, x + 2.0));
            }
        })
    };
    let rssi_writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..WRITES_PER_THREAD {
                let rssi = if i % 7 == 0 { Rssi::INVALID } else { Rssi::new(-((i % 90) as i32) - 1) };
                store.publish_signal_strength(rssi);
            }
        })
    };
    let reader = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                let rssi = store.read_signal_strength();
                assert!(rssi == Rssi::INVALID || (-90..=-1).contains(&rssi.dbm()), "{:?}", rssi);
                let r = store.read_sensor_reading();
                assert!(r == SensorReading::default() || consistent(r), "torn read {:?}", r);
            }
        })
    };

    sensor_writer.join().unwrap();
    rssi_writer.join().unwrap();
    done.store(true, Ordering::Relaxed);
    reader.join().unwrap();
}

#[test]
fn handlers_serve_consistent_bodies_under_load() {
    let store = Arc::new(TelemetryStore::new());
    let exp = Arc::new(Exposition::from_config(Arc::clone(&store), &SystemConfig::default()));
    store.publish_sensor_reading(SensorReading::new(0.0, 1.0, 2.0));
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut x = 0.0f32;
            while !done.load(Ordering::Relaxed) {
                x = (x + 1.0) % 50.0;
                store.publish_sensor_reading(SensorReading::new(x, x + 1.0, x + 2.0));
            }
        })
    };

    for _ in 0..2_000 {
        let mut r = ResponseRecorder::get();
        exp.serve(Endpoint::Sensor, &mut r).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
        let t = v["temperature"].as_f64().unwrap();
        assert_eq!(v["humidity"].as_f64().unwrap(), t + 1.0, "{}", r.body_str());
        assert_eq!(v["pressure"].as_f64().unwrap(), t + 2.0, "{}", r.body_str());
    }

    done.store(true, Ordering::Relaxed);
    writer.join().unwrap();
}
