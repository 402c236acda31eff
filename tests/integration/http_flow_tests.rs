//! End-to-end handler flows: store → exposition → recorded response.

use std::sync::Arc;

use sensorhub::config::SystemConfig;
use sensorhub::error::HttpError;
use sensorhub::http::assets::{INDEX_HTML, MAIN_JS};
use sensorhub::http::recorder::ResponseRecorder;
use sensorhub::http::{Endpoint, Exposition, ROUTES};
use sensorhub::identity::NetworkIdentity;
use sensorhub::telemetry::{Rssi, SensorReading, TelemetryStore};

const SCENARIO_ETAG: &str = "\"6a7eaecd\"";

fn setup() -> (Arc<TelemetryStore>, Exposition<TelemetryStore>) {
    let store = Arc::new(TelemetryStore::new());
    let exp = Exposition::from_config(Arc::clone(&store), &SystemConfig::default());
    (store, exp)
}

fn install_identity(store: &TelemetryStore) {
    let id = NetworkIdentity::new("10.0.0.5", "aa:bb:cc:dd:ee:ff", "MyAP", "sensor-hub").unwrap();
    store.init_network_identity(id).unwrap();
}

fn serve(exp: &Exposition<TelemetryStore>, ep: Endpoint, mut r: ResponseRecorder) -> ResponseRecorder {
    exp.serve(ep, &mut r).unwrap();
    assert!(r.sent, "{:?} left the response unsent", ep);
    r
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn scenario_sensor_reading() {
    let (store, exp) = setup();
    store.set_sensor_reading(SensorReading::new(21.50, 45.00, 1013.25));

    let r = serve(&exp, Endpoint::Sensor, ResponseRecorder::get());
    assert_eq!(r.status, 200);
    assert_eq!(
        r.body_str(),
        r#"{"temperature":21.50,"humidity":45.00,"pressure":1013.25}"#
    );
    assert_eq!(r.content_length, Some(r.body.len()));
}

#[test]
fn scenario_rssi_sentinel() {
    let (_store, exp) = setup();
    let r = serve(&exp, Endpoint::Rssi, ResponseRecorder::get());
    assert_eq!(r.status, 200);
    assert_eq!(r.body_str(), r#"{"valid":false,"rssi":-2147483648}"#);
}

#[test]
fn scenario_netinfo_then_not_modified() {
    let (store, exp) = setup();
    install_identity(&store);

    let first = serve(&exp, Endpoint::NetInfo, ResponseRecorder::get());
    assert_eq!(first.status, 200);
    assert_eq!(
        first.body_str(),
        r#"{"ssid":"MyAP","host":"sensor-hub","ip":"10.0.0.5","mac":"aa:bb:cc:dd:ee:ff"}"#
    );
    assert_eq!(first.header("Content-Type"), Some("application/json"));
    assert_eq!(first.content_length, Some(first.body.len()));
    let etag = first.header("ETag").unwrap().to_owned();
    assert_eq!(etag, SCENARIO_ETAG);

    let second = serve(
        &exp,
        Endpoint::NetInfo,
        ResponseRecorder::get().with_request_header("If-None-Match", &etag),
    );
    assert_eq!(second.status, 304);
    assert!(second.body.is_empty());
    assert_eq!(second.header("ETag"), first.header("ETag"));
    assert_eq!(second.header("Cache-Control"), first.header("Cache-Control"));
    assert_eq!(second.header("Cache-Control"), Some("public, max-age=3600"));
}

// ── Conditional edge cases ────────────────────────────────────

#[test]
fn non_matching_validators_get_full_response() {
    let (store, exp) = setup();
    install_identity(&store);

    for value in ["\"00000000\"", "6a7eaecd", "W/\"6a7eaecd\"", "*", "", "\"6a7eaecd\", \"x\""] {
        let r = serve(
            &exp,
            Endpoint::NetInfo,
            ResponseRecorder::get().with_request_header("If-None-Match", value),
        );
        assert_eq!(r.status, 200, "If-None-Match {:?}", value);
        assert!(!r.body.is_empty());
        assert_eq!(r.header("ETag"), Some(SCENARIO_ETAG));
    }
}

#[test]
fn header_name_case_does_not_matter() {
    let (store, exp) = setup();
    install_identity(&store);
    let r = serve(
        &exp,
        Endpoint::NetInfo,
        ResponseRecorder::get().with_request_header("if-none-match", SCENARIO_ETAG),
    );
    assert_eq!(r.status, 304);
}

#[test]
fn netinfo_etag_is_stable_across_requests() {
    let (store, exp) = setup();
    install_identity(&store);
    let a = serve(&exp, Endpoint::NetInfo, ResponseRecorder::get());
    let b = serve(&exp, Endpoint::NetInfo, ResponseRecorder::head());
    assert_eq!(a.header("ETag"), b.header("ETag"));
    assert_eq!(exp.netinfo_etag().map(|e| e.as_str()), Some(SCENARIO_ETAG));
}

#[test]
fn netinfo_before_identity_is_unavailable() {
    let (store, exp) = setup();
    let r = serve(&exp, Endpoint::NetInfo, ResponseRecorder::get());
    assert_eq!(r.status, 503);

    install_identity(&store);
    let r = serve(&exp, Endpoint::NetInfo, ResponseRecorder::get());
    assert_eq!(r.status, 200);
}

// ── Cache policy ──────────────────────────────────────────────

#[test]
fn live_endpoints_are_never_cacheable() {
    let (store, exp) = setup();
    store.set_signal_strength(Rssi::new(-61));
    for ep in [Endpoint::Sensor, Endpoint::Rssi] {
        let r = serve(
            &exp,
            ep,
            ResponseRecorder::get().with_request_header("If-None-Match", SCENARIO_ETAG),
        );
        assert_eq!(r.status, 200);
        assert_eq!(r.header("ETag"), None, "{:?}", ep);
        assert_eq!(r.header("Cache-Control"), Some("no-store"), "{:?}", ep);
    }
}

#[test]
fn assets_are_conditional() {
    let (_store, exp) = setup();
    for (ep, asset) in [(Endpoint::Index, &INDEX_HTML), (Endpoint::MainJs, &MAIN_JS)] {
        let full = serve(&exp, ep, ResponseRecorder::get());
        assert_eq!(full.status, 200);
        assert_eq!(full.header("Content-Type"), Some(asset.content_type));
        assert_eq!(full.body_str(), asset.body);

        let tag = full.header("ETag").unwrap().to_owned();
        let cached = serve(
            &exp,
            ep,
            ResponseRecorder::get().with_request_header("If-None-Match", &tag),
        );
        assert_eq!(cached.status, 304);
        assert!(cached.body.is_empty());
        assert_eq!(cached.header("Cache-Control"), Some("public, max-age=86400"));
    }
}

// ── HEAD ──────────────────────────────────────────────────────

#[test]
fn head_matches_get_without_body() {
    let (store, exp) = setup();
    install_identity(&store);
    store.set_sensor_reading(SensorReading::new(1.0, 2.0, 3.0));

    for ep in ROUTES {
        let get = serve(&exp, ep, ResponseRecorder::get());
        let head = serve(&exp, ep, ResponseRecorder::head());
        assert_eq!(head.status, get.status, "{:?}", ep);
        assert_eq!(head.headers, get.headers, "{:?}", ep);
        assert_eq!(head.content_length, get.content_length, "{:?}", ep);
        assert!(head.body.is_empty(), "{:?}", ep);
    }
}

// ── Failure mapping ───────────────────────────────────────────

#[test]
fn every_construction_step_failure_becomes_500() {
    let (store, exp) = setup();
    install_identity(&store);

    let cases = [
        (Endpoint::Sensor, HttpError::SetStatus),
        (Endpoint::Sensor, HttpError::SetHeader("Content-Type")),
        (Endpoint::Sensor, HttpError::SetHeader("Cache-Control")),
        (Endpoint::Rssi, HttpError::SetContentLength),
        (Endpoint::Rssi, HttpError::SendBody),
        (Endpoint::NetInfo, HttpError::SetHeader("ETag")),
        (Endpoint::NetInfo, HttpError::SendBody),
        (Endpoint::MainJs, HttpError::SetHeader("Cache-Control")),
    ];
    for (ep, step) in cases {
        let r = serve(&exp, ep, ResponseRecorder::get().failing_on(step));
        assert_eq!(r.status, 500, "{:?} failing on {:?}", ep, step);
        assert!(r.body.is_empty());
        assert!(r.headers.is_empty());
    }
}

#[test]
fn not_modified_send_failure_becomes_500() {
    let (store, exp) = setup();
    install_identity(&store);
    let r = serve(
        &exp,
        Endpoint::NetInfo,
        ResponseRecorder::get()
            .with_request_header("If-None-Match", SCENARIO_ETAG)
            .failing_on(HttpError::SendHeaders),
    );
    assert_eq!(r.status, 500);
}
