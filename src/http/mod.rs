//! HTTP exposition layer.
//!
//! ```text
//!  server thread ──▶ Exposition::serve(endpoint, exchange)
//!                        │
//!                        ├─ /sensor  ─▶ store.read_sensor_reading() ─▶ JSON, no-store
//!                        ├─ /rssi    ─▶ store.read_signal_strength() ─▶ JSON, no-store
//!                        ├─ /netinfo ─▶ identity + cached ETag ─▶ 200 JSON | 304
//!                        └─ /, /main.js ─▶ embedded asset + content ETag ─▶ 200 | 304
//! ```
//!
//! Handlers only copy scalars out of the store and format them; no lock is
//! held while the response goes out. Any failure while building the
//! response is logged with the failing step and answered with 500 (503 when
//! the network identity is not installed yet).

pub mod assets;
pub mod body;
pub mod etag;
pub mod exchange;
pub mod recorder;

use core::fmt::Write;
use std::sync::{Arc, OnceLock};

use log::{debug, error};

use crate::app::ports::TelemetryPort;
use crate::config::SystemConfig;
use crate::error::HttpError;

use assets::{Asset, INDEX_HTML, MAIN_JS};
use body::{NetInfoBody, RssiBody, SensorBody, to_json};
use etag::ETag;
use exchange::HttpExchange;

const JSON: &str = "application/json";
const NO_STORE: &str = "no-store";

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_MODIFIED: u16 = 304;
pub const STATUS_INTERNAL_ERROR: u16 = 500;
pub const STATUS_UNAVAILABLE: u16 = 503;

// ───────────────────────────────────────────────────────────────
// Routes
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Sensor,
    Rssi,
    NetInfo,
    Index,
    MainJs,
}

/// Every route, registered for both GET and HEAD.
pub const ROUTES: [Endpoint; 5] = [
    Endpoint::Sensor,
    Endpoint::Rssi,
    Endpoint::NetInfo,
    Endpoint::Index,
    Endpoint::MainJs,
];

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Sensor => "/sensor",
            Self::Rssi => "/rssi",
            Self::NetInfo => "/netinfo",
            Self::Index => INDEX_HTML.path,
            Self::MainJs => MAIN_JS.path,
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        ROUTES.into_iter().find(|e| e.path() == path)
    }
}

// ───────────────────────────────────────────────────────────────
// Exposition
// ───────────────────────────────────────────────────────────────

type CacheControl = heapless::String<32>;

fn public_max_age(secs: u32) -> CacheControl {
    let mut s = CacheControl::new();
    // "public, max-age=" + at most 10 digits fits in 32.
    let _ = write!(s, "public, max-age={}", secs);
    s
}

/// Route handlers with their typed context: the shared store and the
/// lazily derived `/netinfo` ETag.
pub struct Exposition<T: ?Sized> {
    store: Arc<T>,
    netinfo_etag: OnceLock<ETag>,
    netinfo_cache: CacheControl,
    asset_cache: CacheControl,
}

impl<T: TelemetryPort + ?Sized> Exposition<T> {
    pub fn new(store: Arc<T>, netinfo_max_age_secs: u32, asset_max_age_secs: u32) -> Self {
        Self {
            store,
            netinfo_etag: OnceLock::new(),
            netinfo_cache: public_max_age(netinfo_max_age_secs),
            asset_cache: public_max_age(asset_max_age_secs),
        }
    }

    pub fn from_config(store: Arc<T>, cfg: &SystemConfig) -> Self {
        Self::new(store, cfg.netinfo_max_age_secs, cfg.asset_max_age_secs)
    }

    /// Fill in `ex` for `endpoint`. Errors from the handler itself are
    /// turned into an error status here; the returned error only reports
    /// that even the error response could not be sent.
    pub fn serve<X: HttpExchange + ?Sized>(
        &self,
        endpoint: Endpoint,
        ex: &mut X,
    ) -> Result<(), HttpError> {
        let result = match endpoint {
            Endpoint::Sensor => self.sensor(ex),
            Endpoint::Rssi => self.rssi(ex),
            Endpoint::NetInfo => self.netinfo(ex),
            Endpoint::Index => self.asset(&INDEX_HTML, ex),
            Endpoint::MainJs => self.asset(&MAIN_JS, ex),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                let status = match e {
                    HttpError::Unavailable => STATUS_UNAVAILABLE,
                    _ => STATUS_INTERNAL_ERROR,
                };
                error!(
                    "http: {:?} {} failed: {} -> {}",
                    ex.method(),
                    endpoint.path(),
                    e,
                    status
                );
                ex.send_error(status)
            }
        }
    }

    /// The `/netinfo` ETag, once the identity is known.
    pub fn netinfo_etag(&self) -> Option<&ETag> {
        let id = self.store.get_network_identity()?;
        Some(self.netinfo_etag.get_or_init(|| ETag::for_identity(id)))
    }

    fn sensor<X: HttpExchange + ?Sized>(&self, ex: &mut X) -> Result<(), HttpError> {
        let reading = self.store.read_sensor_reading();
        let body = to_json(&SensorBody::from(reading))?;
        send_uncached(ex, &body)
    }

    fn rssi<X: HttpExchange + ?Sized>(&self, ex: &mut X) -> Result<(), HttpError> {
        let rssi = self.store.read_signal_strength();
        let body = to_json(&RssiBody::from(rssi))?;
        send_uncached(ex, &body)
    }

    fn netinfo<X: HttpExchange + ?Sized>(&self, ex: &mut X) -> Result<(), HttpError> {
        let id = self
            .store
            .get_network_identity()
            .ok_or(HttpError::Unavailable)?;
        let etag = self.netinfo_etag.get_or_init(|| ETag::for_identity(id));

        if send_if_unmodified(ex, etag, &self.netinfo_cache)? {
            return Ok(());
        }
        let body = to_json(&NetInfoBody::from(id))?;
        send_full(ex, JSON, &body, false)
    }

    fn asset<X: HttpExchange + ?Sized>(&self, asset: &'static Asset, ex: &mut X) -> Result<(), HttpError> {
        if send_if_unmodified(ex, asset.etag(), &self.asset_cache)? {
            return Ok(());
        }
        send_full(ex, asset.content_type, asset.body.as_bytes(), true)
    }
}

// ───────────────────────────────────────────────────────────────
// Response helpers
// ───────────────────────────────────────────────────────────────

fn send_uncached<X: HttpExchange + ?Sized>(ex: &mut X, body: &[u8]) -> Result<(), HttpError> {
    ex.set_header("Cache-Control", NO_STORE)?;
    send_full(ex, JSON, body, false)
}

fn send_full<X: HttpExchange + ?Sized>(
    ex: &mut X,
    content_type: &str,
    body: &[u8],
    durable: bool,
) -> Result<(), HttpError> {
    ex.set_status(STATUS_OK)?;
    ex.set_header("Content-Type", content_type)?;
    ex.set_content_length(body.len())?;
    ex.send_body(body, durable)
}

/// Set the validator headers that every response for this resource
/// carries, then answer 304 if the client already has `etag`. Returns
/// whether the response is complete.
fn send_if_unmodified<X: HttpExchange + ?Sized>(
    ex: &mut X,
    etag: &ETag,
    cache_control: &str,
) -> Result<bool, HttpError> {
    ex.set_header("ETag", etag.as_str())?;
    ex.set_header("Cache-Control", cache_control)?;

    if !etag.matches(ex.request_header("If-None-Match")) {
        return Ok(false);
    }
    debug!("http: {:?} not modified ({})", ex.method(), etag);
    ex.set_status(STATUS_NOT_MODIFIED)?;
    ex.send_header_only()?;
    Ok(true)
}
