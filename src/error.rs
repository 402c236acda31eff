//! Unified error types for the SensorHub firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the sampling
//! loop, the RSSI poller and the HTTP handlers all report failures the same
//! way. All variants are `Copy` so they can be logged and passed across
//! cores without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The environment sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// The status display rejected a command.
    Display(DisplayError),
    /// The radio link-quality query failed.
    Link(LinkError),
    /// A response-construction step failed.
    Http(HttpError),
    /// Peripheral or subsystem initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or was applied twice.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The I2C transaction failed (NACK, arbitration loss, timeout).
    BusFault,
    /// No device answered at the configured address, or the chip ID is wrong.
    NotDetected,
    /// The device answered but the measurement could not be completed.
    ReadFailed,
    /// The converted value is non-finite or outside the physical range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFault => write!(f, "I2C bus fault"),
            Self::NotDetected => write!(f, "sensor not detected"),
            Self::ReadFailed => write!(f, "measurement failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The controller did not acknowledge on the bus.
    BusFault,
    /// Drawing into the frame buffer failed.
    DrawFailed,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFault => write!(f, "display bus fault"),
            Self::DrawFailed => write!(f, "draw failed"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

impl std::error::Error for DisplayError {}

// ---------------------------------------------------------------------------
// Link-quality errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The station is not associated with an access point.
    NotAssociated,
    /// The radio driver returned an error code.
    QueryFailed(i32),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAssociated => write!(f, "not associated"),
            Self::QueryFailed(rc) => write!(f, "RSSI query failed (rc={rc})"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl std::error::Error for LinkError {}

// ---------------------------------------------------------------------------
// HTTP response-construction errors
// ---------------------------------------------------------------------------

/// Names the response-construction step that failed, so the log line points
/// at the exact call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    SetStatus,
    SetHeader(&'static str),
    SetContentLength,
    SendBody,
    SendHeaders,
    /// The typed body could not be serialised.
    Serialize,
    /// The resource depends on state that is not initialised yet.
    Unavailable,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetStatus => write!(f, "set status failed"),
            Self::SetHeader(name) => write!(f, "set header {name} failed"),
            Self::SetContentLength => write!(f, "set Content-Length failed"),
            Self::SendBody => write!(f, "send body failed"),
            Self::SendHeaders => write!(f, "send header-only response failed"),
            Self::Serialize => write!(f, "body serialisation failed"),
            Self::Unavailable => write!(f, "resource not yet available"),
        }
    }
}

impl From<HttpError> for Error {
    fn from(e: HttpError) -> Self {
        Self::Http(e)
    }
}

impl std::error::Error for HttpError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
