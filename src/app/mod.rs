//! Application core: pure domain logic, zero I/O.
//!
//! The sampling producer, the RSSI poller and the status text all talk to
//! hardware through the **port traits** in [`ports`], so every loop here
//! runs unchanged against mocks on the host.

pub mod link_poller;
pub mod ports;
pub mod sampler;
pub mod status;
