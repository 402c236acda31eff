//! RSSI link-quality poller.
//!
//! Each run queries the radio once and publishes either the reported dBm or
//! the [`Rssi::INVALID`] sentinel, so a dropped link is visible to clients
//! instead of freezing the last good value.

use std::sync::Arc;

use log::{debug, warn};

use crate::scheduler::ScheduledTask;
use crate::telemetry::Rssi;

use super::ports::{LinkQualityPort, TelemetryPort};

pub struct LinkQualityPoller<L, T: ?Sized> {
    link: L,
    store: Arc<T>,
    failures: u32,
}

impl<L, T> LinkQualityPoller<L, T>
where
    L: LinkQualityPort,
    T: TelemetryPort + ?Sized,
{
    pub fn new(link: L, store: Arc<T>) -> Self {
        Self {
            link,
            store,
            failures: 0,
        }
    }

    /// Query once and publish. Returns what was published.
    pub fn poll_once(&mut self) -> Rssi {
        let rssi = match self.link.query_rssi() {
            Ok(dbm) => {
                self.failures = 0;
                debug!("rssi: {} dBm", dbm);
                Rssi::new(dbm)
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                // Log the first failure of a streak, then every 10th.
                if self.failures == 1 || self.failures % 10 == 0 {
                    warn!("rssi: query failed ({}), x{}", e, self.failures);
                }
                Rssi::INVALID
            }
        };
        self.store.publish_signal_strength(rssi);
        rssi
    }

    /// Consecutive failed queries.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl<L, T> ScheduledTask for LinkQualityPoller<L, T>
where
    L: LinkQualityPort + Send + 'static,
    T: TelemetryPort + ?Sized + 'static,
{
    fn name(&self) -> &'static str {
        "rssi-poller\0"
    }

    fn run(&mut self) {
        self.poll_once();
    }
}
