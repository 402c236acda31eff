//! Periodic task scheduling for the network core.
//!
//! The RSSI query can take a while inside the radio driver, so it never runs
//! in timer context. Two placements are supported:
//!
//! ```text
//!  Polled (default)                         Dedicated
//!  ─────────────────                        ─────────
//!  esp_timer ──raise()──▶ DueFlag           own thread on PRO core
//!                            │                loop {
//!  main loop ──poll()──take()┘                  sleep(period)
//!        └─▶ task.run()                         task.run()
//!                                             }
//! ```
//!
//! In both modes the task runs once immediately at start so the first value
//! does not wait a whole period. Timer ticks that arrive while the flag is
//! already raised coalesce into one run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::drivers::hw_timer::PeriodicTimer;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::Error;

/// Where a periodic task executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleMode {
    /// Timer raises a flag, the main loop runs the task.
    Polled,
    /// The task owns a thread pinned to the network core.
    Dedicated,
}

/// A unit of periodic work. Runs in task context, never in a timer callback.
pub trait ScheduledTask: Send + 'static {
    fn name(&self) -> &'static str;
    fn run(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Due flag (timer context → task context)
// ───────────────────────────────────────────────────────────────

/// Single-bit handoff from a timer callback to the polling loop.
///
/// `raise` is the only thing a timer callback does. `take` clears the flag
/// and reports whether it was set, in one atomic step.
#[derive(Debug, Default)]
pub struct DueFlag(AtomicBool);

impl DueFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A task paired with the flag that says it is due.
pub struct PolledTask<T> {
    task: T,
    due: Arc<DueFlag>,
}

impl<T: ScheduledTask> PolledTask<T> {
    pub fn new(task: T, due: Arc<DueFlag>) -> Self {
        Self { task, due }
    }

    /// Run the task if its flag was raised. Returns whether it ran.
    pub fn poll(&mut self) -> bool {
        if self.due.take() {
            self.task.run();
            true
        } else {
            false
        }
    }

    pub fn task(&self) -> &T {
        &self.task
    }
}

// ───────────────────────────────────────────────────────────────
// Runner
// ───────────────────────────────────────────────────────────────

/// Stack for a dedicated task thread (KB).
const DEDICATED_STACK_KB: usize = 4;
/// FreeRTOS priority for a dedicated task thread.
const DEDICATED_PRIORITY: u8 = 5;

/// A started periodic task, in whichever mode was configured.
pub enum Runner<T> {
    Polled {
        task: PolledTask<T>,
        /// Dropping the timer stops it.
        _timer: PeriodicTimer,
    },
    Dedicated(JoinHandle<()>),
}

impl<T: ScheduledTask> Runner<T> {
    /// Run `task` once now, then schedule it every `period`.
    pub fn start(mode: ScheduleMode, mut task: T, period: Duration) -> Result<Self, Error> {
        task.run();
        info!(
            "scheduler: '{}' every {} ms ({:?})",
            task.name(),
            period.as_millis(),
            mode
        );
        match mode {
            ScheduleMode::Polled => {
                let due = Arc::new(DueFlag::new());
                let timer = PeriodicTimer::start(period, Arc::clone(&due))?;
                Ok(Self::Polled {
                    task: PolledTask::new(task, due),
                    _timer: timer,
                })
            }
            ScheduleMode::Dedicated => {
                let handle = spawn_on_core(
                    Core::Pro,
                    DEDICATED_PRIORITY,
                    DEDICATED_STACK_KB,
                    task.name(),
                    move || {
                        loop {
                            std::thread::sleep(period);
                            task.run();
                        }
                    },
                )?;
                Ok(Self::Dedicated(handle))
            }
        }
    }

    /// Service a raised flag. A no-op in dedicated mode.
    pub fn poll(&mut self) -> bool {
        match self {
            Self::Polled { task, .. } => task.poll(),
            Self::Dedicated(_) => false,
        }
    }

    pub fn mode(&self) -> ScheduleMode {
        match self {
            Self::Polled { .. } => ScheduleMode::Polled,
            Self::Dedicated(_) => ScheduleMode::Dedicated,
        }
    }
}
