//! Periodic timer built on ESP-IDF's esp_timer API.
//!
//! The callback only raises a [`DueFlag`]; the real work happens in task
//! context when the main loop polls the flag. On simulation targets a
//! sleeping thread stands in for the hardware timer.
//!
//! esp_timer callbacks execute in the esp_timer task (not ISR), but they
//! share that task with every other timer in the system, so they must not
//! block.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::scheduler::DueFlag;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// A running periodic timer. Dropping it stops the timer.
pub struct PeriodicTimer {
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
    #[cfg(target_os = "espidf")]
    flag: *const DueFlag,

    #[cfg(not(target_os = "espidf"))]
    stop: Arc<std::sync::atomic::AtomicBool>,
}

// SAFETY: the handle is only touched from `Drop`, and the raw flag pointer
// came from `Arc::into_raw` on a `Sync` type.
#[cfg(target_os = "espidf")]
unsafe impl Send for PeriodicTimer {}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn raise_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `Arc<DueFlag>` pointer leaked in `start`, which
    // stays alive until the timer is deleted in `Drop`.
    let flag = unsafe { &*(arg as *const DueFlag) };
    flag.raise();
}

#[cfg(target_os = "espidf")]
impl PeriodicTimer {
    pub fn start(period: Duration, flag: Arc<DueFlag>) -> Result<Self, Error> {
        let raw = Arc::into_raw(flag);
        let args = esp_timer_create_args_t {
            callback: Some(raise_cb),
            arg: raw as *mut core::ffi::c_void,
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"periodic".as_ptr(),
            skip_unhandled_events: true,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();

        // SAFETY: `args` and `handle` outlive the call; on failure the leaked
        // Arc is reclaimed before returning.
        unsafe {
            let ret = esp_timer_create(&args, &mut handle);
            if ret != ESP_OK as i32 {
                log::error!("hw_timer: create failed (rc={})", ret);
                drop(Arc::from_raw(raw));
                return Err(Error::Init("esp_timer_create failed"));
            }
            let ret = esp_timer_start_periodic(handle, period.as_micros() as u64);
            if ret != ESP_OK as i32 {
                log::error!("hw_timer: start failed (rc={})", ret);
                esp_timer_delete(handle);
                drop(Arc::from_raw(raw));
                return Err(Error::Init("esp_timer_start_periodic failed"));
            }
        }

        log::info!("hw_timer: periodic timer every {} ms", period.as_millis());
        Ok(Self { handle, flag: raw })
    }
}

#[cfg(target_os = "espidf")]
impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        // SAFETY: the handle is valid (created in `start`). After delete no
        // further callbacks run, so the flag pointer can be released.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
            drop(Arc::from_raw(self.flag));
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl PeriodicTimer {
    pub fn start(period: Duration, flag: Arc<DueFlag>) -> Result<Self, Error> {
        use std::sync::atomic::{AtomicBool, Ordering};

        let stop = Arc::new(AtomicBool::new(false));
        let stop_rx = Arc::clone(&stop);
        std::thread::Builder::new()
            .name("hw-timer-sim".into())
            .spawn(move || {
                while !stop_rx.load(Ordering::Acquire) {
                    std::thread::sleep(period);
                    flag.raise();
                }
            })
            .map_err(|_| Error::Init("timer thread spawn failed"))?;

        log::info!("hw_timer(sim): periodic timer every {} ms", period.as_millis());
        Ok(Self { stop })
    }
}

#[cfg(not(target_os = "espidf"))]
impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.stop.store(true, std::sync::atomic::Ordering::Release);
    }
}
