//! Timer and thread-placement helpers.

pub mod hw_timer;
pub mod task_pin;
