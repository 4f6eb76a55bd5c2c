//! monitor.rs
//! 1 Hz rate monitor: turns each tracked task's stats window into a
//! trailing one-second average and hands the result to a sink.

use crate::runtime::task::{self, Task, TaskHandle};

pub const MONITOR_HZ: f64 = 1.0;

/// Spawns the monitor task. `on_rate` is invoked once per tracked task per
/// refresh with the task name and the freshly computed rate in Hz.
pub fn spawn_rate_monitor<F>(tracked: Vec<TaskHandle>, mut on_rate: F) -> Task
where
    F: FnMut(&'static str, f64) + Send + 'static,
{
    task::spawn("rater", MONITOR_HZ, move || {
        for handle in &tracked {
            let rate = handle.refresh_rate();
            on_rate(handle.name(), rate);
        }
    })
}
