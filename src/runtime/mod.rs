//! Fixed-rate cooperative runtime: repeating tasks and their rate monitor.

pub mod monitor;
pub mod task;

pub use monitor::spawn_rate_monitor;
pub use task::{Task, TaskHandle, spawn};
