//! PID steering: the control law and the loop that feeds it.

pub mod pid;
pub mod steering;

pub use pid::PidState;
pub use steering::{ControlSnapshot, SteeringController};
