//! Robot model: pose and wheel state ownership, plus the shared handle the
//! scheduled tasks go through.
//!
//! The model is the sole writer of pose and actual duty; the controller is
//! the sole writer of target duty. With real OS threads that discipline is
//! enforced by a mutex per shared struct: each tick holds the lock for the
//! whole step, so cross-task reads only ever observe completed ticks.

pub mod robot;

pub use robot::{Pose, Robot, WheelPair, WheelState};

use parking_lot::Mutex;
use std::sync::Arc;

/// The only channel by which a controller affects the robot model.
pub trait CommandSink {
    fn set_speed(&mut self, left: f64, right: f64);
}

/// Read-only view of the robot pose, for sensing collaborators.
pub trait PoseSource {
    fn pose(&self) -> Pose;
}

/// Cloneable, thread-safe handle to the one robot instance.
#[derive(Clone)]
pub struct SharedRobot {
    inner: Arc<Mutex<Robot>>,
}

impl SharedRobot {
    pub fn new(robot: Robot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(robot)),
        }
    }

    pub fn wheels(&self) -> WheelState {
        self.inner.lock().wheels()
    }

    /// Runs one physics tick under the lock; `dt` in seconds.
    pub fn integrate(&self, dt: f64) {
        self.inner.lock().integrate(dt);
    }
}

impl PoseSource for SharedRobot {
    fn pose(&self) -> Pose {
        self.inner.lock().pose()
    }
}

impl CommandSink for SharedRobot {
    fn set_speed(&mut self, left: f64, right: f64) {
        self.inner.lock().set_speed(left, right);
    }
}
