//! robot.rs
//! Differential-drive robot model: wheel duty state with first-order actuator
//! lag, and the arc-motion integrator that advances the pose.
//!
//! All anomalies are numeric edge cases handled by explicit branches; a tick
//! always produces a finite next state.

use crate::core::config::RobotGeometry;
use crate::core::vector::Vec2;
use serde::{Deserialize, Serialize};

/// Per-tick fraction by which actual duty closes on target duty.
const ACTUATOR_LAG: f64 = 0.1;

/// World position (cm) and heading (radians). Heading accumulates without
/// bound and is never normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    pub heading: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelPair {
    pub left: f64,
    pub right: f64,
}

/// Commanded and effective wheel duty, percent of maximum linear speed.
/// Target is clamped to [-100, 100] on write; actual only ever moves through
/// the lag filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelState {
    pub target: WheelPair,
    pub actual: WheelPair,
}

pub struct Robot {
    geometry: RobotGeometry,
    pose: Pose,
    wheels: WheelState,
}

impl Robot {
    pub fn new(geometry: RobotGeometry, pose: Pose) -> Self {
        Self {
            geometry,
            pose,
            wheels: WheelState::default(),
        }
    }

    pub fn geometry(&self) -> &RobotGeometry {
        &self.geometry
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn wheels(&self) -> WheelState {
        self.wheels
    }

    /// Sets target duty for both wheels, saturating out-of-range inputs.
    pub fn set_speed(&mut self, left: f64, right: f64) {
        self.wheels.target.left = left.clamp(-100.0, 100.0);
        self.wheels.target.right = right.clamp(-100.0, 100.0);
    }

    /// First-order actuator lag: each wheel's actual duty closes a fixed
    /// fraction of the gap to its target per tick.
    fn settle_wheels(&mut self) {
        let w = &mut self.wheels;
        w.actual.left += ACTUATOR_LAG * (w.target.left - w.actual.left);
        w.actual.right += ACTUATOR_LAG * (w.target.right - w.actual.right);
    }

    /// One physics tick: settle wheel duty, then advance the pose along the
    /// arc determined by the wheel-speed ratio.
    ///
    /// `dt` is the measured tick period in seconds (0 while no rate has been
    /// measured yet, which leaves the pose in place).
    pub fn integrate(&mut self, dt: f64) {
        self.settle_wheels();

        let WheelPair { left, right } = self.wheels.actual;
        let half_wheel = self.geometry.half_wheel_distance();

        let avg_speed = self.geometry.max_speed * (left + right) / 200.0;
        let ratio = (left + right) / (right - left);
        let radius = ratio * half_wheel;
        let arc = avg_speed * dt;
        let angle = arc / (ratio * half_wheel);

        // Straight-line degenerate: equal duties drive ratio to infinity and
        // the chord formula to 0/0 territory.
        let degenerate = angle == 0.0 || radius == 0.0 || left == right;
        let local = if degenerate {
            Vec2::new(0.0, arc)
        } else {
            Vec2::new(radius - radius * angle.cos(), radius * angle.sin())
        };

        self.pose.position = self.pose.position + local.rotated(self.pose.heading);

        if angle.is_finite() {
            self.pose.heading += angle;
        } else {
            // Opposite-duty spin produces an undefined ratio; approximate as
            // in-place rotation driven by the right wheel.
            self.pose.heading += self.geometry.max_speed * (right / 800.0) * dt;
        }
    }
}
