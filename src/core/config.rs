//! config.rs
//! Simulation parameters: robot geometry, controller gains, loop rates.
//! Everything here is adjustable from the outside; the control law and the
//! kinematics only ever see the numbers.

use crate::core::vector::Vec2;
use serde::{Deserialize, Serialize};

/// Physical dimensions of the simulated robot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RobotGeometry {
    /// Maximum linear wheel speed at 100 % duty, cm/s.
    pub max_speed: f64,
    /// Distance between the two wheels, cm.
    pub wheel_distance: f64,
    /// Lateral distance between adjacent line sensors, cm.
    pub sensor_spread: f64,
}

impl RobotGeometry {
    pub fn half_wheel_distance(&self) -> f64 {
        self.wheel_distance / 2.0
    }
}

impl Default for RobotGeometry {
    fn default() -> Self {
        Self {
            max_speed: 10.0,
            wheel_distance: 15.0,
            sensor_spread: 3.0,
        }
    }
}

/// PID gains for the steering controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for Gains {
    fn default() -> Self {
        // Reference tuning for the 100 Hz control loop.
        Self {
            kp: 32.0,
            ki: 0.22,
            kd: 96.0,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub geometry: RobotGeometry,
    pub gains: Gains,
    /// Screen pixels per world centimeter.
    pub pixels_per_unit: f64,
    /// Cruise duty the controller steers around, percent.
    pub max_duty: f64,
    /// Ticks the predictor extrapolates ahead of the newest sample.
    pub predict_horizon: f64,
    pub control_hz: f64,
    pub physics_hz: f64,
    pub render_hz: f64,
    pub start_position: Vec2,
    pub start_heading: f64,
    pub duration_secs: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            geometry: RobotGeometry::default(),
            gains: Gains::default(),
            pixels_per_unit: 2.0,
            max_duty: 100.0,
            predict_horizon: 4.0,
            control_hz: 100.0,
            physics_hz: 120.0,
            render_hz: 60.0,
            start_position: Vec2::new(157.0, -100.0),
            start_heading: 0.0,
            duration_secs: 30,
        }
    }
}
