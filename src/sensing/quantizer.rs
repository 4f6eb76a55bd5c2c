//! quantizer.rs
//! Three-point line sensor: binarized brightness pattern, and the discrete
//! steering error derived from it.
//!
//! The lost-line patterns (all dark, all bright, checkerboard) do not map to
//! a fixed error; they drift the previous error further out so the robot
//! keeps searching in the direction it last saw the line.

use crate::core::config::RobotGeometry;
use crate::core::vector::Vec2;
use crate::model::PoseSource;
use crate::sensing::sampler::BackgroundSampler;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Brightness at or below this value reads as line-dark.
const DARK_THRESHOLD: u8 = 127;
/// A sensor reports 1 when at least this fraction of its window is dark.
const DARK_FRACTION: f64 = 0.5;

/// Per-tick increment applied to the previous error while the line is lost.
const DRIFT_STEP: f64 = 0.12;
/// Saturation bound for the drifting error.
const DRIFT_CAP: f64 = 3.0;

/// Sensors sit this far in front of the wheel axle, plus the wheel distance.
const SENSOR_FORWARD_MARGIN: f64 = 1.0;

/// Ordered binary readings of the three line sensors, 1 = line-dark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorPattern {
    pub left: u8,
    pub mid: u8,
    pub right: u8,
}

impl SensorPattern {
    pub fn new(left: u8, mid: u8, right: u8) -> Self {
        Self { left, mid, right }
    }

    /// 3-bit packing, left is the most significant bit.
    pub fn packed(&self) -> u8 {
        self.left * 4 + self.mid * 2 + self.right
    }
}

impl fmt::Display for SensorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.left, self.mid, self.right)
    }
}

/// The controller's only view of the world.
pub trait SensorArray {
    fn read_pattern(&self) -> SensorPattern;
}

/// Simulated three-point optical sensor bar: projects the sensor geometry
/// through the robot pose and samples the track under each point.
pub struct LineSensor<P: PoseSource> {
    offsets: [Vec2; 3],
    pixels_per_unit: f64,
    window: u32,
    sampler: Arc<dyn BackgroundSampler + Send + Sync>,
    poses: P,
}

impl<P: PoseSource> LineSensor<P> {
    pub fn new(
        geometry: &RobotGeometry,
        pixels_per_unit: f64,
        sampler: Arc<dyn BackgroundSampler + Send + Sync>,
        poses: P,
    ) -> Self {
        let forward = geometry.wheel_distance + SENSOR_FORWARD_MARGIN;
        Self {
            offsets: [
                Vec2::new(-geometry.sensor_spread, forward),
                Vec2::new(0.0, forward),
                Vec2::new(geometry.sensor_spread, forward),
            ],
            pixels_per_unit,
            window: (2.0 * pixels_per_unit) as u32,
            sampler,
            poses,
        }
    }
}

impl<P: PoseSource> SensorArray for LineSensor<P> {
    fn read_pattern(&self) -> SensorPattern {
        let pose = self.poses.pose();
        let mut bits = [0u8; 3];
        for (bit, offset) in bits.iter_mut().zip(self.offsets) {
            let world = pose.position + offset.rotated(pose.heading);
            let screen = world.scale(self.pixels_per_unit);
            let samples = self.sampler.sample(screen, self.window, self.window);
            *bit = binarize(&samples);
        }
        SensorPattern::new(bits[0], bits[1], bits[2])
    }
}

/// 1 when at least half of the sampled window reads dark.
fn binarize(samples: &[u8]) -> u8 {
    if samples.is_empty() {
        return 0;
    }
    let dark = samples.iter().filter(|&&b| b <= DARK_THRESHOLD).count();
    if dark as f64 / samples.len() as f64 >= DARK_FRACTION {
        1
    } else {
        0
    }
}

/// Maps sensor patterns to a discrete steering error, carrying one tick of
/// memory for the lost-line drift.
#[derive(Debug, Default)]
pub struct ErrorQuantizer {
    prev_error: f64,
}

impl ErrorQuantizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }

    pub fn reset(&mut self) {
        self.prev_error = 0.0;
    }

    /// Discrete error for one pattern. Unambiguous patterns map through the
    /// fixed table; ambiguous ones drift the previous error outward. The
    /// drift never initiates from an exactly-zero baseline: sign(0) is 0,
    /// so a robot that loses the line at zero error stays at zero.
    pub fn discrete_error(&mut self, pattern: SensorPattern) -> f64 {
        let error = match pattern.packed() {
            0b100 => 1.0,
            0b110 => 0.5,
            0b010 => 0.0,
            0b011 => -0.5,
            0b001 => -1.0,
            // 000, 101, 111: line lost or saturated.
            _ => {
                let sign = if self.prev_error > 0.0 {
                    1.0
                } else if self.prev_error < 0.0 {
                    -1.0
                } else {
                    0.0
                };
                (self.prev_error + sign * DRIFT_STEP).clamp(-DRIFT_CAP, DRIFT_CAP)
            }
        };
        self.prev_error = error;
        error
    }
}
