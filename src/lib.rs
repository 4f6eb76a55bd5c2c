//! Simulation of a two-wheeled, differential-drive line-following robot.
//!
//! The closed loop: a fixed-rate scheduler drives the steering controller,
//! which senses the printed track through a three-point quantizer, predicts
//! the steering error a few ticks ahead, runs a PID law and biases the wheel
//! duties; an independent physics task settles actuator lag and integrates
//! the pose along the commanded arc. A 1 Hz monitor turns per-task stats
//! windows into measured loop rates, which in turn feed the physics time
//! step. Rendering and telemetry are read-only consumers.

pub mod control;
pub mod core;
pub mod model;
pub mod runtime;
pub mod sensing;
pub mod telemetry;
