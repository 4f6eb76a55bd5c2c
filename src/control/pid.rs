//! pid.rs
//! PID law with a leak-style anti-windup: an exactly-zero error decays the
//! integral instead of accumulating into it.

use crate::core::config::Gains;
use serde::{Deserialize, Serialize};

/// Decay factor applied to the integral on a zero-error tick.
const INTEGRAL_LEAK: f64 = 0.8;

/// Continuous controller memory, persisting across ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    pub err: f64,
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub old_err: f64,
    pub old_i: f64,
    pub out: f64,
}

impl PidState {
    /// One control tick: updates every term and returns the new output.
    pub fn update(&mut self, err: f64, gains: &Gains, dt: f64) -> f64 {
        self.err = err;
        self.p = err;
        self.i = if err == 0.0 {
            self.i * INTEGRAL_LEAK
        } else {
            self.old_i + err * dt
        };
        self.d = (err - self.old_err) / dt;
        self.out = gains.kp * self.p + gains.ki * self.i + gains.kd * self.d;
        self.old_err = err;
        self.old_i = self.i;
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gains() -> Gains {
        Gains {
            kp: 32.0,
            ki: 0.22,
            kd: 96.0,
        }
    }

    #[test]
    fn integral_accumulates_on_nonzero_error() {
        let mut pid = PidState::default();
        pid.update(0.5, &gains(), 1.0);
        assert_eq!(pid.i, 0.5);
        pid.update(0.25, &gains(), 1.0);
        assert_eq!(pid.i, 0.75);
        assert_eq!(pid.old_i, 0.75);
    }

    #[test]
    fn integral_leaks_on_zero_error() {
        let mut pid = PidState::default();
        pid.update(1.0, &gains(), 1.0);
        let i1 = pid.i;
        pid.update(0.0, &gains(), 1.0);
        assert_eq!(pid.i, i1 * 0.8);
        pid.update(0.0, &gains(), 1.0);
        assert_eq!(pid.i, i1 * 0.8 * 0.8);
    }

    #[test]
    fn derivative_tracks_error_delta() {
        let mut pid = PidState::default();
        pid.update(1.0, &gains(), 1.0);
        assert_eq!(pid.d, 1.0);
        pid.update(0.4, &gains(), 1.0);
        assert!((pid.d - (0.4 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn output_combines_weighted_terms() {
        let g = gains();
        let mut pid = PidState::default();
        let out = pid.update(0.5, &g, 1.0);
        let expected = g.kp * 0.5 + g.ki * 0.5 + g.kd * 0.5;
        assert!((out - expected).abs() < 1e-12);
        assert_eq!(out, pid.out);
    }
}
