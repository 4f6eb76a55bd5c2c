//! hud.rs
//! Frame presenter contract plus a console implementation. Presenters are
//! strictly read-only consumers of simulation state.

use crate::control::PidState;
use crate::model::{Pose, WheelState};
use crate::sensing::SensorPattern;
use log::debug;

/// Everything a presenter gets to see, captured between completed ticks.
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot {
    pub pattern: SensorPattern,
    pub pid: PidState,
    pub pose: Pose,
    pub wheels: WheelState,
    /// Measured physics rate, Hz.
    pub tps: f64,
    /// Measured render rate, Hz.
    pub fps: f64,
}

pub trait FramePresenter {
    fn present(&mut self, frame: &FrameSnapshot);
}

/// Log-based stand-in for the canvas HUD: sensor triple, measured rates,
/// controller terms and wheel duties, one debug line per frame.
#[derive(Default)]
pub struct ConsoleHud;

impl FramePresenter for ConsoleHud {
    fn present(&mut self, frame: &FrameSnapshot) {
        debug!(
            "sensors [{}]  TPS {:.2}  FPS {:.2}  err {:.2} P {:.2} I {:.2} D {:.2} out {:.2}  \
             wheels L {:.2} R {:.2}  pos ({:.1}, {:.1}) heading {:.3}",
            frame.pattern,
            frame.tps,
            frame.fps,
            frame.pid.err,
            frame.pid.p,
            frame.pid.i,
            frame.pid.d,
            frame.pid.out,
            frame.wheels.actual.left,
            frame.wheels.actual.right,
            frame.pose.position.x,
            frame.pose.position.y,
            frame.pose.heading,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vector::Vec2;

    struct CountingPresenter {
        frames: usize,
        last_fps: f64,
    }

    impl FramePresenter for CountingPresenter {
        fn present(&mut self, frame: &FrameSnapshot) {
            self.frames += 1;
            self.last_fps = frame.fps;
        }
    }

    #[test]
    fn presenters_receive_snapshots_unchanged() {
        let mut presenter = CountingPresenter {
            frames: 0,
            last_fps: 0.0,
        };
        let frame = FrameSnapshot {
            pattern: SensorPattern::new(0, 1, 0),
            pid: PidState::default(),
            pose: Pose {
                position: Vec2::new(157.0, -100.0),
                heading: 0.0,
            },
            wheels: WheelState::default(),
            tps: 120.0,
            fps: 60.0,
        };
        presenter.present(&frame);
        presenter.present(&frame);
        assert_eq!(presenter.frames, 2);
        assert_eq!(presenter.last_fps, 60.0);
    }
}
