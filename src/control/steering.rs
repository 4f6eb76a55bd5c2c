//! steering.rs
//! The closed steering loop: quantize the sensor pattern, extrapolate the
//! error a few ticks ahead, run the PID law and bias the wheel duties.
//!
//! Sign convention: positive output slows the left wheel and speeds up the
//! right. The mapping is kept exactly as tuned; together with the error
//! table it closes the loop stably even though the isolated sign reads
//! counter-intuitively.

use crate::control::pid::PidState;
use crate::core::config::{Gains, SimConfig};
use crate::model::CommandSink;
use crate::sensing::predictor::{ErrorPredictor, SAMPLE_DT};
use crate::sensing::quantizer::{ErrorQuantizer, SensorArray, SensorPattern};

/// Snapshot of the controller's observable state, for telemetry and HUD.
#[derive(Debug, Clone, Copy)]
pub struct ControlSnapshot {
    pub pattern: SensorPattern,
    pub pid: PidState,
    pub command: (f64, f64),
}

/// Sensor-driven steering controller. Never reads the robot pose; the
/// world reaches it only through the sensor array, and it reaches the
/// world only through the command sink.
pub struct SteeringController<S: SensorArray, C: CommandSink> {
    sensors: S,
    commands: C,
    gains: Gains,
    max_duty: f64,
    horizon: f64,
    quantizer: ErrorQuantizer,
    predictor: ErrorPredictor,
    pid: PidState,
    last_pattern: SensorPattern,
    last_command: (f64, f64),
}

impl<S: SensorArray, C: CommandSink> SteeringController<S, C> {
    pub fn new(sensors: S, commands: C, config: &SimConfig) -> Self {
        Self {
            sensors,
            commands,
            gains: config.gains,
            max_duty: config.max_duty,
            horizon: config.predict_horizon,
            quantizer: ErrorQuantizer::new(),
            predictor: ErrorPredictor::new(),
            pid: PidState::default(),
            last_pattern: SensorPattern::default(),
            last_command: (0.0, 0.0),
        }
    }

    /// Initial command: both wheels at cruise duty.
    pub fn start(&mut self) {
        self.commands.set_speed(self.max_duty, self.max_duty);
        self.last_command = (self.max_duty, self.max_duty);
    }

    /// One control tick: sense, quantize, predict, PID, command.
    pub fn tick(&mut self) {
        let pattern = self.sensors.read_pattern();
        let discrete = self.quantizer.discrete_error(pattern);
        self.predictor.push(discrete);

        let err = self.predictor.predict(self.horizon);
        let out = self.pid.update(err, &self.gains, SAMPLE_DT);

        let left = (self.max_duty - out).clamp(-100.0, 100.0);
        let right = (self.max_duty + out).clamp(-100.0, 100.0);
        self.commands.set_speed(left, right);

        self.last_pattern = pattern;
        self.last_command = (left, right);
    }

    pub fn pid(&self) -> &PidState {
        &self.pid
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            pattern: self.last_pattern,
            pid: self.pid,
            command: self.last_command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct ScriptedSensors {
        patterns: Vec<SensorPattern>,
        cursor: Mutex<usize>,
    }

    impl ScriptedSensors {
        fn repeat(pattern: SensorPattern) -> Self {
            Self {
                patterns: vec![pattern],
                cursor: Mutex::new(0),
            }
        }
    }

    impl SensorArray for ScriptedSensors {
        fn read_pattern(&self) -> SensorPattern {
            let mut cursor = self.cursor.lock();
            let p = self.patterns[(*cursor).min(self.patterns.len() - 1)];
            *cursor += 1;
            p
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        commands: Arc<Mutex<Vec<(f64, f64)>>>,
    }

    impl CommandSink for RecordingSink {
        fn set_speed(&mut self, left: f64, right: f64) {
            self.commands.lock().push((left, right));
        }
    }

    #[test]
    fn start_commands_cruise_duty() {
        let sink = RecordingSink::default();
        let mut ctrl = SteeringController::new(
            ScriptedSensors::repeat(SensorPattern::new(0, 1, 0)),
            sink.clone(),
            &SimConfig::default(),
        );
        ctrl.start();
        assert_eq!(sink.commands.lock().as_slice(), &[(100.0, 100.0)]);
    }

    #[test]
    fn centered_line_holds_course() {
        let sink = RecordingSink::default();
        let mut ctrl = SteeringController::new(
            ScriptedSensors::repeat(SensorPattern::new(0, 1, 0)),
            sink.clone(),
            &SimConfig::default(),
        );
        for _ in 0..20 {
            ctrl.tick();
        }
        for &(l, r) in sink.commands.lock().iter() {
            assert_eq!((l, r), (100.0, 100.0));
        }
        assert_eq!(ctrl.pid().out, 0.0);
    }

    #[test]
    fn left_drift_biases_wheels_apart() {
        // Line under the left sensor: discrete error +1, so the first tick's
        // predicted error and output are positive, slowing the left wheel.
        let sink = RecordingSink::default();
        let mut ctrl = SteeringController::new(
            ScriptedSensors::repeat(SensorPattern::new(1, 0, 0)),
            sink.clone(),
            &SimConfig::default(),
        );
        ctrl.tick();

        let &(left, right) = sink.commands.lock().last().unwrap();
        assert!(ctrl.pid().out > 0.0);
        assert!(left < 100.0);
        assert_eq!(right, 100.0); // 100 + out saturates at the duty cap
        assert!(left >= -100.0);
    }

    #[test]
    fn commands_saturate_at_duty_limits() {
        let sink = RecordingSink::default();
        let mut ctrl = SteeringController::new(
            ScriptedSensors::repeat(SensorPattern::new(1, 0, 0)),
            sink.clone(),
            &SimConfig::default(),
        );
        for _ in 0..50 {
            ctrl.tick();
        }
        for &(l, r) in sink.commands.lock().iter() {
            assert!((-100.0..=100.0).contains(&l));
            assert!((-100.0..=100.0).contains(&r));
        }
    }

    #[test]
    fn first_tick_output_matches_hand_computation() {
        // Pattern 100 -> discrete +1. History [1,0,0,0,0,0]:
        // sums: x=1, tx=0; A=(6*0-(-15)*1)/105=1/7, B=(1*55-(-15)*0)/105=11/21.
        // E(4) = 4/7 + 11/21 = 23/21. P=D=E, I=E.
        let e = 23.0 / 21.0;
        let cfg = SimConfig::default();
        let expected_out = cfg.gains.kp * e + cfg.gains.ki * e + cfg.gains.kd * e;

        let sink = RecordingSink::default();
        let mut ctrl = SteeringController::new(
            ScriptedSensors::repeat(SensorPattern::new(1, 0, 0)),
            sink.clone(),
            &cfg,
        );
        ctrl.tick();

        assert!((ctrl.pid().err - e).abs() < 1e-12);
        assert!((ctrl.pid().out - expected_out).abs() < 1e-9);

        let &(left, right) = sink.commands.lock().last().unwrap();
        assert!((left - (100.0 - expected_out).clamp(-100.0, 100.0)).abs() < 1e-9);
        assert_eq!(right, 100.0);
    }
}
