use criterion::{Criterion, criterion_group, criterion_main};
use std::cell::Cell;
use std::hint::black_box;

use line_tracking_sim::control::{PidState, SteeringController};
use line_tracking_sim::core::config::{Gains, SimConfig};
use line_tracking_sim::model::CommandSink;
use line_tracking_sim::sensing::{ErrorPredictor, SensorArray, SensorPattern};

/// Cycles through the full pattern alphabet so every quantizer branch,
/// including the lost-line drift, stays hot.
struct CyclingSensors {
    patterns: [SensorPattern; 6],
    cursor: Cell<usize>,
}

impl CyclingSensors {
    fn new() -> Self {
        Self {
            patterns: [
                SensorPattern::new(1, 0, 0),
                SensorPattern::new(1, 1, 0),
                SensorPattern::new(0, 1, 0),
                SensorPattern::new(0, 1, 1),
                SensorPattern::new(0, 0, 1),
                SensorPattern::new(0, 0, 0),
            ],
            cursor: Cell::new(0),
        }
    }
}

impl SensorArray for CyclingSensors {
    fn read_pattern(&self) -> SensorPattern {
        let i = self.cursor.get();
        self.cursor.set((i + 1) % self.patterns.len());
        self.patterns[i]
    }
}

struct NullSink;

impl CommandSink for NullSink {
    fn set_speed(&mut self, _left: f64, _right: f64) {}
}

fn control_benches(c: &mut Criterion) {
    c.bench_function("pid_update", |b| {
        let gains = Gains::default();
        let mut pid = PidState::default();
        let mut err = 0.0_f64;
        b.iter(|| {
            err = (err + 0.37) % 3.0;
            black_box(pid.update(black_box(err), &gains, 1.0))
        })
    });

    c.bench_function("predictor_fit", |b| {
        let mut predictor = ErrorPredictor::new();
        let mut err = 0.0_f64;
        b.iter(|| {
            err = (err + 0.11) % 1.0;
            predictor.push(err);
            black_box(predictor.predict(4.0))
        })
    });

    c.bench_function("steering_tick", |b| {
        let mut controller =
            SteeringController::new(CyclingSensors::new(), NullSink, &SimConfig::default());
        b.iter(|| controller.tick())
    });
}

criterion_group!(benches, control_benches);
criterion_main!(benches);
