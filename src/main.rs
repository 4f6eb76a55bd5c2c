//! Demo entry point: a differential-drive robot following a circular
//! printed track.
//!
//! Four rate tasks share the robot and controller state behind mutexes:
//! - **control** (100 Hz): sense → quantize → predict → PID → wheel command
//! - **logic** (120 Hz): actuator lag + arc-kinematics pose integration,
//!   time-stepped by its own measured rate
//! - **render** (60 Hz): read-only frame snapshots to the console HUD
//! - **rater** (1 Hz): trailing-average rate measurement for all of the above
//!
//! Telemetry rows land in `data/telemetry.csv`.

use line_tracking_sim::control::SteeringController;
use line_tracking_sim::core::config::SimConfig;
use line_tracking_sim::core::vector::Vec2;
use line_tracking_sim::model::{Pose, PoseSource, Robot, SharedRobot};
use line_tracking_sim::runtime::{self, TaskHandle};
use line_tracking_sim::sensing::{LineSensor, TrackBitmap};
use line_tracking_sim::telemetry::{
    ConsoleHud, FramePresenter, FrameSnapshot, TelemetryEvent, TelemetryRecorder, start_exporter,
};

use log::{debug, info};
use parking_lot::Mutex;
use std::{
    env,
    fs::create_dir_all,
    sync::{Arc, OnceLock},
    thread,
    time::Duration,
};

/// Track bitmap side in pixels; covers ±256 cm at 2 px per cm.
const TRACK_SIDE_PX: u32 = 1024;
const TRACK_STROKE_CM: f64 = 4.0;

fn main() {
    env_logger::init();
    info!("=== LINE TRACKING SIM START ===");

    let mut config = SimConfig::default();
    if let Some(secs) = env::var("SIM_DURATION_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        config.duration_secs = secs;
    }

    // Circular loop through the configured start point, entered tangentially.
    let radius = config.start_position.dist(Vec2::ZERO);
    let mut track = TrackBitmap::blank(TRACK_SIDE_PX, TRACK_SIDE_PX);
    track.loop_stroke(config.pixels_per_unit, Vec2::ZERO, radius, TRACK_STROKE_CM);
    let track = Arc::new(track);
    config.start_heading = config.start_position.y.atan2(config.start_position.x);

    info!(
        "Track radius {:.1} cm, start ({:.1}, {:.1}), heading {:.3} rad",
        radius, config.start_position.x, config.start_position.y, config.start_heading
    );

    let robot = SharedRobot::new(Robot::new(
        config.geometry,
        Pose {
            position: config.start_position,
            heading: config.start_heading,
        },
    ));

    let (recorder, rx) = TelemetryRecorder::new();
    create_dir_all("data").ok();
    let exporter = start_exporter(rx, "data/telemetry.csv".into());

    let sensors = LineSensor::new(
        &config.geometry,
        config.pixels_per_unit,
        track.clone(),
        robot.clone(),
    );
    let controller = Arc::new(Mutex::new(SteeringController::new(
        sensors,
        robot.clone(),
        &config,
    )));
    controller.lock().start();

    // Control loop.
    let control = {
        let controller = controller.clone();
        let recorder = recorder.clone();
        runtime::spawn("control", config.control_hz, move || {
            let mut ctrl = controller.lock();
            ctrl.tick();
            let snap = ctrl.snapshot();
            drop(ctrl);
            recorder.record(TelemetryEvent::ControlTick {
                ts_ns: recorder.now_ns(),
                err: snap.pid.err,
                i: snap.pid.i,
                d: snap.pid.d,
                out: snap.pid.out,
                left_cmd: snap.command.0,
                right_cmd: snap.command.1,
            });
        })
    };

    // Physics loop; its time step comes from its own measured rate, so the
    // handle is filled in right after the spawn, before anything starts.
    let physics_slot: Arc<OnceLock<TaskHandle>> = Arc::new(OnceLock::new());
    let physics = {
        let robot = robot.clone();
        let recorder = recorder.clone();
        let slot = physics_slot.clone();
        runtime::spawn("logic", config.physics_hz, move || {
            let dt = slot
                .get()
                .map(|h| h.measured_period_ms() / 1000.0)
                .unwrap_or(0.0);
            robot.integrate(dt);

            let pose = robot.pose();
            let wheels = robot.wheels();
            recorder.record(TelemetryEvent::PhysicsTick {
                ts_ns: recorder.now_ns(),
                x: pose.position.x,
                y: pose.position.y,
                heading: pose.heading,
                left: wheels.actual.left,
                right: wheels.actual.right,
            });
        })
    };
    let _ = physics_slot.set(physics.handle.clone());

    // Render loop: read-only snapshots to the console HUD.
    let render_slot: Arc<OnceLock<TaskHandle>> = Arc::new(OnceLock::new());
    let render = {
        let controller = controller.clone();
        let robot = robot.clone();
        let physics_handle = physics.handle.clone();
        let slot = render_slot.clone();
        let mut hud = ConsoleHud;
        runtime::spawn("render", config.render_hz, move || {
            let snap = controller.lock().snapshot();
            let frame = FrameSnapshot {
                pattern: snap.pattern,
                pid: snap.pid,
                pose: robot.pose(),
                wheels: robot.wheels(),
                tps: physics_handle.measured_rate(),
                fps: slot.get().map(|h| h.measured_rate()).unwrap_or(0.0),
            };
            hud.present(&frame);
        })
    };
    let _ = render_slot.set(render.handle.clone());

    // Rate monitor over the three loops above.
    let rater = {
        let recorder = recorder.clone();
        runtime::spawn_rate_monitor(
            vec![
                control.handle.clone(),
                physics.handle.clone(),
                render.handle.clone(),
            ],
            move |task, rate_hz| {
                debug!("[rater] {} at {:.2} Hz", task, rate_hz);
                recorder.record(TelemetryEvent::RateReport {
                    ts_ns: recorder.now_ns(),
                    task,
                    rate_hz,
                });
            },
        )
    };

    for task in [&control, &physics, &render, &rater] {
        task.handle.start();
    }

    info!("Running simulation for {} seconds...", config.duration_secs);
    thread::sleep(Duration::from_secs(config.duration_secs));

    info!("Time's up, shutting down...");
    for task in [&control, &physics, &render, &rater] {
        task.handle.stop();
    }
    for task in [control, physics, render, rater] {
        task.join();
    }

    let pose = robot.pose();
    info!(
        "Final pose ({:.1}, {:.1}), heading {:.3} rad, radial error {:.2} cm",
        pose.position.x,
        pose.position.y,
        pose.heading,
        pose.position.dist(Vec2::ZERO) - radius
    );

    drop(recorder);
    let _ = exporter.join();
    info!("=== LINE TRACKING SIM FINISHED ===");
}
