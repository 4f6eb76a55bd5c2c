//! recorder.rs
//! Non-blocking telemetry recorder with background CSV export.
//!
//! `record()` pushes onto a bounded channel and returns immediately; the
//! exporter thread drains the channel into a CSV file and exits once every
//! producer handle has been dropped. Events are silently dropped when the
//! channel is full so no control loop ever blocks on telemetry.

use crossbeam::channel::{Receiver, Sender, bounded};
use log::{error, info};
use serde::Serialize;
use std::{
    path::PathBuf,
    thread::{self, JoinHandle},
    time::Instant,
};

const EVENT_QUEUE_CAPACITY: usize = 16_384;

/// One telemetry sample from a scheduled task.
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    /// Controller tick: predicted error, PID terms and the issued command.
    ControlTick {
        ts_ns: u64,
        err: f64,
        i: f64,
        d: f64,
        out: f64,
        left_cmd: f64,
        right_cmd: f64,
    },
    /// Physics tick: pose and effective wheel duty after the lag filter.
    PhysicsTick {
        ts_ns: u64,
        x: f64,
        y: f64,
        heading: f64,
        left: f64,
        right: f64,
    },
    /// Rate monitor refresh for one tracked task.
    RateReport {
        ts_ns: u64,
        task: &'static str,
        rate_hz: f64,
    },
}

/// Flat CSV row; unused columns stay empty for the other event kinds.
#[derive(Serialize)]
struct TelemetryRow {
    ts_ns: u64,
    source: &'static str,
    err: Option<f64>,
    i: Option<f64>,
    d: Option<f64>,
    out: Option<f64>,
    x: Option<f64>,
    y: Option<f64>,
    heading: Option<f64>,
    left: Option<f64>,
    right: Option<f64>,
    task: Option<&'static str>,
    rate_hz: Option<f64>,
}

impl TelemetryEvent {
    fn to_row(&self) -> TelemetryRow {
        let empty = |ts_ns, source| TelemetryRow {
            ts_ns,
            source,
            err: None,
            i: None,
            d: None,
            out: None,
            x: None,
            y: None,
            heading: None,
            left: None,
            right: None,
            task: None,
            rate_hz: None,
        };

        match *self {
            TelemetryEvent::ControlTick {
                ts_ns,
                err,
                i,
                d,
                out,
                left_cmd,
                right_cmd,
            } => TelemetryRow {
                err: Some(err),
                i: Some(i),
                d: Some(d),
                out: Some(out),
                left: Some(left_cmd),
                right: Some(right_cmd),
                ..empty(ts_ns, "control")
            },
            TelemetryEvent::PhysicsTick {
                ts_ns,
                x,
                y,
                heading,
                left,
                right,
            } => TelemetryRow {
                x: Some(x),
                y: Some(y),
                heading: Some(heading),
                left: Some(left),
                right: Some(right),
                ..empty(ts_ns, "physics")
            },
            TelemetryEvent::RateReport { ts_ns, task, rate_hz } => TelemetryRow {
                task: Some(task),
                rate_hz: Some(rate_hz),
                ..empty(ts_ns, "rater")
            },
        }
    }
}

/// Cloneable producer handle; timestamps are nanoseconds since creation.
#[derive(Clone)]
pub struct TelemetryRecorder {
    tx: Sender<TelemetryEvent>,
    run_start: Instant,
}

impl TelemetryRecorder {
    pub fn new() -> (Self, Receiver<TelemetryEvent>) {
        let (tx, rx) = bounded(EVENT_QUEUE_CAPACITY);
        (
            Self {
                tx,
                run_start: Instant::now(),
            },
            rx,
        )
    }

    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.run_start.elapsed().as_nanos() as u64
    }

    /// Non-blocking append; drops the event when the queue is full.
    #[inline]
    pub fn record(&self, event: TelemetryEvent) {
        let _ = self.tx.try_send(event);
    }
}

/// Spawns the exporter thread draining `rx` into `path`. The thread exits
/// when every `TelemetryRecorder` clone has been dropped.
pub fn start_exporter(rx: Receiver<TelemetryEvent>, path: PathBuf) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut writer = match csv::Writer::from_path(&path) {
            Ok(w) => w,
            Err(e) => {
                error!("Failed to create telemetry CSV {:?}: {}", path, e);
                return;
            }
        };

        while let Ok(event) = rx.recv() {
            if let Err(e) = writer.serialize(event.to_row()) {
                error!("Telemetry row write failed: {}", e);
                break;
            }
        }

        if let Err(e) = writer.flush() {
            error!("Telemetry flush failed: {}", e);
        } else {
            info!("Telemetry exported to {:?}", path);
        }
    })
}
