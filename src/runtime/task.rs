//! task.rs
//! Fixed-rate repeating tasks: start-gated, sleep-compensated, rate-measured.
//! - one OS thread per logical loop; `step` bodies run to completion, shared
//!   state is only observable between completed ticks
//! - SpinSleeper keeps the period honest without burning a full core
//! - each iteration accumulates into a stats window that the 1 Hz monitor
//!   turns into a trailing-average rate

use log::debug;
use parking_lot::Mutex;
use spin_sleep::{SpinSleeper, SpinStrategy};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use thread_priority::{ThreadBuilderExt, ThreadPriority};

/// Poll interval while a task waits for its explicit start signal.
const START_POLL: Duration = Duration::from_millis(100);

/// Per-task accumulation window, reset by every rate refresh.
#[derive(Default)]
struct RateWindow {
    count: u64,
    total_elapsed_ms: f64,
}

struct TaskShared {
    name: &'static str,
    period_ms: f64,
    started: AtomicBool,
    stopped: AtomicBool,
    window: Mutex<RateWindow>,
    measured: Mutex<f64>,
}

/// Cloneable handle to a scheduled task: start/stop control plus the
/// most recently published rate measurement.
#[derive(Clone)]
pub struct TaskHandle {
    shared: Arc<TaskShared>,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    pub fn start(&self) {
        self.shared.started.store(true, Ordering::Release);
    }

    /// Requests termination. Checked between iterations only; an in-flight
    /// step always completes.
    pub fn stop(&self) {
        self.shared.stopped.store(true, Ordering::Release);
    }

    /// Rate published by the last monitor refresh, Hz.
    pub fn measured_rate(&self) -> f64 {
        *self.shared.measured.lock()
    }

    /// Measured period in milliseconds, 0 when no rate has been published.
    pub fn measured_period_ms(&self) -> f64 {
        let rate = self.measured_rate();
        if rate > 0.0 { 1000.0 / rate } else { 0.0 }
    }

    /// Computes the trailing-average rate over the window accumulated since
    /// the previous refresh, publishes it and resets the window. A window
    /// with zero iterations reports 0, not NaN.
    pub fn refresh_rate(&self) -> f64 {
        let mut w = self.shared.window.lock();
        let rate = if w.count == 0 {
            0.0
        } else {
            1000.0 * w.count as f64 / w.total_elapsed_ms
        };
        w.count = 0;
        w.total_elapsed_ms = 0.0;
        drop(w);
        *self.shared.measured.lock() = rate;
        rate
    }

    fn started(&self) -> bool {
        self.shared.started.load(Ordering::Acquire)
    }

    fn stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }
}

/// A spawned rate task: its control handle plus the join handle of the
/// backing thread.
pub struct Task {
    pub handle: TaskHandle,
    thread: JoinHandle<()>,
}

impl Task {
    pub fn join(self) {
        let _ = self.thread.join();
    }
}

/// Spawns a repeating task targeting `rate_hz` invocations per second.
///
/// The loop gates on the start flag (polled every 100 ms), then runs
/// `step` once per iteration and sleeps for whatever is left of the period.
/// An overrunning step is never compensated by dropping ticks; the next
/// sleep just shrinks to zero and the measured rate reflects the overrun.
pub fn spawn<F>(name: &'static str, rate_hz: f64, mut step: F) -> Task
where
    F: FnMut() + Send + 'static,
{
    let shared = Arc::new(TaskShared {
        name,
        period_ms: 1000.0 / rate_hz,
        started: AtomicBool::new(false),
        stopped: AtomicBool::new(false),
        window: Mutex::new(RateWindow::default()),
        measured: Mutex::new(0.0),
    });
    let handle = TaskHandle {
        shared: shared.clone(),
    };
    let loop_handle = handle.clone();

    let thread = thread::Builder::new()
        .name(name.to_string())
        .spawn_with_priority(ThreadPriority::Max, move |_| {
            run_loop(&loop_handle, &mut step);
            debug!("[{}] stopped.", loop_handle.name());
        })
        .expect("Failed to spawn rate task thread");

    Task { handle, thread }
}

fn run_loop<F: FnMut()>(handle: &TaskHandle, step: &mut F) {
    let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);

    while !handle.started() {
        if handle.stopped() {
            return;
        }
        sleeper.sleep(START_POLL);
    }

    let period_ms = handle.shared.period_ms;
    // Remain of the previous iteration; <= 0 means that iteration overran
    // its period and the overrun is charged to the stats window.
    let mut remain = 0.0_f64;

    while !handle.stopped() {
        let begin = Instant::now();
        step();

        {
            let mut w = handle.shared.window.lock();
            w.count += 1;
            w.total_elapsed_ms += if remain > 0.0 {
                period_ms
            } else {
                period_ms - remain
            };
        }

        remain = period_ms - begin.elapsed().as_secs_f64() * 1000.0;
        if remain > 0.0 {
            sleeper.sleep(Duration::from_secs_f64(remain / 1000.0));
        }
    }
}
