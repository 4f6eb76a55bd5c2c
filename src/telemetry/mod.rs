//! Telemetry: event recording with background CSV export, and the read-only
//! frame presenter contract.

pub mod hud;
pub mod recorder;

pub use hud::{ConsoleHud, FramePresenter, FrameSnapshot};
pub use recorder::{TelemetryEvent, TelemetryRecorder, start_exporter};
