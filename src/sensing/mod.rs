//! Simulated line sensing: background sampling, pattern quantization and
//! the predictive error estimator.

pub mod predictor;
pub mod quantizer;
pub mod sampler;

pub use predictor::ErrorPredictor;
pub use quantizer::{ErrorQuantizer, LineSensor, SensorArray, SensorPattern};
pub use sampler::{BackgroundSampler, TrackBitmap};
