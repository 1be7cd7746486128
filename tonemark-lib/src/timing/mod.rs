//! Playback timing: position estimation and the lagged annotation cursor.

mod delay;
mod estimator;

pub use delay::{DelayController, DELAY_STEP_MS};
pub use estimator::{PositionEstimator, PositionSample};
