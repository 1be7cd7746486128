//! The playback collaborator: audio output and duration probing.

mod player;
mod probe;

pub use player::{Player, MAX_RATE, MIN_RATE, RATE_STEP, SEEK_STEP_MS};
pub use probe::probe_duration_ms;

use std::fmt::{Display, Formatter};

/// Error type for audio output and probing.
#[derive(Debug)]
pub enum PlaybackError {
    Io(std::io::Error),
    Device(String),
    Decode(String),
    Probe(String),
}

impl Display for PlaybackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Device(err) => write!(f, "audio device error: {}", err),
            Self::Decode(err) => write!(f, "decode error: {}", err),
            Self::Probe(err) => write!(f, "probe error: {}", err),
        }
    }
}

impl std::error::Error for PlaybackError {}

impl From<std::io::Error> for PlaybackError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
