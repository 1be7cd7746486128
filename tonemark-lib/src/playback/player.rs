use std::fs::File;
use std::io::BufReader;
use std::thread::sleep;
use std::time::Duration;

use log::warn;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use super::{probe, PlaybackError};

const OUTPUT_STREAM_OPEN_RETRIES: usize = 5;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;

/// Transport step sizes shared with the UI.
pub const SEEK_STEP_MS: f64 = 500.0;
pub const RATE_STEP: f64 = 0.1;
pub const MIN_RATE: f64 = 0.5;
pub const MAX_RATE: f64 = 2.0;

/// Audio output for one recording at a time.
///
/// `Player` owns the output stream and sink and exposes the position/state
/// feed the annotation session consumes: a reported position in
/// milliseconds, a playing flag, the playback rate, and the probed duration
/// (when the container provides one).
pub struct Player {
    _stream: OutputStream,
    sink: Sink,
    duration_ms: Option<f64>,
    rate: f64,
}

impl Player {
    pub fn new() -> Result<Self, PlaybackError> {
        let stream = open_output_stream_with_retry()
            .ok_or_else(|| PlaybackError::Device("no default output stream".to_string()))?;
        let sink = Sink::connect_new(stream.mixer());

        Ok(Self {
            _stream: stream,
            sink,
            duration_ms: None,
            rate: 1.0,
        })
    }

    /// Load a recording and start playing it from the top.
    ///
    /// The previous recording, if any, is stopped and dropped. The caller
    /// must invalidate its position estimate afterwards.
    pub fn load(&mut self, file_path: &str) -> Result<(), PlaybackError> {
        self.sink.clear();

        self.duration_ms = match probe::probe_duration_ms(file_path) {
            Ok(duration_ms) => duration_ms,
            Err(err) => {
                warn!("duration probe failed for {}: {}", file_path, err);
                None
            }
        };

        let source = Decoder::new(BufReader::new(File::open(file_path)?))
            .map_err(|err| PlaybackError::Decode(err.to_string()))?;
        self.sink.append(source);
        self.sink.set_speed(self.rate as f32);
        self.sink.play();
        Ok(())
    }

    pub fn toggle_play_pause(&self) {
        if self.is_playing() {
            self.sink.pause();
        } else {
            self.sink.play();
        }
    }

    pub fn stop(&self) {
        self.sink.clear();
    }

    /// Seek by a signed offset, clamped to the recording.
    ///
    /// The caller must invalidate its position estimate afterwards; a stale
    /// extrapolation across the jump would anchor annotations at the wrong
    /// time.
    pub fn seek_relative(&self, delta_ms: f64) {
        let mut target_ms = (self.position_ms() + delta_ms).max(0.0);
        if let Some(duration_ms) = self.duration_ms {
            target_ms = target_ms.min(duration_ms);
        }

        if let Err(err) = self.sink.try_seek(Duration::from_secs_f64(target_ms / 1000.0)) {
            warn!("seek failed: {:?}", err);
        }
    }

    /// Step the playback rate, clamped to `[0.5, 2.0]`.
    pub fn adjust_rate(&mut self, delta: f64) {
        self.rate = (self.rate + delta).clamp(MIN_RATE, MAX_RATE);
        self.sink.set_speed(self.rate as f32);
    }

    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume.max(0.0));
    }

    /// The sink's reported position in milliseconds. Updates sparsely; the
    /// estimator smooths it.
    pub fn position_ms(&self) -> f64 {
        self.sink.get_pos().as_secs_f64() * 1000.0
    }

    pub fn duration_ms(&self) -> Option<f64> {
        self.duration_ms
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_playing(&self) -> bool {
        !self.sink.is_paused() && !self.sink.empty()
    }

    /// The loaded recording has played to its end.
    pub fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

/// Open the default output stream, retrying briefly.
///
/// Returns `Some(OutputStream)` on success, otherwise `None` after all
/// retries fail.
fn open_output_stream_with_retry() -> Option<OutputStream> {
    for attempt in 0..OUTPUT_STREAM_OPEN_RETRIES {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Some(stream),
            Err(err) => {
                warn!(
                    "failed to open output stream (attempt {}): {}",
                    attempt + 1,
                    err
                );
                sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
            }
        }
    }
    None
}
