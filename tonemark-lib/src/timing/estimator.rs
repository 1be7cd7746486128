use std::time::Instant;

/// One position report from the player, tagged with when it was observed.
#[derive(Debug, Clone, Copy)]
pub struct PositionSample {
    pub reported_ms: f64,
    pub observed_at: Instant,
}

/// Turns the player's sparse position reports into a continuously queryable
/// position.
///
/// The player only reports every 50-100 ms; between reports the estimate
/// advances linearly by the playback rate. While paused the last report is
/// returned unchanged. Before the first report, and after [`invalidate`]
/// (required on every seek or load so stale extrapolation cannot leak across
/// the jump), the estimate is 0.
///
/// [`invalidate`]: PositionEstimator::invalidate
#[derive(Debug, Clone)]
pub struct PositionEstimator {
    last_sample: Option<PositionSample>,
    is_playing: bool,
    playback_rate: f64,
}

impl PositionEstimator {
    pub fn new() -> Self {
        Self {
            last_sample: None,
            is_playing: false,
            playback_rate: 1.0,
        }
    }

    /// Store the latest position report.
    pub fn record_sample(&mut self, reported_ms: f64, now: Instant) {
        self.last_sample = Some(PositionSample {
            reported_ms: reported_ms.max(0.0),
            observed_at: now,
        });
    }

    /// Update playback state without touching the last report.
    pub fn record_state(&mut self, is_playing: bool, playback_rate: f64) {
        self.is_playing = is_playing;
        self.playback_rate = playback_rate.max(0.0);
    }

    /// Drop the last report so the next one re-anchors estimation.
    ///
    /// Must be called whenever the player seeks or loads a new file.
    pub fn invalidate(&mut self) {
        self.last_sample = None;
    }

    /// Current position estimate in milliseconds.
    pub fn estimate(&self, now: Instant) -> f64 {
        let Some(sample) = self.last_sample else {
            return 0.0;
        };

        if !self.is_playing {
            return sample.reported_ms;
        }

        let elapsed_ms = now.saturating_duration_since(sample.observed_at).as_secs_f64() * 1000.0;
        (sample.reported_ms + elapsed_ms * self.playback_rate).max(0.0)
    }
}

impl Default for PositionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn estimate_is_zero_before_any_sample() {
        let estimator = PositionEstimator::new();
        assert_eq!(estimator.estimate(Instant::now()), 0.0);
    }

    #[test]
    fn extrapolates_linearly_while_playing() {
        let start = Instant::now();
        let mut estimator = PositionEstimator::new();
        estimator.record_state(true, 1.0);
        estimator.record_sample(1_000.0, start);

        let later = start + Duration::from_millis(80);
        assert!((estimator.estimate(later) - 1_080.0).abs() < 1e-6);
    }

    #[test]
    fn extrapolation_scales_with_playback_rate() {
        let start = Instant::now();
        let mut estimator = PositionEstimator::new();
        estimator.record_state(true, 0.5);
        estimator.record_sample(2_000.0, start);

        let later = start + Duration::from_millis(100);
        assert!((estimator.estimate(later) - 2_050.0).abs() < 1e-6);
    }

    #[test]
    fn holds_still_while_paused() {
        let start = Instant::now();
        let mut estimator = PositionEstimator::new();
        estimator.record_state(false, 1.0);
        estimator.record_sample(500.0, start);

        let later = start + Duration::from_millis(300);
        assert_eq!(estimator.estimate(later), 500.0);
    }

    #[test]
    fn invalidation_returns_to_zero_until_the_next_sample() {
        let start = Instant::now();
        let mut estimator = PositionEstimator::new();
        estimator.record_state(true, 1.0);
        estimator.record_sample(1_500.0, start);
        estimator.invalidate();

        let later = start + Duration::from_millis(50);
        assert_eq!(estimator.estimate(later), 0.0);

        estimator.record_sample(300.0, later);
        assert!((estimator.estimate(later) - 300.0).abs() < 1e-6);
    }

    #[test]
    fn a_new_sample_supersedes_the_old_anchor() {
        let start = Instant::now();
        let mut estimator = PositionEstimator::new();
        estimator.record_state(true, 1.0);
        estimator.record_sample(1_000.0, start);
        estimator.record_sample(1_060.0, start + Duration::from_millis(60));

        let later = start + Duration::from_millis(100);
        assert!((estimator.estimate(later) - 1_100.0).abs() < 1e-6);
    }
}
