use std::time::Duration;

/// Step used by the UI when nudging the configured delay.
pub const DELAY_STEP_MS: u64 = 250;

/// Maintains the annotation lag between the live cursor and the point where
/// new annotations are anchored.
///
/// While playback is stopped the effective delay decays toward zero, so that
/// resuming after a long pause does not leave a stale gap between the two
/// cursors; the moment playback runs again the effective delay snaps back to
/// the configured value. The decay is deliberate UX smoothing, not drift to
/// be corrected.
#[derive(Debug, Clone)]
pub struct DelayController {
    configured_ms: u64,
    effective_ms: u64,
    duration_ms: u64,
}

impl DelayController {
    pub fn new(configured_ms: u64) -> Self {
        let mut controller = Self {
            configured_ms: 0,
            effective_ms: 0,
            duration_ms: 0,
        };
        controller.configure(configured_ms);
        controller
    }

    /// Set the configured delay, clamped to `[0, duration]`.
    pub fn configure(&mut self, delay_ms: u64) {
        self.configured_ms = delay_ms.min(self.duration_ms);
        self.effective_ms = self.effective_ms.min(self.configured_ms);
    }

    /// Supply the loaded recording's duration and re-clamp against it.
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.configured_ms = self.configured_ms.min(duration_ms);
        self.effective_ms = self.effective_ms.min(self.configured_ms);
    }

    /// Advance the decay clock.
    ///
    /// While stopped the effective delay shrinks by `elapsed`, floored at
    /// zero; otherwise it is reset to the configured delay.
    pub fn tick(&mut self, is_stopped: bool, elapsed: Duration) {
        if is_stopped {
            self.effective_ms = self.effective_ms.saturating_sub(elapsed.as_millis() as u64);
        } else {
            self.effective_ms = self.configured_ms;
        }
    }

    pub fn current(&self) -> u64 {
        self.effective_ms
    }

    pub fn configured(&self) -> u64 {
        self.configured_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with_duration(configured_ms: u64, duration_ms: u64) -> DelayController {
        let mut controller = DelayController::new(0);
        controller.set_duration(duration_ms);
        controller.configure(configured_ms);
        controller
    }

    #[test]
    fn effective_delay_tracks_configured_while_playing() {
        let mut controller = controller_with_duration(800, 10_000);
        controller.tick(false, Duration::from_millis(3));
        assert_eq!(controller.current(), 800);
    }

    #[test]
    fn decays_to_zero_while_stopped_and_resets_on_resume() {
        let mut controller = controller_with_duration(100, 10_000);
        controller.tick(false, Duration::from_millis(3));

        controller.tick(true, Duration::from_millis(40));
        assert_eq!(controller.current(), 60);
        controller.tick(true, Duration::from_millis(40));
        assert_eq!(controller.current(), 20);
        controller.tick(true, Duration::from_millis(40));
        assert_eq!(controller.current(), 0);

        controller.tick(false, Duration::from_millis(3));
        assert_eq!(controller.current(), 100);
    }

    #[test]
    fn configured_delay_is_clamped_to_the_duration() {
        let mut controller = controller_with_duration(5_000, 2_000);
        assert_eq!(controller.configured(), 2_000);

        // Without a known duration nothing can be configured.
        let mut unknown = DelayController::new(750);
        assert_eq!(unknown.configured(), 0);
        unknown.set_duration(10_000);
        unknown.configure(750);
        assert_eq!(unknown.configured(), 750);
    }

    #[test]
    fn shrinking_the_duration_reclamps_both_values() {
        let mut controller = controller_with_duration(1_500, 10_000);
        controller.tick(false, Duration::from_millis(3));
        controller.set_duration(1_000);
        assert_eq!(controller.configured(), 1_000);
        assert_eq!(controller.current(), 1_000);
    }

    #[test]
    fn lowering_the_configured_delay_caps_the_effective_delay() {
        let mut controller = controller_with_duration(1_000, 10_000);
        controller.tick(false, Duration::from_millis(3));
        assert_eq!(controller.current(), 1_000);

        controller.configure(400);
        assert_eq!(controller.current(), 400);
    }
}
