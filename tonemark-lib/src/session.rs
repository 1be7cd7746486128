//! The annotation session: one recording, one control thread.
//!
//! `AnnotationSession` composes the position estimator, the delay controller,
//! the chord recorder, and the current recording's timeline, and guarantees
//! the burst ordering the components rely on: each key event is carried
//! through state transition, encoding, and timeline append before the caller
//! reads the next event.

use std::time::{Duration, Instant};

use log::debug;

use crate::gesture::KeyChordRecorder;
use crate::timeline::{AnnotationTimeline, TranscriptionEntry};
use crate::timing::{DelayController, PositionEstimator};
use crate::todi::{self, InvalidGesture, KeyRole};

/// What a keyup produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Other tracked keys are still down; the chord stays open.
    Pending,
    /// The chord ended with nothing to transcribe.
    Abandoned,
    /// The chord resolved to a label and was appended to the timeline.
    Annotated(TranscriptionEntry),
    /// The chord resolved to no known tone. Advisory; nothing was appended.
    Rejected(InvalidGesture),
}

pub struct AnnotationSession {
    estimator: PositionEstimator,
    delay: DelayController,
    recorder: KeyChordRecorder,
    timeline: AnnotationTimeline,
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self {
            estimator: PositionEstimator::new(),
            delay: DelayController::new(0),
            recorder: KeyChordRecorder::new(),
            timeline: AnnotationTimeline::new(),
        }
    }

    /// Feed one position report from the player.
    pub fn record_position(&mut self, reported_ms: f64, now: Instant) {
        self.estimator.record_sample(reported_ms, now);
    }

    /// Feed the player's current transport state.
    pub fn record_playback_state(&mut self, is_playing: bool, playback_rate: f64) {
        self.estimator.record_state(is_playing, playback_rate);
    }

    /// Advance the delay decay clock. Called on every poll tick.
    pub fn tick(&mut self, is_playing: bool, elapsed: Duration) {
        self.delay.tick(!is_playing, elapsed);
    }

    /// Estimated live playback position.
    pub fn estimate(&self, now: Instant) -> f64 {
        self.estimator.estimate(now)
    }

    /// Where a new annotation would be anchored right now: the live estimate
    /// minus the effective delay.
    pub fn delayed_estimate(&self, now: Instant) -> f64 {
        (self.estimator.estimate(now) - self.delay.current() as f64).max(0.0)
    }

    /// A tone key went down.
    pub fn key_pressed(&mut self, role: KeyRole, now: Instant) {
        let anchor_ms = self.delayed_estimate(now);
        self.recorder.key_pressed(role, anchor_ms);
    }

    /// A tone key came up. Finalizes, encodes, and appends when this release
    /// empties the held set.
    pub fn key_released(&mut self, role: KeyRole) -> GestureOutcome {
        let Some(chord) = self.recorder.key_released(role) else {
            if self.recorder.is_accumulating() {
                return GestureOutcome::Pending;
            }
            return GestureOutcome::Abandoned;
        };

        match todi::encode(&chord.roles) {
            Ok(label) => {
                self.timeline.append(chord.onset_ms, label.clone());
                GestureOutcome::Annotated(TranscriptionEntry {
                    time_ms: chord.onset_ms,
                    label,
                })
            }
            Err(invalid) => GestureOutcome::Rejected(invalid),
        }
    }

    /// Any untracked key went down: the held tone keys were not a gesture.
    pub fn interrupt_chord(&mut self) {
        self.recorder.interrupt();
    }

    /// Invalidate the position estimate after a seek, so the next player
    /// report re-anchors it.
    pub fn position_invalidated(&mut self) {
        self.estimator.invalidate();
    }

    /// Abandon any in-progress chord without finalizing it, e.g. when the
    /// recording is reloaded under the user's fingers.
    pub fn abandon_chord(&mut self) {
        self.recorder.abandon();
    }

    /// Switch to another recording.
    ///
    /// Swaps in that recording's timeline and returns the previous one,
    /// abandons any in-progress chord, and invalidates the estimator so no
    /// estimate leaks across the load.
    pub fn begin_recording(
        &mut self,
        timeline: AnnotationTimeline,
        duration_ms: Option<f64>,
    ) -> AnnotationTimeline {
        if self.recorder.is_accumulating() {
            debug!("abandoning in-progress chord on recording switch");
        }
        self.recorder.abandon();
        self.estimator.invalidate();
        self.estimator.record_state(false, 1.0);

        if let Some(duration_ms) = duration_ms {
            self.duration_known(duration_ms);
        }

        std::mem::replace(&mut self.timeline, timeline)
    }

    /// The loaded recording's duration became known. Fired once per
    /// recording, before any annotation against it.
    pub fn duration_known(&mut self, duration_ms: f64) {
        self.delay.set_duration(duration_ms.max(0.0) as u64);
        self.timeline.reanchor(duration_ms);
    }

    pub fn configure_delay(&mut self, delay_ms: u64) {
        self.delay.configure(delay_ms);
    }

    /// Nudge the configured delay by a signed step.
    pub fn adjust_delay(&mut self, delta_ms: i64) {
        let configured = self.delay.configured();
        let next = if delta_ms < 0 {
            configured.saturating_sub(delta_ms.unsigned_abs())
        } else {
            configured.saturating_add(delta_ms as u64)
        };
        self.delay.configure(next);
    }

    pub fn configured_delay(&self) -> u64 {
        self.delay.configured()
    }

    pub fn current_delay(&self) -> u64 {
        self.delay.current()
    }

    pub fn timeline(&self) -> &AnnotationTimeline {
        &self.timeline
    }

    pub fn undo_last(&mut self) -> Option<TranscriptionEntry> {
        self.timeline.remove_last_created()
    }

    pub fn clear_annotations(&mut self) {
        self.timeline.clear_all();
    }
}

impl Default for AnnotationSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_session(position_ms: f64, start: Instant) -> AnnotationSession {
        let mut session = AnnotationSession::new();
        session.begin_recording(AnnotationTimeline::new(), Some(60_000.0));
        session.record_playback_state(true, 1.0);
        session.record_position(position_ms, start);
        session
    }

    #[test]
    fn chord_release_appends_an_entry_at_the_anchor() {
        let start = Instant::now();
        let mut session = playing_session(1_000.0, start);

        session.key_pressed(KeyRole::High, start);
        let outcome = session.key_released(KeyRole::High);

        match outcome {
            GestureOutcome::Annotated(entry) => {
                assert_eq!(entry.label, "H*");
                assert!((entry.time_ms - 1_000.0).abs() < 1e-6);
            }
            other => panic!("expected annotation, got {:?}", other),
        }
        assert_eq!(session.timeline().len(), 1);
    }

    #[test]
    fn anchor_subtracts_the_effective_delay() {
        let start = Instant::now();
        let mut session = playing_session(1_000.0, start);
        session.configure_delay(400);
        session.tick(true, Duration::from_millis(3));

        session.key_pressed(KeyRole::Low, start);
        match session.key_released(KeyRole::Low) {
            GestureOutcome::Annotated(entry) => {
                assert!((entry.time_ms - 600.0).abs() < 1e-6);
            }
            other => panic!("expected annotation, got {:?}", other),
        }
    }

    #[test]
    fn anchor_never_goes_negative() {
        let start = Instant::now();
        let mut session = playing_session(100.0, start);
        session.configure_delay(500);
        session.tick(true, Duration::from_millis(3));

        assert_eq!(session.delayed_estimate(start), 0.0);
    }

    #[test]
    fn untracked_key_mid_chord_produces_no_entry() {
        let start = Instant::now();
        let mut session = playing_session(1_000.0, start);

        session.key_pressed(KeyRole::High, start);
        session.interrupt_chord();
        let outcome = session.key_released(KeyRole::High);

        assert_eq!(outcome, GestureOutcome::Abandoned);
        assert!(session.timeline().is_empty());
    }

    #[test]
    fn invalid_chords_are_rejected_without_an_entry() {
        let start = Instant::now();
        let mut session = playing_session(1_000.0, start);

        session.key_pressed(KeyRole::LeftBoundary, start);
        session.key_pressed(KeyRole::RightBoundary, start);
        assert_eq!(
            session.key_released(KeyRole::LeftBoundary),
            GestureOutcome::Pending
        );
        match session.key_released(KeyRole::RightBoundary) {
            GestureOutcome::Rejected(invalid) => assert_eq!(invalid.core, "<>"),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(session.timeline().is_empty());
    }

    #[test]
    fn switching_recordings_abandons_the_open_chord() {
        let start = Instant::now();
        let mut session = playing_session(1_000.0, start);

        session.key_pressed(KeyRole::High, start);
        let previous = session.begin_recording(AnnotationTimeline::new(), Some(30_000.0));
        assert!(previous.is_empty());

        // The release after the switch must not finalize anything.
        assert_eq!(session.key_released(KeyRole::High), GestureOutcome::Abandoned);
        assert!(session.timeline().is_empty());
        // And the estimator was invalidated.
        assert_eq!(session.estimate(Instant::now()), 0.0);
    }

    #[test]
    fn entries_keep_their_anchor_when_the_delay_changes_later() {
        let start = Instant::now();
        let mut session = playing_session(2_000.0, start);

        session.key_pressed(KeyRole::High, start);
        session.key_released(KeyRole::High);

        session.configure_delay(1_000);
        session.tick(true, Duration::from_millis(3));

        assert!((session.timeline().entries()[0].time_ms - 2_000.0).abs() < 1e-6);
    }

    #[test]
    fn undo_and_clear_operate_on_the_current_timeline() {
        let start = Instant::now();
        let mut session = playing_session(1_000.0, start);

        session.key_pressed(KeyRole::High, start);
        session.key_released(KeyRole::High);
        session.key_pressed(KeyRole::Low, start);
        session.key_released(KeyRole::Low);
        assert_eq!(session.timeline().len(), 2);

        let undone = session.undo_last().expect("entry");
        assert_eq!(undone.label, "L*");
        session.clear_annotations();
        assert!(session.timeline().is_empty());
    }
}
