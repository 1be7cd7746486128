//! Key-chord capture.
//!
//! A chord is the set of tone keys held down concurrently between the first
//! keydown and the release of the last held key. The recorder owns all chord
//! state for one window; there is no global key tracking.

use crate::todi::KeyRole;

/// A finalized chord, ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    /// Roles in first-press order, deduplicated.
    pub roles: Vec<KeyRole>,
    /// Position snapshot taken at chord onset, in milliseconds.
    pub onset_ms: f64,
}

/// Tracks held tone keys and accumulates the in-progress chord.
///
/// Keydowns of untracked keys clear the accumulated chord: pressing a
/// transport or navigation key mid-chord means the held tone keys were not an
/// annotation gesture. The held set itself is unaffected, so tone keys
/// pressed after the interruption start a fresh chord.
#[derive(Debug, Clone, Default)]
pub struct KeyChordRecorder {
    held: Vec<KeyRole>,
    roles: Vec<KeyRole>,
    onset_ms: Option<f64>,
}

impl KeyChordRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tracked keydown.
    ///
    /// `position_ms` is the annotation anchor for this instant (estimated
    /// position minus the effective delay). Every tracked keydown refreshes
    /// the chord onset except DOWNSTEP, which is a modifier and must not
    /// redefine timing when pressed after the primary tone key.
    pub fn key_pressed(&mut self, role: KeyRole, position_ms: f64) {
        if !self.held.contains(&role) {
            self.held.push(role);
        }
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        if role != KeyRole::Downstep {
            self.onset_ms = Some(position_ms);
        }
    }

    /// Record a tracked keyup.
    ///
    /// Returns the finalized chord once the held set empties, if the chord
    /// accumulated any roles and an onset was recorded; otherwise the chord
    /// is discarded silently. While any tracked key remains down the chord
    /// stays open, whatever the release order.
    pub fn key_released(&mut self, role: KeyRole) -> Option<Chord> {
        self.held.retain(|held| *held != role);
        if !self.held.is_empty() {
            return None;
        }

        let roles = std::mem::take(&mut self.roles);
        let onset_ms = self.onset_ms.take();

        match onset_ms {
            Some(onset_ms) if !roles.is_empty() => Some(Chord { roles, onset_ms }),
            _ => None,
        }
    }

    /// An untracked key was pressed: drop the accumulated chord.
    pub fn interrupt(&mut self) {
        self.roles.clear();
        self.onset_ms = None;
    }

    /// Forget everything, held keys included. Used when the recording
    /// changes under the user's fingers; the chord is abandoned, never
    /// finalized.
    pub fn abandon(&mut self) {
        self.held.clear();
        self.interrupt();
    }

    pub fn is_accumulating(&self) -> bool {
        !self.held.is_empty()
    }
}
