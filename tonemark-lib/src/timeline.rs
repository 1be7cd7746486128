//! Per-recording annotation timelines.
//!
//! The timeline is a plain ordered collection, decoupled from any rendering:
//! insertion order is creation order, which is not necessarily increasing in
//! time since an annotator may mark earlier points after later ones.

use serde::{Deserialize, Serialize};

/// One annotation. Immutable once created; later delay or rate changes never
/// move it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionEntry {
    pub time_ms: f64,
    pub label: String,
}

/// Creation-ordered annotations for a single recording.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTimeline {
    entries: Vec<TranscriptionEntry>,
    fractional: bool,
}

impl AnnotationTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline from absolute `(time_ms, label)` pairs, e.g. loaded
    /// from an annotation file.
    pub fn from_absolute(pairs: Vec<(f64, String)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(time_ms, label)| TranscriptionEntry { time_ms, label })
                .collect(),
            fractional: false,
        }
    }

    /// Build a timeline whose times are fractions of a not-yet-known
    /// duration. [`reanchor`] converts it to absolute milliseconds once the
    /// duration arrives.
    ///
    /// [`reanchor`]: AnnotationTimeline::reanchor
    pub fn from_fractions(pairs: Vec<(f64, String)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(fraction, label)| TranscriptionEntry {
                    time_ms: fraction,
                    label,
                })
                .collect(),
            fractional: true,
        }
    }

    pub fn append(&mut self, time_ms: f64, label: String) {
        self.entries.push(TranscriptionEntry { time_ms, label });
    }

    /// Remove the most recently created entry. Creation order, not time
    /// order: annotating an early point last and undoing removes that early
    /// point.
    pub fn remove_last_created(&mut self) -> Option<TranscriptionEntry> {
        self.entries.pop()
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Convert fraction-anchored entries to absolute milliseconds.
    ///
    /// Used once per recording, when the duration-known signal fires. A
    /// timeline already holding absolute times is left untouched.
    pub fn reanchor(&mut self, duration_ms: f64) {
        if !self.fractional {
            return;
        }
        for entry in &mut self.entries {
            entry.time_ms *= duration_ms;
        }
        self.fractional = false;
    }

    pub fn entries(&self) -> &[TranscriptionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The timeline as `(time_ms, label)` pairs, for persistence.
    pub fn to_pairs(&self) -> Vec<(f64, String)> {
        self.entries
            .iter()
            .map(|entry| (entry.time_ms, entry.label.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_keep_creation_order() {
        let mut timeline = AnnotationTimeline::new();
        timeline.append(900.0, "H*".to_string());
        timeline.append(300.0, "L%".to_string());

        let times: Vec<f64> = timeline.entries().iter().map(|e| e.time_ms).collect();
        assert_eq!(times, vec![900.0, 300.0]);
    }

    #[test]
    fn remove_last_created_is_creation_order_not_time_order() {
        let mut timeline = AnnotationTimeline::new();
        timeline.append(900.0, "H*".to_string());
        timeline.append(300.0, "L%".to_string());

        let removed = timeline.remove_last_created().expect("entry");
        assert_eq!(removed.time_ms, 300.0);
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn remove_last_created_on_empty_is_a_noop() {
        let mut timeline = AnnotationTimeline::new();
        assert!(timeline.remove_last_created().is_none());
        assert!(timeline.is_empty());
    }

    #[test]
    fn n_removals_after_n_appends_empty_the_timeline() {
        let mut timeline = AnnotationTimeline::new();
        for i in 0..5 {
            timeline.append(i as f64 * 100.0, "H*".to_string());
        }
        for _ in 0..5 {
            assert!(timeline.remove_last_created().is_some());
        }
        assert!(timeline.is_empty());
    }

    #[test]
    fn clear_all_removes_everything() {
        let mut timeline = AnnotationTimeline::new();
        timeline.append(100.0, "H*".to_string());
        timeline.append(200.0, "L*".to_string());
        timeline.clear_all();
        assert!(timeline.is_empty());
    }

    #[test]
    fn reanchor_scales_fractional_entries_once() {
        let mut timeline =
            AnnotationTimeline::from_fractions(vec![(0.25, "H*".to_string()), (0.5, "L*".to_string())]);
        timeline.reanchor(2_000.0);

        let times: Vec<f64> = timeline.entries().iter().map(|e| e.time_ms).collect();
        assert_eq!(times, vec![500.0, 1_000.0]);

        // A second duration signal must not rescale.
        timeline.reanchor(2_000.0);
        assert_eq!(timeline.entries()[0].time_ms, 500.0);
    }

    #[test]
    fn reanchor_leaves_absolute_timelines_alone() {
        let mut timeline = AnnotationTimeline::from_absolute(vec![(750.0, "H*".to_string())]);
        timeline.reanchor(10_000.0);
        assert_eq!(timeline.entries()[0].time_ms, 750.0);
    }
}
