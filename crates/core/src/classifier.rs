//! Exercise identification from joint-angle deltas.
//!
//! Every candidate exercise's angle is watched each frame. A candidate is
//! detected when its angle moved by more than the change threshold since
//! the previous frame; the earliest-listed detected candidate wins. With
//! no detection the active exercise stays as it was, so one quiet or noisy
//! frame never flips the selection.

use crate::error::CoreError;
use crate::threshold_validation::validate_positive;
use crate::types::Degrees;

/// Index of the first candidate whose absolute change exceeds `threshold`.
///
/// `None` entries (no angle this frame, or no previous angle) never trigger.
pub fn detect_exercise(changes: &[Option<Degrees>], threshold: Degrees) -> Option<usize> {
    changes
        .iter()
        .position(|change| change.is_some_and(|delta| delta.abs() > threshold))
}

/// Result of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Candidate detected on this frame, if any.
    pub detected: Option<usize>,
    /// Candidate active after this frame.
    pub active: Option<usize>,
    /// The active candidate changed on this frame.
    pub switched: bool,
}

#[derive(Debug, Clone)]
pub struct ExerciseClassifier {
    candidates: Vec<String>,
    previous: Vec<Option<Degrees>>,
    change_threshold: Degrees,
    active: Option<usize>,
}

impl ExerciseClassifier {
    /// Candidates are given in priority order. With a single candidate it
    /// is active from the first frame.
    pub fn new(candidates: Vec<String>, change_threshold: Degrees) -> Result<Self, CoreError> {
        if candidates.is_empty() {
            return Err(CoreError::Validation(
                "classifier needs at least one candidate exercise".to_string(),
            ));
        }
        validate_positive(change_threshold, "angle_change_threshold")?;

        let active = (candidates.len() == 1).then_some(0);
        Ok(Self {
            previous: vec![None; candidates.len()],
            candidates,
            change_threshold,
            active,
        })
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|i| self.candidates[i].as_str())
    }

    /// Per-candidate change against the previous frame.
    pub fn angle_changes(&self, angles: &[Option<Degrees>]) -> Vec<Option<Degrees>> {
        self.previous
            .iter()
            .zip(angles)
            .map(|(prev, current)| Some(current.as_ref()? - prev.as_ref()?))
            .collect()
    }

    /// Classify one frame given each candidate's angle (same order as the
    /// candidates). Every candidate's history is updated, active or not; a
    /// missing angle leaves that candidate's last angle in place.
    pub fn observe(&mut self, angles: &[Option<Degrees>]) -> Classification {
        debug_assert_eq!(angles.len(), self.candidates.len());

        let changes = self.angle_changes(angles);
        let detected = detect_exercise(&changes, self.change_threshold);

        for (slot, angle) in self.previous.iter_mut().zip(angles) {
            if angle.is_some() {
                *slot = *angle;
            }
        }

        let before = self.active;
        if detected.is_some() {
            self.active = detected;
        }
        let switched = self.active != before;

        if switched {
            tracing::debug!(
                from = before.map(|i| self.candidates[i].as_str()),
                to = self.active_name(),
                "Active exercise switched",
            );
        }

        Classification {
            detected,
            active: self.active,
            switched,
        }
    }
}
