//! Aggregate rep statistics for a session.

use serde::{Deserialize, Serialize};

use crate::rep::RepResult;

/// Per-exercise rep counts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub exercise: String,
    pub reps: u32,
    pub valid_reps: u32,
    pub knees_over_toes_passed: u32,
    pub back_straight_passed: u32,
}

impl ExerciseSummary {
    fn new(exercise: impl Into<String>) -> Self {
        Self {
            exercise: exercise.into(),
            ..Self::default()
        }
    }
}

/// Aggregated summary across all frames and reps of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub frames_without_detection: u64,
    pub total_reps: u32,
    pub valid_reps: u32,
    pub exercises: Vec<ExerciseSummary>,
}

impl SessionSummary {
    /// Empty summary with one entry per exercise, in the given order.
    pub fn new<I, S>(exercises: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exercises: exercises.into_iter().map(ExerciseSummary::new).collect(),
            ..Self::default()
        }
    }

    pub fn record_frame(&mut self, detected: bool) {
        self.frames += 1;
        if !detected {
            self.frames_without_detection += 1;
        }
    }

    /// Fold one rep in. Reps for exercises not seen yet get a new entry.
    pub fn record(&mut self, rep: &RepResult) {
        self.total_reps += 1;
        self.valid_reps += u32::from(rep.valid_depth);

        let index = match self.exercises.iter().position(|e| e.exercise == rep.exercise) {
            Some(i) => i,
            None => {
                self.exercises.push(ExerciseSummary::new(rep.exercise.as_str()));
                self.exercises.len() - 1
            }
        };
        let entry = &mut self.exercises[index];
        entry.reps += 1;
        entry.valid_reps += u32::from(rep.valid_depth);
        if let Some(form) = rep.form {
            entry.knees_over_toes_passed += u32::from(form.knees_over_toes.is_yes());
            entry.back_straight_passed += u32::from(form.back_straight.is_yes());
        }
    }

    pub fn exercise(&self, name: &str) -> Option<&ExerciseSummary> {
        self.exercises.iter().find(|e| e.exercise == name)
    }
}

/// Compute a summary from a slice of reps. Exercises appear in the order
/// they were first seen; frame counters stay zero.
pub fn compute_summary(reps: &[RepResult]) -> SessionSummary {
    let mut summary = SessionSummary::default();
    for rep in reps {
        summary.record(rep);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormVerdicts, Verdict};

    fn rep(exercise: &str, valid: bool, form: Option<FormVerdicts>) -> RepResult {
        RepResult {
            exercise: exercise.to_string(),
            rep: 1,
            start_frame: 0,
            end_frame: 10,
            min_depth: 85.0,
            duration_sec: 0.33,
            valid_depth: valid,
            form,
        }
    }

    #[test]
    fn summary_empty() {
        assert_eq!(compute_summary(&[]), SessionSummary::default());
    }

    #[test]
    fn summary_mixed() {
        let good_form = FormVerdicts {
            knees_over_toes: Verdict::Yes,
            back_straight: Verdict::No,
        };
        let s = compute_summary(&[
            rep("Squat", true, Some(good_form)),
            rep("Bicep Curl", false, None),
            rep("Squat", false, Some(good_form)),
        ]);
        assert_eq!(s.total_reps, 3);
        assert_eq!(s.valid_reps, 1);
        assert_eq!(
            s.exercise("Squat"),
            Some(&ExerciseSummary {
                exercise: "Squat".to_string(),
                reps: 2,
                valid_reps: 1,
                knees_over_toes_passed: 2,
                back_straight_passed: 0,
            })
        );
        assert_eq!(s.exercises[1].exercise, "Bicep Curl");
    }

    #[test]
    fn preseeded_exercises_keep_their_order() {
        let mut s = SessionSummary::new(["Bicep Curl", "Squat"]);
        s.record(&rep("Squat", true, None));
        assert_eq!(s.exercises[0].reps, 0);
        assert_eq!(s.exercises[1].reps, 1);
    }

    #[test]
    fn frames_track_missing_detections() {
        let mut s = SessionSummary::default();
        s.record_frame(true);
        s.record_frame(false);
        s.record_frame(false);
        assert_eq!(s.frames, 3);
        assert_eq!(s.frames_without_detection, 2);
    }
}
