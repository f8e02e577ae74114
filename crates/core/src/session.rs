//! Frame-by-frame session analysis.
//!
//! [`SessionAnalyzer`] is the synchronous fold over an ordered frame stream:
//! every exercise's tracker observes the frame, the classifier picks the
//! active exercise, and only that exercise's state machine advances.
//! Finalized reps are returned to the caller, or pushed through a
//! [`RepSink`], never persisted from inside the analysis.

use crate::angle_tracker::{JointAngleTracker, JointObservation};
use crate::classifier::ExerciseClassifier;
use crate::error::CoreError;
use crate::exercise::AnalysisConfig;
use crate::landmarks::FrameSample;
use crate::rep::RepResult;
use crate::rep_machine::{RepPhase, RepStateMachine, Stage};
use crate::summary::SessionSummary;
use crate::threshold_validation::validate_positive;
use crate::types::{Degrees, FrameIndex};

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Downstream consumer of finalized reps.
pub trait RepSink {
    type Error;

    fn emit(&mut self, rep: &RepResult) -> Result<(), Self::Error>;
}

/// Collects reps in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub reps: Vec<RepResult>,
}

impl RepSink for VecSink {
    type Error = std::convert::Infallible;

    fn emit(&mut self, rep: &RepResult) -> Result<(), Self::Error> {
        self.reps.push(rep.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FrameOutcome
// ---------------------------------------------------------------------------

/// What processing one frame produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOutcome {
    pub frame: FrameIndex,
    /// The frame arrived out of order and was ignored.
    pub skipped: bool,
    pub active_exercise: Option<String>,
    /// The active exercise changed on this frame.
    pub switched: bool,
    /// Active exercise's angle, if one was available.
    pub angle: Option<Degrees>,
    pub stage: Option<Stage>,
    pub stage_rep_completed: bool,
    pub rep: Option<RepResult>,
}

// ---------------------------------------------------------------------------
// SessionAnalyzer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ExerciseLane {
    tracker: JointAngleTracker,
    machine: RepStateMachine,
}

#[derive(Debug, Clone)]
pub struct SessionAnalyzer {
    fps: f64,
    lanes: Vec<ExerciseLane>,
    classifier: ExerciseClassifier,
    last_frame: Option<FrameIndex>,
    summary: SessionSummary,
}

impl SessionAnalyzer {
    pub fn new(config: &AnalysisConfig, fps: f64) -> Result<Self, CoreError> {
        config.validate()?;
        validate_positive(fps, "frame_rate")?;

        let lanes = config
            .exercises
            .iter()
            .map(|exercise| {
                Ok(ExerciseLane {
                    tracker: JointAngleTracker::from_config(exercise, config),
                    machine: RepStateMachine::new(exercise, config, fps)?,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let names: Vec<String> = config.exercises.iter().map(|e| e.name.clone()).collect();
        let summary = SessionSummary::new(names.iter().cloned());
        let classifier = ExerciseClassifier::new(names, config.angle_change_threshold)?;

        Ok(Self {
            fps,
            lanes,
            classifier,
            last_frame: None,
            summary,
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn active_exercise(&self) -> Option<&str> {
        self.classifier.active_name()
    }

    pub fn machine(&self, exercise: &str) -> Option<&RepStateMachine> {
        self.lanes
            .iter()
            .map(|lane| &lane.machine)
            .find(|m| m.exercise() == exercise)
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Exercises whose rep is still in progress. Those reps are dropped if
    /// the stream ends now.
    pub fn pending_reps(&self) -> Vec<&str> {
        self.lanes
            .iter()
            .filter(|lane| lane.machine.phase() == RepPhase::Active)
            .map(|lane| lane.machine.exercise())
            .collect()
    }

    /// Process one frame. Frames whose index does not increase over the
    /// previous frame are ignored.
    pub fn process(&mut self, frame: &FrameSample) -> FrameOutcome {
        if let Some(last) = self.last_frame {
            if frame.index <= last {
                tracing::warn!(
                    frame = frame.index,
                    last_frame = last,
                    "Ignoring out-of-order frame",
                );
                return FrameOutcome {
                    frame: frame.index,
                    skipped: true,
                    ..FrameOutcome::default()
                };
            }
        }
        self.last_frame = Some(frame.index);
        self.summary.record_frame(frame.has_detection());

        let observations: Vec<Option<JointObservation>> = self
            .lanes
            .iter_mut()
            .map(|lane| lane.tracker.observe(frame))
            .collect();
        let angles: Vec<Option<Degrees>> = observations
            .iter()
            .map(|o| o.map(|o| o.angle))
            .collect();

        let classification = self.classifier.observe(&angles);
        let mut outcome = FrameOutcome {
            frame: frame.index,
            switched: classification.switched,
            ..FrameOutcome::default()
        };

        let Some(active) = classification.active else {
            return outcome;
        };

        let observation = observations[active];
        let lane = &mut self.lanes[active];
        let update = lane.machine.advance(frame.index, observation.as_ref());

        if let Some(rep) = &update.rep {
            self.summary.record(rep);
        }

        outcome.active_exercise = Some(lane.machine.exercise().to_string());
        outcome.angle = observation.map(|o| o.angle);
        outcome.stage = update.stage;
        outcome.stage_rep_completed = update.stage_rep_completed;
        outcome.rep = update.rep;
        outcome
    }

    /// Process one frame and hand any finalized rep to `sink`.
    pub fn process_into<S: RepSink>(
        &mut self,
        frame: &FrameSample,
        sink: &mut S,
    ) -> Result<FrameOutcome, S::Error> {
        let outcome = self.process(frame);
        if let Some(rep) = &outcome.rep {
            sink.emit(rep)?;
        }
        Ok(outcome)
    }
}

/// Fold a whole frame sequence and return the reps in emission order.
pub fn analyze_frames<'a, I>(
    config: &AnalysisConfig,
    fps: f64,
    frames: I,
) -> Result<Vec<RepResult>, CoreError>
where
    I: IntoIterator<Item = &'a FrameSample>,
{
    let mut analyzer = SessionAnalyzer::new(config, fps)?;
    let reps = frames
        .into_iter()
        .filter_map(|frame| analyzer.process(frame).rep)
        .collect();

    let pending = analyzer.pending_reps();
    if !pending.is_empty() {
        tracing::debug!(?pending, "Stream ended with reps in progress; dropping them");
    }
    Ok(reps)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::exercise::{ExerciseConfig, RepThresholds, BICEP_CURL, PUSH_UP, SQUAT};
    use crate::form::Verdict;
    use crate::test_support::{knee_angle_frames, PoseBuilder};

    const FPS: f64 = 30.0;

    fn squat_only() -> AnalysisConfig {
        AnalysisConfig::single(ExerciseConfig::squat())
            .with_thresholds(RepThresholds::new(125.0, 120.0, 105.0))
            .with_min_frames_per_rep(5)
    }

    // -- single exercise ------------------------------------------------------

    #[test]
    fn literal_scenario_through_landmarks() {
        let frames =
            knee_angle_frames(&[150.0, 150.0, 100.0, 95.0, 90.0, 95.0, 100.0, 130.0, 150.0]);
        let reps = analyze_frames(&squat_only(), FPS, &frames).expect("valid config");

        assert_eq!(reps.len(), 1);
        let record = reps[0].to_record();
        assert_eq!(record.rep, 1);
        assert_eq!(record.min_depth, 90.0);
        assert_eq!(record.duration_sec, 0.17);
        assert!(record.valid_depth);
        assert!(record.knees_over_toes.is_some());
    }

    #[test]
    fn missing_frames_do_not_break_a_rep() {
        let mut frames =
            knee_angle_frames(&[150.0, 100.0, 95.0, 90.0, 95.0, 100.0, 130.0]);
        frames[3] = FrameSample::missing(3);
        let reps = analyze_frames(&squat_only(), FPS, &frames).unwrap();
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].min_depth, 95.0);
    }

    #[test]
    fn squat_form_verdicts_come_from_landmarks() {
        let mut frames = vec![PoseBuilder::new(150.0).frame(0)];
        for i in 1..=10u64 {
            frames.push(
                PoseBuilder::new(95.0)
                    .knee_over_toe(i <= 7)
                    .back_angle(if i <= 6 { 170.0 } else { 120.0 })
                    .frame(i),
            );
        }
        frames.push(PoseBuilder::new(150.0).frame(11));

        let reps = analyze_frames(&squat_only(), FPS, &frames).unwrap();
        let record = reps[0].to_record();
        assert_eq!(record.knees_over_toes, Some(Verdict::Yes));
        assert_eq!(record.back_straight, Some(Verdict::No));
    }

    #[test]
    fn out_of_order_frames_are_skipped() {
        let mut analyzer = SessionAnalyzer::new(&squat_only(), FPS).unwrap();
        analyzer.process(&PoseBuilder::new(150.0).frame(5));
        let outcome = analyzer.process(&PoseBuilder::new(100.0).frame(5));
        assert!(outcome.skipped);
        assert_eq!(analyzer.machine(SQUAT).unwrap().phase(), RepPhase::Idle);
        assert_eq!(analyzer.summary().frames, 1);
    }

    #[test]
    fn truncated_stream_reports_pending_rep() {
        let mut analyzer = SessionAnalyzer::new(&squat_only(), FPS).unwrap();
        for frame in knee_angle_frames(&[150.0, 100.0, 90.0]) {
            assert_eq!(analyzer.process(&frame).rep, None);
        }
        assert_eq!(analyzer.pending_reps(), vec![SQUAT]);
        assert_eq!(analyzer.summary().total_reps, 0);
    }

    #[test]
    fn sink_receives_each_rep() {
        let mut analyzer = SessionAnalyzer::new(&squat_only(), FPS).unwrap();
        let mut sink = VecSink::default();
        let cycle = [150.0, 100.0, 95.0, 90.0, 95.0, 100.0, 130.0];
        let angles: Vec<Degrees> = cycle.iter().chain(cycle.iter()).copied().collect();
        for frame in knee_angle_frames(&angles) {
            analyzer.process_into(&frame, &mut sink).unwrap();
        }
        assert_eq!(sink.reps.len(), 2);
        assert_eq!(analyzer.summary().exercise(SQUAT).unwrap().reps, 2);
        assert_eq!(analyzer.summary().valid_reps, 2);
    }

    // -- multi exercise -------------------------------------------------------

    #[test]
    fn no_exercise_advances_before_classification() {
        let config = AnalysisConfig::default();
        let mut analyzer = SessionAnalyzer::new(&config, FPS).unwrap();
        let outcome = analyzer.process(&PoseBuilder::new(170.0).frame(0));
        assert_eq!(outcome.active_exercise, None);
        assert_eq!(outcome.rep, None);
    }

    #[test]
    fn classifier_routes_frames_to_active_exercise() {
        let config = AnalysisConfig::default();
        let mut analyzer = SessionAnalyzer::new(&config, FPS).unwrap();

        // Arm held still; knee moves sharply, so Squat becomes active.
        let knees = [170.0, 150.0, 120.0, 95.0, 85.0, 95.0, 120.0, 150.0, 170.0];
        let mut reps = Vec::new();
        for (i, &knee) in knees.iter().enumerate() {
            let outcome = analyzer.process(&PoseBuilder::new(knee).frame(i as FrameIndex));
            if i >= 1 {
                assert_eq!(outcome.active_exercise.as_deref(), Some(SQUAT));
            }
            reps.extend(outcome.rep);
        }

        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].exercise, SQUAT);
        assert_eq!(reps[0].min_depth, 85.0);
        assert!(reps[0].valid_depth);
        assert_eq!(analyzer.machine(BICEP_CURL).unwrap().phase(), RepPhase::Idle);
    }

    #[test]
    fn intermittent_detection_still_classifies_and_counts() {
        let config = AnalysisConfig::default();
        let mut analyzer = SessionAnalyzer::new(&config, FPS).unwrap();

        let knees = [170.0, 150.0, 120.0, 95.0, 70.0, 95.0, 120.0, 150.0, 170.0];
        let mut reps = Vec::new();
        for (i, &knee) in knees.iter().enumerate() {
            let index = 2 * i as FrameIndex;
            reps.extend(analyzer.process(&PoseBuilder::new(knee).frame(index)).rep);
            reps.extend(analyzer.process(&FrameSample::missing(index + 1)).rep);
        }

        assert_eq!(analyzer.active_exercise(), Some(SQUAT));
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].exercise, SQUAT);
        assert_eq!(reps[0].min_depth, 70.0);
        assert_eq!(analyzer.summary().frames_without_detection, 9);
    }

    #[test]
    fn push_up_selected_when_listed_without_bicep_curl() {
        let config = AnalysisConfig {
            exercises: vec![ExerciseConfig::squat(), ExerciseConfig::push_up()],
            ..AnalysisConfig::default()
        };
        let mut analyzer = SessionAnalyzer::new(&config, FPS).unwrap();
        analyzer.process(&PoseBuilder::new(170.0).arm_angle(170.0).frame(0));
        let outcome = analyzer.process(&PoseBuilder::new(170.0).arm_angle(140.0).frame(1));
        assert!(outcome.switched);
        assert_eq!(outcome.active_exercise.as_deref(), Some(PUSH_UP));
    }

    #[test]
    fn arm_movement_wins_priority_over_knee() {
        let config = AnalysisConfig::default();
        let mut analyzer = SessionAnalyzer::new(&config, FPS).unwrap();
        analyzer.process(&PoseBuilder::new(170.0).arm_angle(170.0).frame(0));
        let outcome = analyzer.process(&PoseBuilder::new(140.0).arm_angle(140.0).frame(1));
        assert!(outcome.switched);
        assert_eq!(outcome.active_exercise.as_deref(), Some(BICEP_CURL));
    }

    // -- construction ---------------------------------------------------------

    #[test]
    fn invalid_config_rejected() {
        let config = AnalysisConfig {
            exercises: vec![],
            ..AnalysisConfig::default()
        };
        assert_matches!(
            SessionAnalyzer::new(&config, FPS),
            Err(CoreError::Validation(_))
        );
        assert!(SessionAnalyzer::new(&AnalysisConfig::default(), -1.0).is_err());
    }
}
