//! Per-exercise rep segmentation.
//!
//! [`RepStateMachine`] consumes one optional [`JointObservation`] per frame
//! and moves between [`RepPhase::Idle`] and [`RepPhase::Active`]:
//!
//! - `Idle -> Active` when the angle passes the enter threshold. A
//!   [`RepInProgress`] accumulator is opened with the first sample.
//! - `Active -> Active` while the angle has not recovered: samples and form
//!   signals are accumulated.
//! - `Active -> Idle` when the angle passes back over the recovery
//!   threshold. The accumulator is finalized into a [`RepResult`] if it
//!   spans at least `min_frames_per_rep` frames, otherwise discarded.
//!
//! Frames without an observation change nothing. A stream that ends while
//! `Active` never produces a result for the dangling rep.
//!
//! Alongside segmentation the machine runs the up/down [`StageCounter`],
//! the lightweight live counter driven by the exercise's own up and down
//! thresholds.

use serde::{Deserialize, Serialize};

use crate::angle_tracker::JointObservation;
use crate::error::CoreError;
use crate::exercise::{AnalysisConfig, Direction, ExerciseConfig, RepThresholds};
use crate::form::FormTally;
use crate::rep::{round_to, RepResult};
use crate::threshold_validation::validate_positive;
use crate::types::{Degrees, FrameIndex};

// ---------------------------------------------------------------------------
// Stage counter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Up,
    Down,
}

/// Up/down stage tracking with a completion counter.
///
/// For `UpDown`: an angle above `up_threshold` sets the stage to `Down`;
/// an angle below `down_threshold` while in `Down` flips it to `Up` and
/// counts one rep. `DownUp` mirrors both comparisons and stage labels.
#[derive(Debug, Clone)]
pub struct StageCounter {
    up_threshold: Degrees,
    down_threshold: Degrees,
    direction: Direction,
    stage: Option<Stage>,
    count: u32,
}

impl StageCounter {
    pub fn new(up_threshold: Degrees, down_threshold: Degrees, direction: Direction) -> Self {
        Self {
            up_threshold,
            down_threshold,
            direction,
            stage: None,
            count: 0,
        }
    }

    /// Feed one angle; returns `true` if this angle completed a rep.
    pub fn update(&mut self, angle: Degrees) -> bool {
        let (armed, completed) = match self.direction {
            Direction::UpDown => (Stage::Down, Stage::Up),
            Direction::DownUp => (Stage::Up, Stage::Down),
        };
        if self.direction.is_recovered(angle, self.up_threshold) {
            self.stage = Some(armed);
        }
        if self.direction.is_past(angle, self.down_threshold) && self.stage == Some(armed) {
            self.stage = Some(completed);
            self.count += 1;
            return true;
        }
        false
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

// ---------------------------------------------------------------------------
// Rep accumulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepPhase {
    Idle,
    Active,
}

/// Mutable state of the rep currently being tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct RepInProgress {
    pub start_frame: FrameIndex,
    pub samples: Vec<Degrees>,
    pub tally: FormTally,
}

impl RepInProgress {
    fn open(frame: FrameIndex, observation: &JointObservation) -> Self {
        let mut rep = Self {
            start_frame: frame,
            samples: Vec::new(),
            tally: FormTally::default(),
        };
        rep.push(observation);
        rep
    }

    fn push(&mut self, observation: &JointObservation) {
        self.samples.push(observation.angle);
        self.tally.record(observation.form);
    }

    /// Deepest sampled angle for `direction`.
    fn depth(&self, direction: Direction) -> Option<Degrees> {
        self.samples
            .iter()
            .copied()
            .reduce(|a, b| direction.deeper(a, b))
    }
}

// ---------------------------------------------------------------------------
// RepStateMachine
// ---------------------------------------------------------------------------

/// What one frame did to a state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MachineUpdate {
    pub stage: Option<Stage>,
    /// The stage counter completed a rep on this frame.
    pub stage_rep_completed: bool,
    /// A rep was finalized and passed the minimum-duration floor.
    pub rep: Option<RepResult>,
}

#[derive(Debug, Clone)]
pub struct RepStateMachine {
    exercise: String,
    direction: Direction,
    thresholds: RepThresholds,
    min_frames: u64,
    fps: f64,
    form_checks: bool,
    verdict_ratio: f64,
    stages: StageCounter,
    in_progress: Option<RepInProgress>,
    reps: u32,
}

impl RepStateMachine {
    pub fn new(
        exercise: &ExerciseConfig,
        analysis: &AnalysisConfig,
        fps: f64,
    ) -> Result<Self, CoreError> {
        validate_positive(fps, "frame_rate")?;
        let thresholds = exercise.rep_thresholds(&analysis.thresholds);
        thresholds.validate(exercise.direction)?;

        if !thresholds.has_dead_band(exercise.direction) {
            tracing::warn!(
                exercise = %exercise.name,
                enter = thresholds.enter,
                recover = thresholds.recover,
                "Recovery threshold leaves no dead-band; reps may chatter near the threshold",
            );
        }

        Ok(Self {
            exercise: exercise.name.clone(),
            direction: exercise.direction,
            thresholds,
            min_frames: analysis.min_frames_per_rep,
            fps,
            form_checks: exercise.form_checks,
            verdict_ratio: analysis.form.verdict_ratio,
            stages: StageCounter::new(
                exercise.up_threshold,
                exercise.down_threshold,
                exercise.direction,
            ),
            in_progress: None,
            reps: 0,
        })
    }

    pub fn exercise(&self) -> &str {
        &self.exercise
    }

    pub fn phase(&self) -> RepPhase {
        if self.in_progress.is_some() {
            RepPhase::Active
        } else {
            RepPhase::Idle
        }
    }

    pub fn in_progress(&self) -> Option<&RepInProgress> {
        self.in_progress.as_ref()
    }

    /// Number of reps emitted so far.
    pub fn rep_count(&self) -> u32 {
        self.reps
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stages.stage()
    }

    pub fn stage_count(&self) -> u32 {
        self.stages.count()
    }

    /// Advance by one frame. `None` means no angle was available for this
    /// frame; state is left exactly as it was.
    pub fn advance(
        &mut self,
        frame: FrameIndex,
        observation: Option<&JointObservation>,
    ) -> MachineUpdate {
        let Some(observation) = observation else {
            return MachineUpdate {
                stage: self.stages.stage(),
                ..MachineUpdate::default()
            };
        };

        let stage_rep_completed = self.stages.update(observation.angle);
        let rep = self.step(frame, observation);

        MachineUpdate {
            stage: self.stages.stage(),
            stage_rep_completed,
            rep,
        }
    }

    fn step(&mut self, frame: FrameIndex, observation: &JointObservation) -> Option<RepResult> {
        let angle = observation.angle;
        match self.in_progress.as_mut() {
            None => {
                if self.direction.is_past(angle, self.thresholds.enter) {
                    tracing::trace!(exercise = %self.exercise, frame, angle, "Rep started");
                    self.in_progress = Some(RepInProgress::open(frame, observation));
                }
                None
            }
            Some(rep) => {
                if self.direction.is_recovered(angle, self.thresholds.recover) {
                    let rep = self.in_progress.take()?;
                    self.finalize(rep, frame)
                } else {
                    rep.push(observation);
                    None
                }
            }
        }
    }

    fn finalize(&mut self, rep: RepInProgress, end_frame: FrameIndex) -> Option<RepResult> {
        let elapsed = end_frame.saturating_sub(rep.start_frame);
        if elapsed < self.min_frames {
            tracing::debug!(
                exercise = %self.exercise,
                start_frame = rep.start_frame,
                elapsed,
                min_frames = self.min_frames,
                "Discarding rep shorter than the minimum duration",
            );
            return None;
        }

        let depth = round_to(rep.depth(self.direction)?, 1);
        self.reps += 1;

        let result = RepResult {
            exercise: self.exercise.clone(),
            rep: self.reps,
            start_frame: rep.start_frame,
            end_frame,
            min_depth: depth,
            duration_sec: round_to(elapsed as f64 / self.fps, 2),
            valid_depth: self.direction.is_past(depth, self.thresholds.valid),
            form: self
                .form_checks
                .then(|| rep.tally.verdicts(self.verdict_ratio)),
        };

        tracing::debug!(
            exercise = %result.exercise,
            rep = result.rep,
            min_depth = result.min_depth,
            duration_sec = result.duration_sec,
            valid_depth = result.valid_depth,
            "Rep completed",
        );
        Some(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
