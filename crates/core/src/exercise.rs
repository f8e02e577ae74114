//! Exercise definitions, rep thresholds, and analysis configuration.
//!
//! Everything here is static configuration: built once before a session
//! starts, validated up front, then shared read-only by the trackers and
//! state machines.

use serde::{Deserialize, Serialize};

use crate::angle_tracker::AngleSmoothing;
use crate::error::CoreError;
use crate::landmarks::{BodySide, PoseLandmark};
use crate::threshold_validation::{validate_degrees, validate_positive, validate_unit_range};
use crate::types::Degrees;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const BICEP_CURL: &str = "Bicep Curl";
pub const SQUAT: &str = "Squat";
pub const PUSH_UP: &str = "Push-Up";

/// Built-in exercises in classifier priority order.
pub const PRESET_NAMES: &[&str] = &[BICEP_CURL, SQUAT, PUSH_UP];

/// Angle a rep must pass to start being tracked.
pub const DEFAULT_DEPTH_THRESHOLD: Degrees = 100.0;
/// Angle that ends a tracked rep; on the start-pose side of the depth
/// threshold.
pub const DEFAULT_RECOVERY_THRESHOLD: Degrees = 110.0;
/// Depth a rep must reach to count as valid.
pub const DEFAULT_VALID_DEPTH_THRESHOLD: Degrees = 90.0;
pub const DEFAULT_MIN_FRAMES_PER_REP: u64 = 1;
/// Per-frame angle change (degrees) that counts as evidence of an exercise.
pub const DEFAULT_ANGLE_CHANGE_THRESHOLD: Degrees = 10.0;
/// Shoulder-hip-knee angle above which the back counts as straight.
pub const DEFAULT_BACK_STRAIGHT_THRESHOLD: Degrees = 160.0;
/// Fraction of rep frames a form predicate must exceed to pass.
pub const DEFAULT_VERDICT_RATIO: f64 = 0.6;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which way the tracked angle moves during the working phase of a rep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Flexion: the angle closes from an extended start pose. Depth is the
    /// minimum angle reached.
    UpDown,
    /// Extension: the mirrored policy. Depth is the maximum angle reached.
    DownUp,
}

impl Direction {
    /// `true` if `angle` lies past `threshold` on the working side of the
    /// movement (below it for flexion, above it for extension).
    pub fn is_past(self, angle: Degrees, threshold: Degrees) -> bool {
        match self {
            Self::UpDown => angle < threshold,
            Self::DownUp => angle > threshold,
        }
    }

    /// `true` if `angle` has come back past `threshold` toward the start pose.
    pub fn is_recovered(self, angle: Degrees, threshold: Degrees) -> bool {
        match self {
            Self::UpDown => angle > threshold,
            Self::DownUp => angle < threshold,
        }
    }

    /// The deeper of two angles for this direction.
    pub fn deeper(self, a: Degrees, b: Degrees) -> Degrees {
        match self {
            Self::UpDown => a.min(b),
            Self::DownUp => a.max(b),
        }
    }
}

// ---------------------------------------------------------------------------
// RepThresholds
// ---------------------------------------------------------------------------

/// The enter / recover / valid threshold triple driving rep segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepThresholds {
    /// Crossing this starts a rep.
    #[serde(rename = "depth_threshold")]
    pub enter: Degrees,
    /// Crossing back over this ends a rep.
    #[serde(rename = "recovery_threshold")]
    pub recover: Degrees,
    /// Depth needed for the rep to be marked valid.
    #[serde(rename = "valid_depth_threshold")]
    pub valid: Degrees,
}

impl Default for RepThresholds {
    fn default() -> Self {
        Self {
            enter: DEFAULT_DEPTH_THRESHOLD,
            recover: DEFAULT_RECOVERY_THRESHOLD,
            valid: DEFAULT_VALID_DEPTH_THRESHOLD,
        }
    }
}

impl RepThresholds {
    pub fn new(enter: Degrees, recover: Degrees, valid: Degrees) -> Self {
        Self {
            enter,
            recover,
            valid,
        }
    }

    /// Whether the recover threshold sits strictly on the start-pose side of
    /// the enter threshold, leaving a band where neither transition fires.
    pub fn has_dead_band(&self, direction: Direction) -> bool {
        direction.is_recovered(self.recover, self.enter)
    }

    /// Validate ranges, and that the valid threshold is at least as deep as
    /// the enter threshold for the given direction.
    pub fn validate(&self, direction: Direction) -> Result<(), CoreError> {
        validate_degrees(self.enter, "depth_threshold")?;
        validate_degrees(self.recover, "recovery_threshold")?;
        validate_degrees(self.valid, "valid_depth_threshold")?;
        if direction.is_past(self.enter, self.valid) {
            return Err(CoreError::Validation(format!(
                "valid_depth_threshold ({}) must not be shallower than depth_threshold ({})",
                self.valid, self.enter
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ExerciseConfig
// ---------------------------------------------------------------------------

/// Static definition of one trackable exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseConfig {
    pub name: String,
    /// Landmark indices `[a, vertex, c]` defining the tracked joint angle.
    pub angle_points: [usize; 3],
    /// Stage-counter threshold marking the start pose.
    pub up_threshold: Degrees,
    /// Stage-counter threshold marking the working pose.
    pub down_threshold: Degrees,
    pub direction: Direction,
    /// Collect knee-over-toe and back-straight signals during reps.
    #[serde(default)]
    pub form_checks: bool,
    /// Overrides the session-wide rep thresholds for this exercise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<RepThresholds>,
}

impl ExerciseConfig {
    pub fn new(
        name: impl Into<String>,
        angle_points: [PoseLandmark; 3],
        up_threshold: Degrees,
        down_threshold: Degrees,
        direction: Direction,
    ) -> Self {
        Self {
            name: name.into(),
            angle_points: angle_points.map(PoseLandmark::index),
            up_threshold,
            down_threshold,
            direction,
            form_checks: false,
            thresholds: None,
        }
    }

    pub fn with_form_checks(mut self) -> Self {
        self.form_checks = true;
        self
    }

    pub fn with_thresholds(mut self, thresholds: RepThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn bicep_curl() -> Self {
        let side = BodySide::Left;
        Self::new(
            BICEP_CURL,
            [side.shoulder(), side.elbow(), side.wrist()],
            160.0,
            30.0,
            Direction::UpDown,
        )
    }

    pub fn squat() -> Self {
        let side = BodySide::Right;
        Self::new(
            SQUAT,
            [side.hip(), side.knee(), side.ankle()],
            160.0,
            70.0,
            Direction::UpDown,
        )
        .with_form_checks()
    }

    pub fn push_up() -> Self {
        let side = BodySide::Left;
        Self::new(
            PUSH_UP,
            [side.shoulder(), side.elbow(), side.wrist()],
            160.0,
            90.0,
            Direction::DownUp,
        )
        .with_thresholds(RepThresholds::new(140.0, 110.0, 160.0))
    }

    /// Look up a built-in exercise by name (case-insensitive).
    pub fn preset(name: &str) -> Result<Self, CoreError> {
        let wanted = name.trim();
        if wanted.eq_ignore_ascii_case(BICEP_CURL) {
            Ok(Self::bicep_curl())
        } else if wanted.eq_ignore_ascii_case(SQUAT) {
            Ok(Self::squat())
        } else if wanted.eq_ignore_ascii_case(PUSH_UP) {
            Ok(Self::push_up())
        } else {
            Err(CoreError::UnknownExercise(format!(
                "'{wanted}'. Known exercises: {}",
                PRESET_NAMES.join(", ")
            )))
        }
    }

    /// Effective rep thresholds: the per-exercise override or the fallback.
    pub fn rep_thresholds(&self, fallback: &RepThresholds) -> RepThresholds {
        self.thresholds.unwrap_or(*fallback)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "exercise name must not be empty".to_string(),
            ));
        }
        let [a, vertex, c] = self.angle_points;
        if vertex == a || vertex == c {
            return Err(CoreError::Validation(format!(
                "{}: angle vertex must differ from both end points, got {:?}",
                self.name, self.angle_points
            )));
        }
        validate_degrees(self.up_threshold, "up_threshold")?;
        validate_degrees(self.down_threshold, "down_threshold")?;
        if let Some(thresholds) = &self.thresholds {
            thresholds.validate(self.direction)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FormConfig
// ---------------------------------------------------------------------------

/// Settings for the auxiliary form signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub side: BodySide,
    pub back_straight_threshold: Degrees,
    pub verdict_ratio: f64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            side: BodySide::default(),
            back_straight_threshold: DEFAULT_BACK_STRAIGHT_THRESHOLD,
            verdict_ratio: DEFAULT_VERDICT_RATIO,
        }
    }
}

impl FormConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_degrees(self.back_straight_threshold, "back_straight_threshold")?;
        validate_unit_range(self.verdict_ratio, "verdict_ratio")
    }
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Session-wide configuration: global thresholds plus the candidate
/// exercises in classifier priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    #[serde(flatten)]
    pub thresholds: RepThresholds,
    pub min_frames_per_rep: u64,
    pub angle_change_threshold: Degrees,
    pub form: FormConfig,
    pub smoothing: AngleSmoothing,
    pub exercises: Vec<ExerciseConfig>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: RepThresholds::default(),
            min_frames_per_rep: DEFAULT_MIN_FRAMES_PER_REP,
            angle_change_threshold: DEFAULT_ANGLE_CHANGE_THRESHOLD,
            form: FormConfig::default(),
            smoothing: AngleSmoothing::default(),
            exercises: vec![
                ExerciseConfig::bicep_curl(),
                ExerciseConfig::squat(),
                ExerciseConfig::push_up(),
            ],
        }
    }
}

impl AnalysisConfig {
    /// Configuration tracking a single exercise, with no classification.
    pub fn single(exercise: ExerciseConfig) -> Self {
        Self {
            exercises: vec![exercise],
            ..Self::default()
        }
    }

    pub fn with_thresholds(mut self, thresholds: RepThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_min_frames_per_rep(mut self, frames: u64) -> Self {
        self.min_frames_per_rep = frames;
        self
    }

    pub fn exercise(&self, name: &str) -> Result<&ExerciseConfig, CoreError> {
        self.exercises
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| CoreError::UnknownExercise(name.to_string()))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.exercises.is_empty() {
            return Err(CoreError::Validation(
                "at least one exercise must be configured".to_string(),
            ));
        }
        for (i, exercise) in self.exercises.iter().enumerate() {
            exercise.validate()?;
            exercise
                .rep_thresholds(&self.thresholds)
                .validate(exercise.direction)?;
            if self.exercises[..i].iter().any(|e| e.name == exercise.name) {
                return Err(CoreError::Validation(format!(
                    "duplicate exercise name: '{}'",
                    exercise.name
                )));
            }
        }
        validate_positive(self.angle_change_threshold, "angle_change_threshold")?;
        self.form.validate()?;
        self.smoothing.validate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
