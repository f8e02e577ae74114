//! Per-exercise joint-angle tracking.
//!
//! A [`JointAngleTracker`] turns each [`FrameSample`] into an optional
//! [`JointObservation`]: the (optionally smoothed) joint angle plus, for
//! exercises with form checks, the auxiliary knee-over-toe and
//! back-straight signals. Missing detections and landmark indices outside
//! the detected set yield `None`, never a defaulted angle.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::exercise::{AnalysisConfig, ExerciseConfig, FormConfig};
use crate::geometry::angle_at_vertex;
use crate::landmarks::{BodySide, FrameSample};
use crate::threshold_validation::validate_unit_range;
use crate::types::Degrees;

// ---------------------------------------------------------------------------
// AngleSmoothing
// ---------------------------------------------------------------------------

/// How raw per-frame angles are filtered before reaching the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AngleSmoothing {
    #[default]
    Raw,
    /// Exponential moving average: `alpha * value + (1 - alpha) * previous`.
    Ema { alpha: f64 },
}

impl AngleSmoothing {
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Raw => Ok(()),
            Self::Ema { alpha } => {
                validate_unit_range(*alpha, "smoothing.alpha")?;
                if *alpha == 0.0 {
                    return Err(CoreError::Validation(
                        "smoothing.alpha must be > 0".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Low-pass filter state for one angle signal.
#[derive(Debug, Clone, Default)]
struct LowPassFilter {
    prev: Option<f64>,
}

impl LowPassFilter {
    fn filter(&mut self, value: f64, alpha: f64) -> f64 {
        let result = match self.prev {
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        self.prev = Some(result);
        result
    }
}

// ---------------------------------------------------------------------------
// Form signals
// ---------------------------------------------------------------------------

/// Auxiliary per-frame booleans for squat-style form checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormSignals {
    /// Knee x-coordinate is less than toe x-coordinate.
    pub knee_over_toe: bool,
    /// Shoulder-hip-knee angle exceeds the straightness threshold.
    pub back_straight: bool,
}

#[derive(Debug, Clone, Copy)]
struct FormProbe {
    side: BodySide,
    back_straight_threshold: Degrees,
}

impl FormProbe {
    fn signals(&self, frame: &FrameSample) -> Option<FormSignals> {
        let shoulder = frame.point(self.side.shoulder())?;
        let hip = frame.point(self.side.hip())?;
        let knee = frame.point(self.side.knee())?;
        let toe = frame.point(self.side.toe())?;

        Some(FormSignals {
            knee_over_toe: knee.x < toe.x,
            back_straight: angle_at_vertex(shoulder, hip, knee) > self.back_straight_threshold,
        })
    }
}

// ---------------------------------------------------------------------------
// JointAngleTracker
// ---------------------------------------------------------------------------

/// What the tracker saw in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointObservation {
    pub angle: Degrees,
    /// `None` when form checks are off for this exercise, or the landmarks
    /// they need were not detected.
    pub form: Option<FormSignals>,
}

impl JointObservation {
    pub fn angle(angle: Degrees) -> Self {
        Self { angle, form: None }
    }

    pub fn with_form(mut self, form: FormSignals) -> Self {
        self.form = Some(form);
        self
    }
}

#[derive(Debug, Clone)]
pub struct JointAngleTracker {
    angle_points: [usize; 3],
    smoothing: AngleSmoothing,
    filter: LowPassFilter,
    form: Option<FormProbe>,
}

impl JointAngleTracker {
    pub fn new(angle_points: [usize; 3], smoothing: AngleSmoothing) -> Self {
        Self {
            angle_points,
            smoothing,
            filter: LowPassFilter::default(),
            form: None,
        }
    }

    pub fn with_form(mut self, form: &FormConfig) -> Self {
        self.form = Some(FormProbe {
            side: form.side,
            back_straight_threshold: form.back_straight_threshold,
        });
        self
    }

    pub fn from_config(exercise: &ExerciseConfig, analysis: &AnalysisConfig) -> Self {
        let tracker = Self::new(exercise.angle_points, analysis.smoothing);
        if exercise.form_checks {
            tracker.with_form(&analysis.form)
        } else {
            tracker
        }
    }

    /// Unfiltered joint angle, or `None` if any of the three landmarks is
    /// unavailable in this frame.
    pub fn raw_angle(&self, frame: &FrameSample) -> Option<Degrees> {
        let [a, b, c] = self.angle_points;
        Some(angle_at_vertex(
            frame.landmark(a)?,
            frame.landmark(b)?,
            frame.landmark(c)?,
        ))
    }

    /// Observe one frame, advancing the smoothing filter when an angle is
    /// available. Frames without one leave the filter untouched.
    pub fn observe(&mut self, frame: &FrameSample) -> Option<JointObservation> {
        let raw = self.raw_angle(frame)?;
        let angle = match self.smoothing {
            AngleSmoothing::Raw => raw,
            AngleSmoothing::Ema { alpha } => self.filter.filter(raw, alpha),
        };
        Some(JointObservation {
            angle,
            form: self.form.and_then(|probe| probe.signals(frame)),
        })
    }
}
