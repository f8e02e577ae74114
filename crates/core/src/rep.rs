//! Emitted rep results and the flat record handed to persistence.

use serde::{Deserialize, Serialize};

use crate::form::{FormVerdicts, Verdict};
use crate::types::{Degrees, FrameIndex};

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// One finalized repetition.
///
/// `min_depth` is the deepest angle reached: the minimum for flexion
/// exercises and the maximum for extension ones. It is rounded to one
/// decimal place and `duration_sec` to two before emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepResult {
    pub exercise: String,
    /// 1-based ordinal within this exercise's session.
    pub rep: u32,
    pub start_frame: FrameIndex,
    /// Frame at which the angle recovered.
    pub end_frame: FrameIndex,
    pub min_depth: Degrees,
    pub duration_sec: f64,
    pub valid_depth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<FormVerdicts>,
}

impl RepResult {
    pub fn elapsed_frames(&self) -> u64 {
        self.end_frame - self.start_frame
    }

    pub fn to_record(&self) -> RepRecord {
        RepRecord::from(self)
    }
}

/// Flat per-rep record consumed by the downstream sink.
///
/// Exercises without form checks carry no verdicts; those fields are
/// omitted rather than reported as failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepRecord {
    pub rep: u32,
    pub min_depth: Degrees,
    pub duration_sec: f64,
    pub valid_depth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knees_over_toes: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_straight: Option<Verdict>,
}

impl From<&RepResult> for RepRecord {
    fn from(rep: &RepResult) -> Self {
        Self {
            rep: rep.rep,
            min_depth: rep.min_depth,
            duration_sec: rep.duration_sec,
            valid_depth: rep.valid_depth,
            knees_over_toes: rep.form.map(|f| f.knees_over_toes),
            back_straight: rep.form.map(|f| f.back_straight),
        }
    }
}
