//! Form verdicts for a completed rep.
//!
//! Each auxiliary signal is judged on the share of sampled rep frames in
//! which it held: the verdict is `Yes` only when that share strictly
//! exceeds the configured ratio.

use serde::{Deserialize, Serialize};

use crate::angle_tracker::FormSignals;

/// Categorical pass/fail judgement on one form signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Yes,
    No,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of `total` frames that qualified. A zero-frame span has ratio 0.
pub fn qualifying_ratio(qualifying: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    qualifying as f64 / total as f64
}

/// `Yes` iff `qualifying / total > ratio`.
pub fn evaluate(qualifying: u64, total: u64, ratio: f64) -> Verdict {
    if qualifying_ratio(qualifying, total) > ratio {
        Verdict::Yes
    } else {
        Verdict::No
    }
}

/// Verdicts attached to one rep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormVerdicts {
    pub knees_over_toes: Verdict,
    pub back_straight: Verdict,
}

/// Running count of frames satisfying each form predicate within a rep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormTally {
    pub frames: u64,
    pub knee_over_toe: u64,
    pub back_straight: u64,
}

impl FormTally {
    /// Count one sampled frame. Frames whose signals could not be read
    /// still count toward the total but never as qualifying.
    pub fn record(&mut self, signals: Option<FormSignals>) {
        self.frames += 1;
        if let Some(signals) = signals {
            self.knee_over_toe += u64::from(signals.knee_over_toe);
            self.back_straight += u64::from(signals.back_straight);
        }
    }

    pub fn verdicts(&self, ratio: f64) -> FormVerdicts {
        FormVerdicts {
            knees_over_toes: evaluate(self.knee_over_toe, self.frames, ratio),
            back_straight: evaluate(self.back_straight, self.frames, ratio),
        }
    }
}
