//! `repsense-core` -- rep segmentation and form classification.
//!
//! Turns a per-frame stream of 2D pose landmarks into discrete exercise
//! repetitions. The pieces, leaves first:
//!
//! - [`geometry`]: joint angle from three points.
//! - [`angle_tracker`]: per-exercise angle (raw or smoothed) and form
//!   signals for each frame.
//! - [`rep_machine`]: idle/active rep segmentation with hysteresis and a
//!   minimum-duration floor, plus the up/down stage counter.
//! - [`classifier`]: picks the active exercise from angle deltas.
//! - [`form`]: ratio-based Yes/No form verdicts.
//! - [`session`]: the synchronous per-frame fold tying them together.
//!
//! Nothing here performs I/O. Frame sources and rep sinks live in the
//! caller (see `repsense-worker`).

pub mod angle_tracker;
pub mod classifier;
pub mod error;
pub mod exercise;
pub mod form;
pub mod geometry;
pub mod landmarks;
pub mod rep;
pub mod rep_machine;
pub mod session;
pub mod summary;
pub mod threshold_validation;
pub mod types;

#[cfg(test)]
mod test_support;

pub use error::CoreError;
pub use exercise::{AnalysisConfig, Direction, ExerciseConfig, FormConfig, RepThresholds};
pub use landmarks::{BodySide, FrameSample, PoseLandmark};
pub use rep::{RepRecord, RepResult};
pub use session::{analyze_frames, FrameOutcome, RepSink, SessionAnalyzer, VecSink};
pub use summary::SessionSummary;
