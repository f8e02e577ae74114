//! Pose landmark catalogue and per-frame samples.
//!
//! The upstream pose estimator reports the 33-point body landmark set in
//! normalized image coordinates. A frame either carries the full detected
//! set or nothing at all.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2;
use crate::types::FrameIndex;

// ---------------------------------------------------------------------------
// PoseLandmark
// ---------------------------------------------------------------------------

/// Indices of the 33-point pose landmark model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const COUNT: usize = 33;

    const ALL: [PoseLandmark; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// BodySide
// ---------------------------------------------------------------------------

/// Which side of the body the form checks read from.
///
/// Chosen once per session; the knee-vs-toe comparison assumes the subject
/// faces the same way for the whole stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySide {
    Left,
    #[default]
    Right,
}

impl BodySide {
    pub fn shoulder(self) -> PoseLandmark {
        match self {
            Self::Left => PoseLandmark::LeftShoulder,
            Self::Right => PoseLandmark::RightShoulder,
        }
    }

    pub fn elbow(self) -> PoseLandmark {
        match self {
            Self::Left => PoseLandmark::LeftElbow,
            Self::Right => PoseLandmark::RightElbow,
        }
    }

    pub fn wrist(self) -> PoseLandmark {
        match self {
            Self::Left => PoseLandmark::LeftWrist,
            Self::Right => PoseLandmark::RightWrist,
        }
    }

    pub fn hip(self) -> PoseLandmark {
        match self {
            Self::Left => PoseLandmark::LeftHip,
            Self::Right => PoseLandmark::RightHip,
        }
    }

    pub fn knee(self) -> PoseLandmark {
        match self {
            Self::Left => PoseLandmark::LeftKnee,
            Self::Right => PoseLandmark::RightKnee,
        }
    }

    pub fn ankle(self) -> PoseLandmark {
        match self {
            Self::Left => PoseLandmark::LeftAnkle,
            Self::Right => PoseLandmark::RightAnkle,
        }
    }

    /// Tip of the foot, used as the "toe" for knee-over-toe checks.
    pub fn toe(self) -> PoseLandmark {
        match self {
            Self::Left => PoseLandmark::LeftFootIndex,
            Self::Right => PoseLandmark::RightFootIndex,
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSample
// ---------------------------------------------------------------------------

/// One video frame's worth of pose input.
///
/// `landmarks` is `None` when the estimator found no body in the frame.
/// When present it is indexed by landmark id; a detector that reports a
/// reduced set simply yields a shorter vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    #[serde(rename = "frame")]
    pub index: FrameIndex,
    #[serde(default)]
    pub landmarks: Option<Vec<Point2>>,
}

impl FrameSample {
    pub fn detected(index: FrameIndex, landmarks: Vec<Point2>) -> Self {
        Self {
            index,
            landmarks: Some(landmarks),
        }
    }

    pub fn missing(index: FrameIndex) -> Self {
        Self {
            index,
            landmarks: None,
        }
    }

    pub fn has_detection(&self) -> bool {
        self.landmarks.is_some()
    }

    /// Seconds since the start of the stream at a fixed frame rate.
    pub fn timestamp_sec(&self, fps: f64) -> f64 {
        self.index as f64 / fps
    }

    /// Position of landmark `index`, or `None` if the frame has no detection
    /// or the detected set does not reach that index.
    pub fn landmark(&self, index: usize) -> Option<Point2> {
        self.landmarks.as_ref()?.get(index).copied()
    }

    pub fn point(&self, landmark: PoseLandmark) -> Option<Point2> {
        self.landmark(landmark.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_count() {
        assert_eq!(PoseLandmark::COUNT, 33);
        assert_eq!(PoseLandmark::RightFootIndex.index(), 32);
    }

    #[test]
    fn from_index_round_trips_known_indices() {
        assert_eq!(PoseLandmark::from_index(0), Some(PoseLandmark::Nose));
        assert_eq!(PoseLandmark::from_index(24), Some(PoseLandmark::RightHip));
        assert_eq!(PoseLandmark::from_index(26), Some(PoseLandmark::RightKnee));
        assert_eq!(PoseLandmark::from_index(28), Some(PoseLandmark::RightAnkle));
        assert_eq!(PoseLandmark::from_index(33), None);
    }

    #[test]
    fn sides_pick_matching_landmarks() {
        assert_eq!(BodySide::Left.knee(), PoseLandmark::LeftKnee);
        assert_eq!(BodySide::Right.toe(), PoseLandmark::RightFootIndex);
        assert_eq!(BodySide::default(), BodySide::Right);
    }

    #[test]
    fn timestamp_uses_frame_rate() {
        let frame = FrameSample::missing(45);
        assert!((frame.timestamp_sec(30.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn missing_frame_has_no_landmarks() {
        let frame = FrameSample::missing(3);
        assert!(!frame.has_detection());
        assert_eq!(frame.landmark(0), None);
    }

    #[test]
    fn out_of_range_landmark_is_none() {
        let frame = FrameSample::detected(0, vec![Point2::new(0.1, 0.2); 5]);
        assert_eq!(frame.landmark(4), Some(Point2::new(0.1, 0.2)));
        assert_eq!(frame.landmark(5), None);
        assert_eq!(frame.point(PoseLandmark::RightKnee), None);
    }

    #[test]
    fn deserializes_wire_shape() {
        let frame: FrameSample =
            serde_json::from_str(r#"{"frame": 7, "landmarks": [{"x": 0.5, "y": 0.25, "z": -0.1}]}"#)
                .expect("frame should decode");
        assert_eq!(frame.index, 7);
        assert_eq!(frame.landmark(0), Some(Point2::new(0.5, 0.25)));

        let empty: FrameSample =
            serde_json::from_str(r#"{"frame": 8, "landmarks": null}"#).expect("frame should decode");
        assert!(!empty.has_detection());

        let absent: FrameSample = serde_json::from_str(r#"{"frame": 9}"#).expect("frame should decode");
        assert!(!absent.has_detection());
    }
}
