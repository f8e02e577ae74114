//! Synthetic pose frames for unit tests.

use crate::geometry::Point2;
use crate::landmarks::{BodySide, FrameSample, PoseLandmark};
use crate::types::{Degrees, FrameIndex};

const SEGMENT: f64 = 0.2;

/// Builds a full 33-landmark frame with a chosen right-knee angle,
/// left-elbow angle, back angle, and knee/toe arrangement.
#[derive(Debug, Clone, Copy)]
pub struct PoseBuilder {
    knee_angle: Degrees,
    arm_angle: Degrees,
    back_angle: Degrees,
    knee_over_toe: bool,
}

impl PoseBuilder {
    pub fn new(knee_angle: Degrees) -> Self {
        Self {
            knee_angle,
            arm_angle: 170.0,
            back_angle: 170.0,
            knee_over_toe: false,
        }
    }

    pub fn arm_angle(mut self, angle: Degrees) -> Self {
        self.arm_angle = angle;
        self
    }

    pub fn back_angle(mut self, angle: Degrees) -> Self {
        self.back_angle = angle;
        self
    }

    pub fn knee_over_toe(mut self, ahead: bool) -> Self {
        self.knee_over_toe = ahead;
        self
    }

    pub fn frame(self, index: FrameIndex) -> FrameSample {
        let mut points = vec![Point2::new(0.5, 0.1); PoseLandmark::COUNT];
        let mut set = |landmark: PoseLandmark, p: Point2| points[landmark.index()] = p;

        // Leg: hip straight above the knee, ankle rotated by the knee angle.
        let side = BodySide::Right;
        let knee = Point2::new(0.5, 0.6);
        let hip = Point2::new(knee.x, knee.y - SEGMENT);
        let theta = self.knee_angle.to_radians();
        let ankle = Point2::new(
            knee.x + SEGMENT * theta.sin(),
            knee.y - SEGMENT * theta.cos(),
        );
        // Torso: shoulder rotated away from the thigh by the back angle.
        let phi = self.back_angle.to_radians();
        let shoulder = Point2::new(hip.x - SEGMENT * phi.sin(), hip.y + SEGMENT * phi.cos());
        let toe_offset = if self.knee_over_toe { 0.05 } else { -0.05 };
        let toe = Point2::new(knee.x + toe_offset, 0.85);

        set(side.hip(), hip);
        set(side.knee(), knee);
        set(side.ankle(), ankle);
        set(side.shoulder(), shoulder);
        set(side.toe(), toe);

        // Arm: left shoulder above the elbow, wrist rotated by the arm angle.
        let arm = BodySide::Left;
        let elbow = Point2::new(0.3, 0.5);
        let beta = self.arm_angle.to_radians();
        set(arm.shoulder(), Point2::new(elbow.x, elbow.y - SEGMENT));
        set(arm.elbow(), elbow);
        set(
            arm.wrist(),
            Point2::new(elbow.x + SEGMENT * beta.sin(), elbow.y - SEGMENT * beta.cos()),
        );

        FrameSample::detected(index, points)
    }
}

pub fn pose_with_knee_angle(index: FrameIndex, angle: Degrees) -> FrameSample {
    PoseBuilder::new(angle).frame(index)
}

/// One frame per angle, numbered from zero.
pub fn knee_angle_frames(angles: &[Degrees]) -> Vec<FrameSample> {
    angles
        .iter()
        .enumerate()
        .map(|(i, &angle)| pose_with_knee_angle(i as FrameIndex, angle))
        .collect()
}
