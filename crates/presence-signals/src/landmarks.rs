//! Landmark Frame Model
//!
//! Point layout follows the 68-point face detector convention: each eye is
//! a 6-point contour, the mouth is a 20-point loop, the nose is a 9-point
//! bridge-plus-base strip. Only the regions needed by the liveness gates
//! are carried.

use serde::{Deserialize, Serialize};

/// A 2-D landmark point in pixel coordinates.
pub type Point2 = [f32; 2];

/// Euclidean distance between two landmark points.
#[inline]
pub fn dist(a: Point2, b: Point2) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}

/// Fixed landmark indices inside each region.
pub mod indices {
    // === Eye contour (p0..p5: corner, top, top, corner, bottom, bottom) ===
    /// Outer/leading corner of the eye contour
    pub const EYE_CORNER_A: usize = 0;
    /// Trailing corner of the eye contour
    pub const EYE_CORNER_B: usize = 3;
    /// First upper lid point
    pub const EYE_TOP_1: usize = 1;
    /// Second upper lid point
    pub const EYE_TOP_2: usize = 2;
    /// Lower lid point opposite EYE_TOP_2
    pub const EYE_BOTTOM_1: usize = 4;
    /// Lower lid point opposite EYE_TOP_1
    pub const EYE_BOTTOM_2: usize = 5;

    // === Mouth (20-point loop) ===
    /// Outer left mouth corner
    pub const MOUTH_LEFT_CORNER: usize = 0;
    /// Outer right mouth corner
    pub const MOUTH_RIGHT_CORNER: usize = 6;
    /// Inner top lip center
    pub const MOUTH_TOP_LIP: usize = 13;
    /// Inner bottom lip center
    pub const MOUTH_BOTTOM_LIP: usize = 19;

    // === Nose ===
    /// Nose tip (bottom of the bridge strip)
    pub const NOSE_TIP: usize = 3;
}

/// Minimum mouth points required by the gate indices.
pub const MOUTH_MIN_POINTS: usize = 20;
/// Minimum nose points required by the gate indices.
pub const NOSE_MIN_POINTS: usize = 4;

/// One detection cycle's facial geometry.
///
/// Produced externally once per poll tick. The detector guarantees the
/// region point counts (`MOUTH_MIN_POINTS`, `NOSE_MIN_POINTS`); frames
/// that violate them are a caller bug, not a runtime condition. A tick
/// with no face at all is represented as the absence of a frame at the
/// provider boundary, never as an empty frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Left eye 6-point contour.
    pub left_eye: [Point2; 6],
    /// Right eye 6-point contour.
    pub right_eye: [Point2; 6],
    /// Mouth loop, at least [`MOUTH_MIN_POINTS`] points.
    pub mouth: Vec<Point2>,
    /// Nose strip, at least [`NOSE_MIN_POINTS`] points.
    pub nose: Vec<Point2>,
}

impl LandmarkFrame {
    /// Whether the frame carries the point counts the gate indices assume.
    pub fn has_required_points(&self) -> bool {
        self.mouth.len() >= MOUTH_MIN_POINTS && self.nose.len() >= NOSE_MIN_POINTS
    }
}
