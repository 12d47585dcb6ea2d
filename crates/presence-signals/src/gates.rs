//! Liveness Gate Evaluation
//!
//! Pure, per-frame ratio checks. Each gate looks at the current frame only;
//! tracking which challenges are already satisfied belongs to the
//! challenge sequencer, not here.

use serde::{Deserialize, Serialize};

use crate::landmarks::{dist, indices, LandmarkFrame, Point2};

/// Guard for ratio denominators on degenerate geometry.
const MIN_SPAN: f32 = 1e-3;

/// Thresholds for the three liveness gates.
///
/// Fixed constants, not derived per-user and with no adaptive component.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GateThresholds {
    /// Average eye-aspect ratio below which a blink is detected.
    pub ear: f32,
    /// Mouth opening/width ratio above which an open mouth is detected.
    pub mouth: f32,
    /// Nose-offset/face-width ratio above which a head turn is detected.
    pub head: f32,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            ear: 0.25,
            mouth: 0.35,
            head: 0.35,
        }
    }
}

impl GateThresholds {
    /// All thresholds must sit in (0, 1].
    pub fn is_valid(&self) -> bool {
        let ok = |t: f32| t > 0.0 && t <= 1.0;
        ok(self.ear) && ok(self.mouth) && ok(self.head)
    }
}

/// Scalar ratios derived from one frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Left eye aspect ratio (~0.3 open, drops sharply during closure).
    pub ear_left: f32,
    /// Right eye aspect ratio.
    pub ear_right: f32,
    /// Average of the two eyes.
    pub ear_avg: f32,
    /// Mouth opening normalized by mouth width.
    pub mouth_ratio: f32,
    /// Horizontal nose-tip offset from the inter-eye midline, normalized
    /// by the outer-corner face width. Signed: negative = turned left.
    pub head_offset_ratio: f32,
}

impl FrameMetrics {
    /// Measure all gate ratios for a frame.
    ///
    /// The frame must carry the region point counts the detector
    /// guarantees (see [`LandmarkFrame::has_required_points`]).
    pub fn measure(frame: &LandmarkFrame) -> Self {
        let ear_left = eye_aspect_ratio(&frame.left_eye);
        let ear_right = eye_aspect_ratio(&frame.right_eye);

        let opening = dist(
            frame.mouth[indices::MOUTH_TOP_LIP],
            frame.mouth[indices::MOUTH_BOTTOM_LIP],
        );
        let width = dist(
            frame.mouth[indices::MOUTH_LEFT_CORNER],
            frame.mouth[indices::MOUTH_RIGHT_CORNER],
        );
        let mouth_ratio = opening / width.max(MIN_SPAN);

        FrameMetrics {
            ear_left,
            ear_right,
            ear_avg: (ear_left + ear_right) / 2.0,
            mouth_ratio,
            head_offset_ratio: head_offset_ratio(frame),
        }
    }
}

/// Eye aspect ratio for a 6-point contour:
/// `(|p1-p5| + |p2-p4|) / (2 * |p0-p3|)`.
///
/// Scale-invariant: vertical lid opening is normalized by horizontal eye
/// width, so the ratio is unchanged by camera distance.
pub fn eye_aspect_ratio(eye: &[Point2; 6]) -> f32 {
    let v1 = dist(eye[indices::EYE_TOP_1], eye[indices::EYE_BOTTOM_2]);
    let v2 = dist(eye[indices::EYE_TOP_2], eye[indices::EYE_BOTTOM_1]);
    let h = dist(eye[indices::EYE_CORNER_A], eye[indices::EYE_CORNER_B]);
    (v1 + v2) / (2.0 * h.max(MIN_SPAN))
}

/// Signed nose-tip offset from the inter-eye midline over face width.
///
/// Face width spans the left eye's leading corner to the right eye's
/// trailing corner. The eye corners stand in for cheek landmarks; the
/// approximation is kept as-is.
fn head_offset_ratio(frame: &LandmarkFrame) -> f32 {
    let left = frame.left_eye[indices::EYE_CORNER_A];
    let right = frame.right_eye[indices::EYE_CORNER_B];
    let face_width = dist(left, right);
    let center_x = (left[0] + right[0]) / 2.0;
    let offset = frame.nose[indices::NOSE_TIP][0] - center_x;
    offset / face_width.max(MIN_SPAN)
}

/// Outcome of the three gate checks for one frame.
///
/// The booleans are independent: a gate may fire on a frame whose
/// challenge is not currently awaited.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GateResult {
    /// Average EAR fell below the blink threshold.
    pub blink: bool,
    /// Mouth opening ratio exceeded the mouth threshold.
    pub mouth_open: bool,
    /// Absolute head offset ratio exceeded the head threshold.
    pub head_turn: bool,
}

impl GateResult {
    /// Apply thresholds to measured metrics.
    pub fn evaluate(metrics: &FrameMetrics, thresholds: &GateThresholds) -> Self {
        GateResult {
            blink: metrics.ear_avg < thresholds.ear,
            mouth_open: metrics.mouth_ratio > thresholds.mouth,
            head_turn: metrics.head_offset_ratio.abs() > thresholds.head,
        }
    }

    /// Measure and evaluate in one step.
    pub fn from_frame(frame: &LandmarkFrame, thresholds: &GateThresholds) -> Self {
        Self::evaluate(&FrameMetrics::measure(frame), thresholds)
    }
}
