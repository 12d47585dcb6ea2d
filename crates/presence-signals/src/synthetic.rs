//! Synthetic Landmark Frames
//!
//! Deterministic frame constructors for demos and tests: a canonical face
//! whose eye opening, mouth opening, and nose offset can be dialed to
//! either side of the gate thresholds. No camera or detector involved.

use crate::landmarks::{LandmarkFrame, Point2, MOUTH_MIN_POINTS};

/// Face center in pixel coordinates before scaling.
const CENTER: Point2 = [160.0, 120.0];
/// Horizontal eye half-width.
const EYE_HALF_W: f32 = 10.0;
/// Eye center offset from the face midline.
const EYE_OFFSET_X: f32 = 30.0;
/// Mouth half-width.
const MOUTH_HALF_W: f32 = 20.0;
/// Vertical mouth position below the eye line.
const MOUTH_Y: f32 = 35.0;

fn at(local: Point2, scale: f32) -> Point2 {
    [
        (CENTER[0] + local[0]) * scale,
        (CENTER[1] + local[1]) * scale,
    ]
}

/// Six-point eye contour centered at `cx` with the given aspect ratio.
///
/// p0/p3 are the horizontal corners; p1,p2 upper lid; p4,p5 lower lid.
/// The lid spacing is chosen so the measured EAR equals `ear` exactly.
fn eye(cx: f32, ear: f32, scale: f32) -> [Point2; 6] {
    let half_v = ear * EYE_HALF_W;
    [
        at([cx - EYE_HALF_W, 0.0], scale),
        at([cx - EYE_HALF_W / 2.0, -half_v], scale),
        at([cx + EYE_HALF_W / 2.0, -half_v], scale),
        at([cx + EYE_HALF_W, 0.0], scale),
        at([cx + EYE_HALF_W / 2.0, half_v], scale),
        at([cx - EYE_HALF_W / 2.0, half_v], scale),
    ]
}

/// Twenty-point mouth loop with the given opening distance between the
/// inner lip points (indices 13 and 19).
fn mouth(opening: f32, scale: f32) -> Vec<Point2> {
    let mut points = vec![at([0.0, MOUTH_Y], scale); MOUTH_MIN_POINTS];
    // Outer loop corners and mid-lip points.
    points[0] = at([-MOUTH_HALF_W, MOUTH_Y], scale);
    points[3] = at([0.0, MOUTH_Y - opening / 2.0 - 2.0], scale);
    points[6] = at([MOUTH_HALF_W, MOUTH_Y], scale);
    points[9] = at([0.0, MOUTH_Y + opening / 2.0 + 2.0], scale);
    // Inner lip points driving the mouth gate.
    points[13] = at([0.0, MOUTH_Y - opening / 2.0], scale);
    points[19] = at([0.0, MOUTH_Y + opening / 2.0], scale);
    points
}

/// Four-point nose strip with the tip (index 3) shifted by `tip_dx`.
fn nose(tip_dx: f32, scale: f32) -> Vec<Point2> {
    vec![
        at([0.0, 5.0], scale),
        at([0.0, 10.0], scale),
        at([0.0, 15.0], scale),
        at([tip_dx, 20.0], scale),
    ]
}

/// Frame with a chosen average eye-aspect ratio and everything else neutral.
pub fn frame_with_ear(ear: f32, scale: f32) -> LandmarkFrame {
    LandmarkFrame {
        left_eye: eye(-EYE_OFFSET_X, ear, scale),
        right_eye: eye(EYE_OFFSET_X, ear, scale),
        mouth: mouth(4.0, scale),
        nose: nose(0.0, scale),
    }
}

/// Eyes open, mouth closed, head facing the camera.
pub fn neutral_frame(scale: f32) -> LandmarkFrame {
    frame_with_ear(0.30, scale)
}

/// Eyes closed far enough to trip the default blink threshold.
pub fn blink_frame(scale: f32) -> LandmarkFrame {
    frame_with_ear(0.15, scale)
}

/// Mouth opened past the default mouth threshold, eyes open.
pub fn mouth_open_frame(scale: f32) -> LandmarkFrame {
    LandmarkFrame {
        mouth: mouth(20.0, scale),
        ..neutral_frame(scale)
    }
}

/// Head turned past the default offset threshold.
///
/// `direction` is -1.0 for left, 1.0 for right (any nonzero value is
/// normalized to its sign).
pub fn head_turned_frame(direction: f32, scale: f32) -> LandmarkFrame {
    // Face width spans the outer eye corners: 2 * (offset + half-width).
    let face_width = 2.0 * (EYE_OFFSET_X + EYE_HALF_W);
    let tip_dx = direction.signum() * 0.45 * face_width;
    LandmarkFrame {
        nose: nose(tip_dx, scale),
        ..neutral_frame(scale)
    }
}
