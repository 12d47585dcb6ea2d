//! # presence-signals
//!
//! Facial landmark geometry for liveness verification.
//!
//! This crate provides:
//! - **Landmark model**: per-frame point sets for eyes, mouth, and nose
//! - **Gate evaluation**: pure ratio checks (eye closure, mouth opening,
//!   head rotation) against tunable thresholds
//!
//! ## Example
//!
//! ```
//! use presence_signals::{FrameMetrics, GateResult, GateThresholds, synthetic};
//!
//! let frame = synthetic::blink_frame(1.0);
//! let metrics = FrameMetrics::measure(&frame);
//! let gates = GateResult::evaluate(&metrics, &GateThresholds::default());
//! assert!(gates.blink);
//! ```

pub mod gates;
pub mod landmarks;
pub mod synthetic;

pub use gates::{FrameMetrics, GateResult, GateThresholds};
pub use landmarks::{dist, LandmarkFrame, Point2};
