//! # presence-core
//!
//! Liveness verification session core.
//!
//! Proves, from a stream of per-frame facial landmarks, that a live human
//! is present: the user must blink, open their mouth, and turn their head,
//! in that order, before an overall deadline. The camera, the detector
//! model, and all rendering live behind narrow capability interfaces
//! ([`LandmarkProvider`], [`FeedbackSink`]).
//!
//! ## Example
//!
//! ```ignore
//! use presence_core::{LivenessSession, SessionConfig, NullSink};
//!
//! let handle = LivenessSession::spawn(
//!     my_provider,
//!     NullSink,
//!     |verdict| println!("liveness verdict: {verdict}"),
//!     SessionConfig::default(),
//! );
//! // ... on teardown:
//! handle.stop();
//! ```

pub mod challenge;
pub mod config;
pub mod feedback;
pub mod provider;
pub mod session;

pub use challenge::{
    ChallengeEvent, ChallengeKind, ChallengePhase, ChallengeSequencer, PASSED_PROMPT,
};
pub use config::{ConfigError, SessionConfig};
pub use feedback::{FeedbackSink, NullSink};
pub use provider::{LandmarkProvider, ProviderError};
pub use session::{LivenessSession, SessionHandle, SessionOutcome};
