//! Landmark Provider Capability
//!
//! The detector is an external capability: the session controller asks it
//! for one detection per poll tick and otherwise knows nothing about
//! cameras or models. An absent detection is a normal tick; a provider
//! error is fatal for the session and is never retried.

use async_trait::async_trait;
use thiserror::Error;

use presence_signals::LandmarkFrame;

/// Fatal provider failure: the upstream capability is unusable, as
/// opposed to "no face found this tick".
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("camera unavailable: {0}")]
    Camera(String),
    #[error("model load failed: {0}")]
    ModelLoad(String),
    #[error("detection failed: {0}")]
    Detection(String),
}

/// Asynchronous source of per-frame facial landmarks.
#[async_trait]
pub trait LandmarkProvider: Send {
    /// One-time setup (model loading, camera negotiation). Called once
    /// before polling starts; warmup progress is animated while this
    /// future is pending.
    async fn prepare(&mut self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Run one detection cycle. `Ok(None)` means no face was found this
    /// tick, a valid non-terminal result the caller simply skips. May
    /// suspend for arbitrarily long; the session never issues a second
    /// call while one is pending.
    async fn detect_once(&mut self) -> Result<Option<LandmarkFrame>, ProviderError>;
}
