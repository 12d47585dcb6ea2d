//! Feedback Sink
//!
//! Narrow observer interface for user-facing progress, status text, and
//! prompts. The session calls these synchronously at well-defined points;
//! concrete rendering or speech lives outside this crate, which keeps the
//! core headless and lets tests assert on the exact call sequence.

/// Receiver for session feedback.
pub trait FeedbackSink: Send {
    /// Setup/warmup progress, 0..=100.
    fn on_progress(&mut self, percent: u8);

    /// Human-readable status line for the current session state.
    fn on_status(&mut self, text: &str);

    /// Prompt to relay to the user (e.g. spoken instruction).
    fn on_prompt(&mut self, message: &str);
}

/// Sink that discards all feedback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn on_progress(&mut self, _percent: u8) {}
    fn on_status(&mut self, _text: &str) {}
    fn on_prompt(&mut self, _message: &str) {}
}
