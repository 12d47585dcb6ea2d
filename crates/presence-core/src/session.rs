//! Session Controller
//!
//! Owns one verification attempt end to end: provider warmup with progress
//! animation, the detection polling loop, the overall deadline, and the
//! terminal verdict. All timers are fields of the session task, never
//! ambient state, so concurrent attempts cannot interfere and stopping one
//! session clears exactly that session's timers.
//!
//! Scheduling is single-writer cooperative polling: the session task is
//! the only mutator of the challenge state, and a tick's gate evaluation
//! is fully applied and reported before the next tick can begin. A pending
//! detection stalls the next poll instead of overlapping it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use presence_signals::{FrameMetrics, GateResult};

use crate::challenge::{ChallengeEvent, ChallengeSequencer, PASSED_PROMPT};
use crate::config::SessionConfig;
use crate::feedback::FeedbackSink;
use crate::provider::{LandmarkProvider, ProviderError};

const TIMEOUT_STATUS: &str = "Liveness check failed (timeout). Please try again.";
const TIMEOUT_PROMPT: &str = "Liveness check failed due to timeout. Please try again.";
const CANCELLED_STATUS: &str = "Liveness check cancelled.";
const PROVIDER_FAILED_STATUS: &str = "Liveness check failed (detector unavailable). Please try again.";

/// Terminal outcome of one verification session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// All three challenges satisfied in order.
    Passed,
    /// The overall deadline elapsed first.
    TimedOut,
    /// The landmark provider failed; never retried.
    ProviderFailed,
    /// Stopped by the caller before any other terminal outcome.
    Cancelled,
}

impl SessionOutcome {
    /// Boolean verdict delivered to the completion callback.
    pub fn verdict(&self) -> bool {
        matches!(self, SessionOutcome::Passed)
    }
}

/// Handle to a running verification session.
///
/// Callers must invoke [`stop`](Self::stop) on teardown even if no verdict
/// has been produced yet, so the polling loop is not leaked and the caller
/// can release its camera resources.
pub struct SessionHandle {
    cancel: Arc<Notify>,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    /// Request cancellation. Idempotent: calling it again, or after the
    /// session already reached a terminal outcome, is a no-op and never
    /// produces a second verdict.
    pub fn stop(&self) {
        self.cancel.notify_one();
    }

    /// Whether the session task has reached its terminal outcome.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Await the terminal outcome. A session whose task was torn down by
    /// the runtime reports `Cancelled`.
    pub async fn outcome(self) -> SessionOutcome {
        self.task.await.unwrap_or(SessionOutcome::Cancelled)
    }
}

/// One liveness verification attempt.
pub struct LivenessSession;

impl LivenessSession {
    /// Start a session on the current tokio runtime.
    ///
    /// `on_complete` is invoked exactly once with the boolean verdict:
    /// `true` only for a passed session, `false` for timeout, provider
    /// failure, or cancellation.
    pub fn spawn<P, S, F>(
        provider: P,
        sink: S,
        on_complete: F,
        config: SessionConfig,
    ) -> SessionHandle
    where
        P: LandmarkProvider + 'static,
        S: FeedbackSink + 'static,
        F: FnOnce(bool) + Send + 'static,
    {
        let cancel = Arc::new(Notify::new());
        let cancel_task = Arc::clone(&cancel);
        let task = tokio::spawn(async move {
            let outcome = run_session(provider, sink, config, cancel_task).await;
            info!(?outcome, verdict = outcome.verdict(), "liveness session terminal");
            on_complete(outcome.verdict());
            outcome
        });
        SessionHandle { cancel, task }
    }
}

enum WarmupEnd {
    Ready,
    Cancelled,
    Failed(ProviderError),
}

/// Run provider setup while animating the 0..=90 progress counter, then
/// force 100 on completion.
async fn warmup<P, S>(
    provider: &mut P,
    sink: &mut S,
    config: &SessionConfig,
    cancel: &Notify,
) -> WarmupEnd
where
    P: LandmarkProvider,
    S: FeedbackSink,
{
    sink.on_progress(0);

    let tick = Duration::from_millis(config.warmup_tick_ms);
    let mut ticker = interval_at(Instant::now() + tick, tick);
    let prepare = provider.prepare();
    tokio::pin!(prepare);

    let mut progress: u8 = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancel.notified() => return WarmupEnd::Cancelled,
            result = &mut prepare => {
                return match result {
                    Ok(()) => {
                        sink.on_progress(100);
                        debug!("provider warmup complete");
                        WarmupEnd::Ready
                    }
                    Err(err) => WarmupEnd::Failed(err),
                };
            }
            _ = ticker.tick() => {
                progress = progress
                    .saturating_add(config.warmup_step_percent)
                    .min(90);
                sink.on_progress(progress);
            }
        }
    }
}

async fn run_session<P, S>(
    mut provider: P,
    mut sink: S,
    config: SessionConfig,
    cancel: Arc<Notify>,
) -> SessionOutcome
where
    P: LandmarkProvider,
    S: FeedbackSink,
{
    match warmup(&mut provider, &mut sink, &config, &cancel).await {
        WarmupEnd::Ready => {}
        WarmupEnd::Cancelled => {
            sink.on_status(CANCELLED_STATUS);
            return SessionOutcome::Cancelled;
        }
        WarmupEnd::Failed(err) => {
            warn!(error = %err, "landmark provider failed during warmup");
            sink.on_status(PROVIDER_FAILED_STATUS);
            return SessionOutcome::ProviderFailed;
        }
    }

    // The first challenge is entered immediately; no tick is spent idle.
    let mut sequencer = ChallengeSequencer::new();
    sink.on_prompt(sequencer.begin());

    // The deadline is armed once polling starts, after warmup.
    let deadline = sleep(Duration::from_millis(config.overall_timeout_ms));
    tokio::pin!(deadline);

    let poll_period = Duration::from_millis(config.poll_interval_ms);
    let mut poll = interval_at(Instant::now() + poll_period, poll_period);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Wait for the next poll slot. The deadline and cancellation take
        // priority over a ready tick, so whichever terminal trigger fires
        // first also silences the polling timer.
        tokio::select! {
            biased;
            _ = &mut deadline => {
                info!("session deadline elapsed");
                sink.on_status(TIMEOUT_STATUS);
                sink.on_prompt(TIMEOUT_PROMPT);
                return SessionOutcome::TimedOut;
            }
            _ = cancel.notified() => {
                debug!("session cancelled while polling");
                sink.on_status(CANCELLED_STATUS);
                return SessionOutcome::Cancelled;
            }
            _ = poll.tick() => {}
        }

        // One detection per tick, still racing the terminal triggers. A
        // slow detection stalls the poll timer rather than overlapping it.
        let detection = tokio::select! {
            biased;
            _ = &mut deadline => {
                info!("session deadline elapsed during detection");
                sink.on_status(TIMEOUT_STATUS);
                sink.on_prompt(TIMEOUT_PROMPT);
                return SessionOutcome::TimedOut;
            }
            _ = cancel.notified() => {
                debug!("session cancelled during detection");
                sink.on_status(CANCELLED_STATUS);
                return SessionOutcome::Cancelled;
            }
            result = provider.detect_once() => result,
        };

        let frame = match detection {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                trace!("no face detected this tick");
                continue;
            }
            Err(err) => {
                warn!(error = %err, "landmark provider failed");
                sink.on_status(PROVIDER_FAILED_STATUS);
                return SessionOutcome::ProviderFailed;
            }
        };

        let metrics = FrameMetrics::measure(&frame);
        let gates = GateResult::evaluate(&metrics, &config.thresholds);
        trace!(
            ear = metrics.ear_avg,
            mouth = metrics.mouth_ratio,
            head = metrics.head_offset_ratio,
            "frame metrics"
        );

        match sequencer.observe(gates) {
            Some(ChallengeEvent::Advanced { satisfied, next }) => {
                info!(?satisfied, ?next, "challenge satisfied");
                sink.on_status(satisfied.satisfied_status());
                sink.on_prompt(next.instruction());
            }
            Some(ChallengeEvent::Completed { satisfied }) => {
                info!(?satisfied, "final challenge satisfied");
                sink.on_status(satisfied.satisfied_status());
                sink.on_prompt(PASSED_PROMPT);
                break;
            }
            None => {}
        }
    }

    // Passed. Leaving the loop abandons the deadline before anything else.
    // The grace wait lets the user see the success state; cancellation may
    // shorten the wait but the verdict is already decided.
    let grace = sleep(Duration::from_millis(config.success_grace_ms));
    tokio::select! {
        _ = grace => {}
        _ = cancel.notified() => {
            debug!("stop during success grace; verdict unchanged");
        }
    }
    SessionOutcome::Passed
}
