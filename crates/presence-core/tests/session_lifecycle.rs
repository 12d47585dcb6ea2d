//! Session lifecycle tests on paused tokio time: terminal outcomes,
//! exactly-once verdict delivery, idempotent stop, and tick scheduling.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::{sleep, Duration, Instant};

use presence_core::{
    FeedbackSink, LandmarkProvider, LivenessSession, ProviderError, SessionConfig, SessionOutcome,
};
use presence_signals::{synthetic, LandmarkFrame};

// --- Test doubles ---------------------------------------------------------

#[derive(Default)]
struct Record {
    progress: Vec<u8>,
    statuses: Vec<String>,
    prompts: Vec<String>,
    verdicts: Vec<bool>,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Record>>);

impl Recorder {
    fn snapshot(&self) -> Record {
        let rec = self.0.lock().unwrap();
        Record {
            progress: rec.progress.clone(),
            statuses: rec.statuses.clone(),
            prompts: rec.prompts.clone(),
            verdicts: rec.verdicts.clone(),
        }
    }

    fn callback(&self) -> impl FnOnce(bool) + Send + 'static {
        let inner = Arc::clone(&self.0);
        move |verdict| inner.lock().unwrap().verdicts.push(verdict)
    }
}

impl FeedbackSink for Recorder {
    fn on_progress(&mut self, percent: u8) {
        self.0.lock().unwrap().progress.push(percent);
    }
    fn on_status(&mut self, text: &str) {
        self.0.lock().unwrap().statuses.push(text.to_string());
    }
    fn on_prompt(&mut self, message: &str) {
        self.0.lock().unwrap().prompts.push(message.to_string());
    }
}

/// Provider that replays a fixed detection script, then reports "no face"
/// forever. Detection calls are counted across the session lifetime.
struct ScriptedProvider {
    script: VecDeque<Result<Option<LandmarkFrame>, ProviderError>>,
    calls: Arc<AtomicUsize>,
    prepare_delay: Duration,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<Option<LandmarkFrame>, ProviderError>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                script: script.into(),
                calls: Arc::clone(&calls),
                prepare_delay: Duration::ZERO,
            },
            calls,
        )
    }

    fn with_prepare_delay(mut self, delay: Duration) -> Self {
        self.prepare_delay = delay;
        self
    }
}

#[async_trait]
impl LandmarkProvider for ScriptedProvider {
    async fn prepare(&mut self) -> Result<(), ProviderError> {
        if !self.prepare_delay.is_zero() {
            sleep(self.prepare_delay).await;
        }
        Ok(())
    }

    async fn detect_once(&mut self) -> Result<Option<LandmarkFrame>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

/// Provider whose detection never resolves.
struct HangingProvider;

#[async_trait]
impl LandmarkProvider for HangingProvider {
    async fn detect_once(&mut self) -> Result<Option<LandmarkFrame>, ProviderError> {
        std::future::pending().await
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig {
        poll_interval_ms: 500,
        overall_timeout_ms: 60_000,
        success_grace_ms: 3_000,
        ..Default::default()
    }
}

fn frame(f: LandmarkFrame) -> Result<Option<LandmarkFrame>, ProviderError> {
    Ok(Some(f))
}

fn absent() -> Result<Option<LandmarkFrame>, ProviderError> {
    Ok(None)
}

// --- Terminal outcomes ----------------------------------------------------

#[tokio::test(start_paused = true)]
async fn absent_provider_times_out_at_deadline() {
    let (provider, calls) = ScriptedProvider::new(vec![]);
    let recorder = Recorder::default();
    let config = SessionConfig {
        overall_timeout_ms: 1_000,
        ..fast_config()
    };

    let start = Instant::now();
    let handle = LivenessSession::spawn(provider, recorder.clone(), recorder.callback(), config);
    let outcome = handle.outcome().await;

    assert_eq!(outcome, SessionOutcome::TimedOut);
    assert_eq!(start.elapsed(), Duration::from_millis(1_000));

    let rec = recorder.snapshot();
    assert_eq!(rec.verdicts, vec![false]);
    assert!(rec
        .statuses
        .iter()
        .any(|s| s.contains("timeout")), "statuses: {:?}", rec.statuses);

    // No further ticks after the terminal outcome.
    let calls_at_terminal = calls.load(Ordering::SeqCst);
    sleep(Duration::from_millis(5_000)).await;
    assert_eq!(calls.load(Ordering::SeqCst), calls_at_terminal);
}

#[tokio::test(start_paused = true)]
async fn scripted_challenges_pass_on_third_tick() {
    let (provider, _) = ScriptedProvider::new(vec![
        frame(synthetic::blink_frame(1.0)),
        frame(synthetic::mouth_open_frame(1.0)),
        frame(synthetic::head_turned_frame(1.0, 1.0)),
    ]);
    let recorder = Recorder::default();

    let start = Instant::now();
    let handle = LivenessSession::spawn(
        provider,
        recorder.clone(),
        recorder.callback(),
        fast_config(),
    );
    let outcome = handle.outcome().await;

    assert_eq!(outcome, SessionOutcome::Passed);
    // Passed on the third 500ms tick, callback after the 3s grace period,
    // even though the 60s deadline is still pending.
    assert_eq!(start.elapsed(), Duration::from_millis(1_500 + 3_000));

    let rec = recorder.snapshot();
    assert_eq!(rec.verdicts, vec![true]);
    assert_eq!(
        rec.statuses,
        vec![
            "Blink detected, now open your mouth...",
            "Mouth open detected, now turn your head...",
            "Liveness check passed!",
        ]
    );
    assert_eq!(
        rec.prompts,
        vec![
            "Please blink your eyes to start the liveness check.",
            "Good job! Now please open your mouth.",
            "Nice! Now please turn your head left or right.",
            "Excellent. Liveness check complete.",
        ]
    );
    assert_eq!(rec.progress, vec![0, 100]);

    // Exactly one verdict, even well past the session deadline.
    sleep(Duration::from_millis(120_000)).await;
    assert_eq!(recorder.snapshot().verdicts, vec![true]);
}

#[tokio::test(start_paused = true)]
async fn provider_failure_is_terminal_and_not_retried() {
    let (provider, calls) = ScriptedProvider::new(vec![
        absent(),
        Err(ProviderError::Detection("sensor gone".into())),
    ]);
    let recorder = Recorder::default();

    let handle = LivenessSession::spawn(
        provider,
        recorder.clone(),
        recorder.callback(),
        fast_config(),
    );
    let outcome = handle.outcome().await;

    assert_eq!(outcome, SessionOutcome::ProviderFailed);
    let rec = recorder.snapshot();
    assert_eq!(rec.verdicts, vec![false]);
    assert!(rec
        .statuses
        .iter()
        .any(|s| s.contains("detector unavailable")));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn deadline_fires_while_detection_is_pending() {
    let recorder = Recorder::default();
    let config = SessionConfig {
        overall_timeout_ms: 1_000,
        ..fast_config()
    };

    let start = Instant::now();
    let handle = LivenessSession::spawn(
        HangingProvider,
        recorder.clone(),
        recorder.callback(),
        config,
    );
    let outcome = handle.outcome().await;

    assert_eq!(outcome, SessionOutcome::TimedOut);
    assert_eq!(start.elapsed(), Duration::from_millis(1_000));
    assert_eq!(recorder.snapshot().verdicts, vec![false]);
}

// --- Ordering and no-op ticks ---------------------------------------------

#[tokio::test(start_paused = true)]
async fn absent_ticks_never_advance_the_sequence() {
    let (provider, _) = ScriptedProvider::new(vec![
        absent(),
        absent(),
        frame(synthetic::blink_frame(1.0)),
        absent(),
        absent(),
    ]);
    let recorder = Recorder::default();

    let handle = LivenessSession::spawn(
        provider,
        recorder.clone(),
        recorder.callback(),
        fast_config(),
    );

    sleep(Duration::from_millis(3_000)).await;
    let rec = recorder.snapshot();
    assert_eq!(rec.statuses, vec!["Blink detected, now open your mouth..."]);
    assert!(rec.verdicts.is_empty());

    handle.stop();
    assert_eq!(handle.outcome().await, SessionOutcome::Cancelled);
    assert_eq!(recorder.snapshot().verdicts, vec![false]);
}

#[tokio::test(start_paused = true)]
async fn out_of_order_gates_are_ignored() {
    // Head turn and mouth arrive before the blink; the sequence only
    // advances once each awaited challenge is seen in order.
    let (provider, _) = ScriptedProvider::new(vec![
        frame(synthetic::head_turned_frame(-1.0, 1.0)),
        frame(synthetic::mouth_open_frame(1.0)),
        frame(synthetic::blink_frame(1.0)),
        frame(synthetic::mouth_open_frame(1.0)),
        frame(synthetic::head_turned_frame(1.0, 1.0)),
    ]);
    let recorder = Recorder::default();

    let handle = LivenessSession::spawn(
        provider,
        recorder.clone(),
        recorder.callback(),
        fast_config(),
    );
    let outcome = handle.outcome().await;

    assert_eq!(outcome, SessionOutcome::Passed);
    let rec = recorder.snapshot();
    assert_eq!(rec.statuses.len(), 3);
    assert_eq!(rec.verdicts, vec![true]);
}

// --- Cancellation ---------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_yields_single_false_verdict() {
    let (provider, calls) = ScriptedProvider::new(vec![]);
    let recorder = Recorder::default();

    let handle = LivenessSession::spawn(
        provider,
        recorder.clone(),
        recorder.callback(),
        fast_config(),
    );

    sleep(Duration::from_millis(700)).await;
    handle.stop();
    handle.stop();

    let outcome = handle.outcome().await;
    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(recorder.snapshot().verdicts, vec![false]);

    // The polling loop is gone.
    let calls_at_stop = calls.load(Ordering::SeqCst);
    sleep(Duration::from_millis(5_000)).await;
    assert_eq!(calls.load(Ordering::SeqCst), calls_at_stop);
}

#[tokio::test(start_paused = true)]
async fn stop_after_terminal_outcome_is_a_no_op() {
    let (provider, _) = ScriptedProvider::new(vec![]);
    let recorder = Recorder::default();
    let config = SessionConfig {
        overall_timeout_ms: 1_000,
        ..fast_config()
    };

    let handle = LivenessSession::spawn(provider, recorder.clone(), recorder.callback(), config);

    sleep(Duration::from_millis(2_000)).await;
    assert!(handle.is_finished());
    handle.stop();
    handle.stop();

    assert_eq!(handle.outcome().await, SessionOutcome::TimedOut);
    assert_eq!(recorder.snapshot().verdicts, vec![false]);
}

#[tokio::test(start_paused = true)]
async fn stop_during_grace_keeps_the_pass_verdict() {
    let (provider, _) = ScriptedProvider::new(vec![
        frame(synthetic::blink_frame(1.0)),
        frame(synthetic::mouth_open_frame(1.0)),
        frame(synthetic::head_turned_frame(1.0, 1.0)),
    ]);
    let recorder = Recorder::default();

    let handle = LivenessSession::spawn(
        provider,
        recorder.clone(),
        recorder.callback(),
        fast_config(),
    );

    // Passed at 1500ms; stop midway through the 3s grace window.
    sleep(Duration::from_millis(2_000)).await;
    handle.stop();

    let outcome = handle.outcome().await;
    assert_eq!(outcome, SessionOutcome::Passed);
    assert_eq!(recorder.snapshot().verdicts, vec![true]);
}

// --- Warmup progress ------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn slow_warmup_caps_progress_at_ninety() {
    let (provider, _) = ScriptedProvider::new(vec![]);
    let provider = provider.with_prepare_delay(Duration::from_millis(3_000));
    let recorder = Recorder::default();

    let handle = LivenessSession::spawn(
        provider,
        recorder.clone(),
        recorder.callback(),
        fast_config(),
    );

    sleep(Duration::from_millis(3_500)).await;
    handle.stop();
    handle.outcome().await;

    let rec = recorder.snapshot();
    assert_eq!(rec.progress.first(), Some(&0));
    assert_eq!(rec.progress.last(), Some(&100));
    // Everything between start and completion is capped at 90, and the
    // cap is actually held for multiple ticks while setup is pending.
    let middle = &rec.progress[1..rec.progress.len() - 1];
    assert!(middle.iter().all(|&p| p <= 90), "progress: {:?}", rec.progress);
    assert!(middle.iter().filter(|&&p| p == 90).count() >= 2);
    // Ramp is monotonic.
    assert!(middle.windows(2).all(|w| w[0] <= w[1]));
}
