use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::info;

use presence_core::{
    FeedbackSink, LandmarkProvider, LivenessSession, ProviderError, SessionConfig, SessionOutcome,
};
use presence_signals::{synthetic, LandmarkFrame};

#[derive(Parser)]
#[command(name = "presence-cli")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted verification session against synthetic frames.
    Demo {
        /// Let the deadline elapse instead of completing the challenges.
        #[arg(long)]
        timeout: bool,
        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = 250)]
        poll_ms: u64,
    },
    /// Load and validate a session configuration file.
    Validate { config: String },
}

/// Replays a canned detection script, one entry per poll tick.
struct DemoProvider {
    script: VecDeque<Option<LandmarkFrame>>,
}

impl DemoProvider {
    fn passing() -> Self {
        Self {
            script: VecDeque::from(vec![
                None,
                Some(synthetic::neutral_frame(1.0)),
                Some(synthetic::blink_frame(1.0)),
                Some(synthetic::neutral_frame(1.0)),
                Some(synthetic::mouth_open_frame(1.0)),
                Some(synthetic::head_turned_frame(1.0, 1.0)),
            ]),
        }
    }

    fn faceless() -> Self {
        Self {
            script: VecDeque::new(),
        }
    }
}

#[async_trait]
impl LandmarkProvider for DemoProvider {
    async fn prepare(&mut self) -> Result<(), ProviderError> {
        // Stand-in for detector model loading.
        tokio::time::sleep(Duration::from_millis(600)).await;
        Ok(())
    }

    async fn detect_once(&mut self) -> Result<Option<LandmarkFrame>, ProviderError> {
        Ok(self.script.pop_front().flatten())
    }
}

/// Prints feedback the way an embedding UI would render it.
struct StdoutSink;

impl FeedbackSink for StdoutSink {
    fn on_progress(&mut self, percent: u8) {
        println!("[progress] {percent}%");
    }
    fn on_status(&mut self, text: &str) {
        println!("[status]   {text}");
    }
    fn on_prompt(&mut self, message: &str) {
        println!("[prompt]   {message}");
    }
}

async fn run_demo(timeout: bool, poll_ms: u64) -> SessionOutcome {
    let provider = if timeout {
        DemoProvider::faceless()
    } else {
        DemoProvider::passing()
    };
    let config = SessionConfig {
        poll_interval_ms: poll_ms,
        overall_timeout_ms: if timeout { 2_000 } else { 60_000 },
        success_grace_ms: 1_000,
        ..Default::default()
    };

    let handle = LivenessSession::spawn(
        provider,
        StdoutSink,
        |verdict| println!("[verdict]  {verdict}"),
        config,
    );
    handle.outcome().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Demo { timeout, poll_ms } => {
            let outcome = run_demo(timeout, poll_ms).await;
            info!(?outcome, "demo session finished");
            println!("Session outcome: {outcome:?}");
        }
        Commands::Validate { config } => {
            let cfg = SessionConfig::from_toml_file(&config)?;
            println!(
                "{} is valid: poll every {}ms, deadline {}ms, grace {}ms",
                config, cfg.poll_interval_ms, cfg.overall_timeout_ms, cfg.success_grace_ms
            );
        }
    }
    Ok(())
}
