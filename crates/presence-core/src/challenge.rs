//! Challenge Sequencer
//!
//! Fixed-order challenge state machine: blink, then mouth open, then head
//! turn. Consumes per-frame gate results and advances one step at a time;
//! a gate firing out of order is ignored, which keeps a static photo from
//! passing a late-stage check it never led up to.
//!
//! Pure function of (state, gate result). No timers, no I/O; all timing
//! lives in the session controller.

use serde::{Deserialize, Serialize};

use presence_signals::GateResult;

/// One ordered liveness challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeKind {
    Blink,
    MouthOpen,
    HeadTurn,
}

impl ChallengeKind {
    /// Prompt spoken/shown when this challenge becomes the awaited one.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Blink => "Please blink your eyes to start the liveness check.",
            Self::MouthOpen => "Good job! Now please open your mouth.",
            Self::HeadTurn => "Nice! Now please turn your head left or right.",
        }
    }

    /// Status line reported when this challenge is satisfied.
    pub fn satisfied_status(&self) -> &'static str {
        match self {
            Self::Blink => "Blink detected, now open your mouth...",
            Self::MouthOpen => "Mouth open detected, now turn your head...",
            Self::HeadTurn => "Liveness check passed!",
        }
    }

    /// Whether the gate result satisfies this challenge.
    fn satisfied_by(&self, gate: GateResult) -> bool {
        match self {
            Self::Blink => gate.blink,
            Self::MouthOpen => gate.mouth_open,
            Self::HeadTurn => gate.head_turn,
        }
    }
}

/// Prompt spoken once the whole sequence is complete.
pub const PASSED_PROMPT: &str = "Excellent. Liveness check complete.";

/// Sequencer state for one verification session.
///
/// Progression is strictly `Idle -> AwaitingBlink -> AwaitingMouthOpen ->
/// AwaitingHeadTurn -> Passed`; no state is ever skipped or revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengePhase {
    Idle,
    AwaitingBlink,
    AwaitingMouthOpen,
    AwaitingHeadTurn,
    Passed,
}

impl ChallengePhase {
    /// Monotonic index of the phase within the fixed progression.
    pub fn index(&self) -> usize {
        match self {
            Self::Idle => 0,
            Self::AwaitingBlink => 1,
            Self::AwaitingMouthOpen => 2,
            Self::AwaitingHeadTurn => 3,
            Self::Passed => 4,
        }
    }

    /// The challenge currently awaited, if any.
    pub fn awaited(&self) -> Option<ChallengeKind> {
        match self {
            Self::AwaitingBlink => Some(ChallengeKind::Blink),
            Self::AwaitingMouthOpen => Some(ChallengeKind::MouthOpen),
            Self::AwaitingHeadTurn => Some(ChallengeKind::HeadTurn),
            Self::Idle | Self::Passed => None,
        }
    }

    fn next(&self) -> ChallengePhase {
        match self {
            Self::Idle => Self::AwaitingBlink,
            Self::AwaitingBlink => Self::AwaitingMouthOpen,
            Self::AwaitingMouthOpen => Self::AwaitingHeadTurn,
            Self::AwaitingHeadTurn | Self::Passed => Self::Passed,
        }
    }
}

/// Transition emitted when an observation satisfies the awaited challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeEvent {
    /// A challenge was satisfied and the next one is now awaited.
    Advanced {
        satisfied: ChallengeKind,
        next: ChallengeKind,
    },
    /// The final challenge was satisfied; the sequence is complete.
    Completed { satisfied: ChallengeKind },
}

/// Fixed-order challenge state machine.
#[derive(Debug, Clone)]
pub struct ChallengeSequencer {
    phase: ChallengePhase,
}

impl ChallengeSequencer {
    pub fn new() -> Self {
        Self {
            phase: ChallengePhase::Idle,
        }
    }

    /// Enter the first challenge immediately; no tick is spent idle.
    ///
    /// Returns the opening instruction. Calling `begin` more than once
    /// has no effect after the first call.
    pub fn begin(&mut self) -> &'static str {
        if self.phase == ChallengePhase::Idle {
            self.phase = ChallengePhase::AwaitingBlink;
        }
        ChallengeKind::Blink.instruction()
    }

    /// Consume one frame's gate result.
    ///
    /// Advances at most one step. A gate that does not match the awaited
    /// challenge leaves the state unchanged: no regression, no skipping
    /// ahead even if a later gate fires early.
    pub fn observe(&mut self, gate: GateResult) -> Option<ChallengeEvent> {
        let satisfied = self.phase.awaited()?;
        if !satisfied.satisfied_by(gate) {
            return None;
        }

        self.phase = self.phase.next();
        Some(match self.phase.awaited() {
            Some(next) => ChallengeEvent::Advanced { satisfied, next },
            None => ChallengeEvent::Completed { satisfied },
        })
    }

    pub fn phase(&self) -> ChallengePhase {
        self.phase
    }

    pub fn phase_index(&self) -> usize {
        self.phase.index()
    }

    pub fn is_passed(&self) -> bool {
        self.phase == ChallengePhase::Passed
    }
}

impl Default for ChallengeSequencer {
    fn default() -> Self {
        Self::new()
    }
}
