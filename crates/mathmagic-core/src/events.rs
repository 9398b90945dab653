use serde::{Deserialize, Serialize};

use crate::problem::{Phase, Problem};

/// Why the study input fields opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealTrigger {
    NarrationFinished,
    /// Narration never reported back within the safety window.
    SafetyTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionCause {
    StudyMistake,
    RecallWrong,
    RecallTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// A result is still being adjudicated, corrected or celebrated.
    Locked,
    /// No input mode is open (idle, or study narration still playing).
    NotAccepting,
    /// One-field entry during study or three-field entry during recall.
    WrongShape,
}

/// Every state change in the controller produces an Event.
/// The host drains them with `drain_events()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        at_ms: u64,
    },
    RoundStarted {
        round: u64,
        phase: Phase,
        problem: Problem,
        at_ms: u64,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        at_ms: u64,
    },
    StudyInputOpened {
        round: u64,
        trigger: RevealTrigger,
        at_ms: u64,
    },
    StudyCompleted {
        completions: u32,
        target: u32,
        at_ms: u64,
    },
    AnswerAccepted {
        streak: u32,
        at_ms: u64,
    },
    CorrectionStarted {
        round: u64,
        cause: CorrectionCause,
        /// Streak before the reset. Always zero for study mistakes.
        previous_streak: u32,
        at_ms: u64,
    },
    MilestoneReached {
        streak: u32,
        milestone_count: u32,
        title: String,
        at_ms: u64,
    },
    SubmissionIgnored {
        reason: IgnoreReason,
        at_ms: u64,
    },
}
