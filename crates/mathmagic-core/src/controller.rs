//! Round controller.
//!
//! The controller is a clock-driven state machine. It does not use
//! internal threads: the host passes a monotonic millisecond clock to
//! every call and invokes `tick()` periodically so expired timers fire.
//!
//! ## State Transitions
//!
//! ```text
//! AwaitingFirstInteraction -> StudyPresent -> StudyInput -> (StudyPresent | RecallPresent)
//! StudyInput -> Correcting -> next round
//! RecallPresent -> (next round | Rewarding | Correcting)
//! Rewarding -> RecallPresent
//! Correcting -> (StudyPresent | RecallPresent)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut ctl = RoundController::with_random_problems(config, frontend);
//! ctl.start(now);
//! ctl.interact(now); // first gesture
//! // In a loop:
//! ctl.tick(now);
//! ctl.submit(Submission::recall("7"), now);
//! ```

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::answer::Submission;
use crate::config::DrillConfig;
use crate::events::{CorrectionCause, Event, IgnoreReason, RevealTrigger};
use crate::frontend::{
    BlockStack, Frontend, Narration, NarrationId, NarrationKind, PresentationId,
    RewardPresentation, View,
};
use crate::milestone::{milestone_for, Milestone};
use crate::problem::{Phase, Problem, ProblemSource, RandomProblems};
use crate::session::Session;
use crate::timer::{TimerHandle, TimerQueue, TimerStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    /// Nothing has played yet; waiting for a user gesture.
    AwaitingFirstInteraction,
    /// Study fact shown and narrated.
    StudyPresent,
    /// Three reconstruction fields open.
    StudyInput,
    /// Recall prompt shown, deadline armed.
    RecallPresent,
    /// Correct answer on display until the grace delay elapses.
    Correcting(CorrectionCause),
    /// Milestone celebration running until the reward duration elapses.
    Rewarding,
}

impl RoundState {
    pub fn accepts_input(self) -> bool {
        matches!(self, RoundState::StudyInput | RoundState::RecallPresent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    /// Recall time limit.
    Deadline,
    /// Opens study input if narration never reports back.
    NarrationSafety,
    /// Short pause between narration completion and study input.
    RevealInput,
    /// End of a correction or reward.
    NextRound,
}

/// Every timer belongs to the round that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RoundTimer {
    round: u64,
    kind: TimerKind,
}

pub struct RoundController<F, P = RandomProblems> {
    config: DrillConfig,
    session: Session,
    state: RoundState,
    frontend: F,
    problems: P,
    /// Picks reward gallery images.
    rng: Mcg128Xsl64,
    timers: TimerQueue<RoundTimer>,
    next_narration: u64,
    next_presentation: u64,
    /// The study narration whose completion opens the input fields.
    awaiting_narration: Option<NarrationId>,
    events: VecDeque<Event>,
}

impl<F: Frontend> RoundController<F, RandomProblems> {
    /// Controller drawing problems from a PCG generator seeded by `config.seed`.
    pub fn with_random_problems(config: DrillConfig, frontend: F) -> Self {
        let problems = RandomProblems::new(config.seed, config.recall.hard_probability);
        Self::new(config, frontend, problems)
    }
}

impl<F: Frontend, P: ProblemSource> RoundController<F, P> {
    pub fn new(config: DrillConfig, frontend: F, problems: P) -> Self {
        let rng = match config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed.wrapping_add(1)),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            session: Session::new(config.study.target),
            config,
            state: RoundState::AwaitingFirstInteraction,
            frontend,
            problems,
            rng,
            timers: TimerQueue::new(),
            next_narration: 1,
            next_presentation: 1,
            awaiting_narration: None,
            events: VecDeque::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &DrillConfig {
        &self.config
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    /// Earliest pending timer expiry, for hosts that sleep between ticks.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.next_due_ms()
    }

    pub fn timer_stats(&self) -> TimerStats {
        self.timers.stats()
    }

    pub fn live_timers(&self) -> usize {
        self.timers.live_count()
    }

    pub fn live_deadlines(&self) -> usize {
        self.timers.count_where(|t| t.kind == TimerKind::Deadline)
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    // ── Host inputs ──────────────────────────────────────────────────

    /// Show the idle screen and initial counters.
    pub fn start(&mut self, now_ms: u64) {
        self.frontend.render(&View::Idle);
        self.push_stats();
        self.events.push_back(Event::SessionStarted { at_ms: now_ms });
    }

    /// A user gesture. The first one starts the first round; later ones do nothing.
    pub fn interact(&mut self, now_ms: u64) {
        if self.state == RoundState::AwaitingFirstInteraction {
            tracing::info!("first interaction, starting session");
            self.advance_round(now_ms);
        }
    }

    /// Fire every timer that has expired by `now_ms`.
    ///
    /// Follow-up timers are armed from each timer's own expiry, so one
    /// late tick replays the same sequence a punctual host would see.
    pub fn tick(&mut self, now_ms: u64) {
        while let Some(expired) = self.timers.pop_due(now_ms) {
            let timer = expired.kind;
            if timer.round != self.session.round() {
                tracing::warn!(round = timer.round, kind = ?timer.kind, "discarding timer from a finished round");
                continue;
            }
            tracing::debug!(kind = ?timer.kind, due_ms = expired.due_ms, "timer fired");
            let at = expired.due_ms;
            match timer.kind {
                TimerKind::Deadline => {
                    if self.session.pending_deadline() == Some(expired.handle) {
                        self.session.take_deadline();
                    }
                    if self.state == RoundState::RecallPresent && !self.session.is_locked() {
                        self.session.lock();
                        self.start_correction(CorrectionCause::RecallTimeout, at);
                    }
                }
                TimerKind::NarrationSafety => {
                    self.reveal_study_input(RevealTrigger::SafetyTimeout, at);
                }
                TimerKind::RevealInput => {
                    self.reveal_study_input(RevealTrigger::NarrationFinished, at);
                }
                TimerKind::NextRound => self.advance_round(at),
            }
        }
    }

    /// The narration gateway reports that speech finished.
    ///
    /// Unknown, repeated, or late completions are ignored. Timers due by
    /// `now_ms` fire first, so a safety timeout that already expired wins.
    pub fn narration_finished(&mut self, id: NarrationId, now_ms: u64) {
        self.tick(now_ms);
        if self.awaiting_narration != Some(id) || self.state != RoundState::StudyPresent {
            tracing::debug!(id = id.0, "ignoring narration completion");
            return;
        }
        self.awaiting_narration = None;
        let round = self.session.round();
        self.timers
            .cancel_where(|t| t.round == round && t.kind == TimerKind::NarrationSafety);
        let delay = self.config.study.reveal_delay_ms;
        if delay == 0 {
            self.reveal_study_input(RevealTrigger::NarrationFinished, now_ms);
        } else {
            self.arm(now_ms, delay, TimerKind::RevealInput);
        }
    }

    /// The reward presenter reports that its celebration finished.
    ///
    /// Round timing never depends on this; it is logged only.
    pub fn presentation_finished(&mut self, id: PresentationId, _now_ms: u64) {
        tracing::debug!(id = id.0, state = ?self.state, "reward presentation finished");
    }

    /// A completed entry from input capture.
    ///
    /// Timers due by `now_ms` fire first: an answer stamped after the
    /// deadline loses to it.
    pub fn submit(&mut self, submission: Submission, now_ms: u64) {
        self.tick(now_ms);
        if self.session.is_locked() {
            self.ignore(IgnoreReason::Locked, now_ms);
            return;
        }
        if !self.state.accepts_input() {
            self.ignore(IgnoreReason::NotAccepting, now_ms);
            return;
        }
        let expected = match self.state {
            RoundState::StudyInput => Phase::Study,
            _ => Phase::Recall,
        };
        if submission.phase() != expected {
            self.ignore(IgnoreReason::WrongShape, now_ms);
            return;
        }
        let Some(problem) = self.session.problem().copied() else {
            self.ignore(IgnoreReason::NotAccepting, now_ms);
            return;
        };

        self.session.lock();
        let correct = submission.is_correct_for(&problem);
        match expected {
            Phase::Study => self.finish_study(correct, now_ms),
            Phase::Recall => self.finish_recall(correct, now_ms),
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Start the next round. Every round begins here.
    fn advance_round(&mut self, now_ms: u64) {
        let cancelled = self.timers.cancel_where(|_| true);
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled timers from previous round");
        }
        self.session.take_deadline();
        self.session.unlock();
        self.awaiting_narration = None;

        if let Some(from) = self.session.select_phase() {
            let to = self.session.phase();
            tracing::info!(?from, ?to, "phase changed");
            self.events.push_back(Event::PhaseChanged {
                from,
                to,
                at_ms: now_ms,
            });
            self.push_stats();
        }

        let phase = self.session.phase();
        let problem = self.problems.next_problem(phase);
        let round = self.session.begin_round(problem);
        tracing::debug!(round, ?phase, a = problem.addend_a, b = problem.addend_b, "round started");
        self.events.push_back(Event::RoundStarted {
            round,
            phase,
            problem,
            at_ms: now_ms,
        });

        let stack = self.stack(&problem);
        match phase {
            Phase::Study => {
                self.state = RoundState::StudyPresent;
                self.frontend.render(&View::Fact { problem, stack });
                let id = self.narrate(NarrationKind::Fact, problem.spoken());
                self.awaiting_narration = Some(id);
                self.arm(
                    now_ms,
                    self.config.study.narration_safety_ms,
                    TimerKind::NarrationSafety,
                );
            }
            Phase::Recall => {
                self.state = RoundState::RecallPresent;
                self.frontend.render(&View::RecallPrompt { problem, stack });
                let handle = self.arm(now_ms, self.config.recall.deadline_ms, TimerKind::Deadline);
                self.session.set_deadline(handle);
            }
        }
    }

    fn reveal_study_input(&mut self, trigger: RevealTrigger, now_ms: u64) {
        if self.state != RoundState::StudyPresent {
            return;
        }
        let round = self.session.round();
        self.timers.cancel_where(|t| {
            t.round == round
                && matches!(t.kind, TimerKind::NarrationSafety | TimerKind::RevealInput)
        });
        self.awaiting_narration = None;
        self.state = RoundState::StudyInput;

        if trigger == RevealTrigger::SafetyTimeout {
            tracing::warn!(round, "narration did not finish in time, opening input");
        }
        if let Some(problem) = self.session.problem().copied() {
            let stack = self.stack(&problem);
            self.frontend.render(&View::StudyPrompt { stack });
        }
        self.events.push_back(Event::StudyInputOpened {
            round,
            trigger,
            at_ms: now_ms,
        });
    }

    fn finish_study(&mut self, correct: bool, now_ms: u64) {
        if !correct {
            self.start_correction(CorrectionCause::StudyMistake, now_ms);
            return;
        }
        let completions = self.session.record_study_completion();
        self.push_stats();
        self.events.push_back(Event::StudyCompleted {
            completions,
            target: self.session.study_target(),
            at_ms: now_ms,
        });
        self.advance_round(now_ms);
    }

    fn finish_recall(&mut self, correct: bool, now_ms: u64) {
        self.cancel_deadline();
        if !correct {
            self.start_correction(CorrectionCause::RecallWrong, now_ms);
            return;
        }
        let streak = self.session.record_correct_recall();
        self.push_stats();
        self.events.push_back(Event::AnswerAccepted {
            streak,
            at_ms: now_ms,
        });
        match milestone_for(streak) {
            Some(milestone) => self.start_reward(streak, milestone, now_ms),
            None => self.advance_round(now_ms),
        }
    }

    /// Show and narrate the correct fact, then advance after the grace delay
    /// whether or not narration ever completes.
    fn start_correction(&mut self, cause: CorrectionCause, now_ms: u64) {
        self.cancel_deadline();
        self.session.lock();

        let previous_streak = match cause {
            CorrectionCause::StudyMistake => 0,
            CorrectionCause::RecallWrong | CorrectionCause::RecallTimeout => {
                let previous = self.session.reset_streak();
                self.push_stats();
                previous
            }
        };

        self.state = RoundState::Correcting(cause);
        let round = self.session.round();
        tracing::debug!(round, ?cause, previous_streak, "correction started");

        if let Some(problem) = self.session.problem().copied() {
            let stack = self.stack(&problem);
            self.frontend.render(&View::Correction { problem, stack });
            let text = match cause {
                CorrectionCause::StudyMistake => {
                    format!("Let's try that again. {}", problem.spoken())
                }
                _ => problem.spoken(),
            };
            self.narrate(NarrationKind::Correction, text);
        }

        self.arm(now_ms, self.config.timing.grace_delay_ms, TimerKind::NextRound);
        self.events.push_back(Event::CorrectionStarted {
            round,
            cause,
            previous_streak,
            at_ms: now_ms,
        });
    }

    /// Celebrate a milestone. Input stays locked until the reward duration elapses.
    fn start_reward(&mut self, streak: u32, milestone: Milestone, now_ms: u64) {
        let milestone_count = self.session.record_milestone();
        self.push_stats();
        self.state = RoundState::Rewarding;
        tracing::info!(streak, milestone_count, title = milestone.title, "milestone reached");

        if let Some(problem) = self.session.problem().copied() {
            let stack = self.stack(&problem);
            self.frontend.render(&View::Reward {
                problem,
                stack,
                streak,
                title: milestone.title.to_string(),
            });
        }
        self.narrate(NarrationKind::Celebration, milestone.title.to_string());
        let id = PresentationId(self.next_presentation);
        self.next_presentation += 1;
        let reward = RewardPresentation {
            id,
            streak,
            title: milestone.title.to_string(),
            asset: milestone.asset.resolve(&mut self.rng).to_string(),
        };
        self.frontend.present(&reward);

        self.arm(
            now_ms,
            self.config.timing.reward_duration_ms,
            TimerKind::NextRound,
        );
        self.events.push_back(Event::MilestoneReached {
            streak,
            milestone_count,
            title: reward.title,
            at_ms: now_ms,
        });
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self, now_ms: u64, duration_ms: u64, kind: TimerKind) -> TimerHandle {
        let round = self.session.round();
        self.timers.schedule(now_ms, duration_ms, RoundTimer { round, kind })
    }

    fn cancel_deadline(&mut self) {
        if let Some(handle) = self.session.take_deadline() {
            self.timers.cancel(handle);
        }
    }

    fn narrate(&mut self, kind: NarrationKind, text: String) -> NarrationId {
        let id = NarrationId(self.next_narration);
        self.next_narration += 1;
        self.frontend.narrate(&Narration { id, kind, text });
        id
    }

    fn push_stats(&mut self) {
        let stats = self.session.stats();
        self.frontend.show_stats(&stats);
    }

    fn ignore(&mut self, reason: IgnoreReason, now_ms: u64) {
        tracing::debug!(?reason, state = ?self.state, "submission ignored");
        self.events.push_back(Event::SubmissionIgnored {
            reason,
            at_ms: now_ms,
        });
    }

    fn stack(&self, problem: &Problem) -> BlockStack {
        BlockStack::for_problem(problem, self.config.display.unit_px)
    }
}
