//! Deterministic session simulation on virtual time.
//!
//! Drives a [`RoundController`] with a scripted learner so whole sessions
//! can be replayed from a seed. It enables:
//! - Checking timer and streak invariants across thousands of rounds
//! - Reproducing a session from a seed
//! - A quick headless smoke run from the CLI

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::answer::Submission;
use crate::config::DrillConfig;
use crate::controller::{RoundController, RoundState};
use crate::error::ValidationError;
use crate::events::{CorrectionCause, Event};
use crate::frontend::NarrationKind;
use crate::problem::Phase;
use crate::recorder::RecordingFrontend;
use crate::timer::TimerStats;

/// How the simulated learner behaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerProfile {
    /// Probability that a submitted answer is correct.
    pub accuracy: f64,
    /// Probability of never answering a recall prompt.
    pub timeout_rate: f64,
    /// Probability that the speech engine reports completion at all.
    pub narration_delivery: f64,
    /// Time between a prompt appearing and the learner submitting.
    pub answer_delay_ms: u64,
    /// Time the speech engine takes when it does report completion.
    pub narration_ms: u64,
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self {
            accuracy: 0.9,
            timeout_rate: 0.05,
            narration_delivery: 0.8,
            answer_delay_ms: 1500,
            narration_ms: 1200,
        }
    }
}

impl LearnerProfile {
    /// Every probability must lie in `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("learner.accuracy", self.accuracy),
            ("learner.timeout_rate", self.timeout_rate),
            ("learner.narration_delivery", self.narration_delivery),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field: field.into(),
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        Ok(())
    }
}

/// Simulation scenario definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationScenario {
    pub name: String,
    pub seed: u64,
    /// Rounds to play before stopping.
    pub rounds: u64,
    pub learner: LearnerProfile,
    pub config: DrillConfig,
}

impl SimulationScenario {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            seed,
            rounds: 100,
            learner: LearnerProfile::default(),
            config: DrillConfig::default(),
        }
    }

    pub fn with_rounds(mut self, rounds: u64) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_learner(mut self, learner: LearnerProfile) -> Self {
        self.learner = learner;
        self
    }

    pub fn with_config(mut self, config: DrillConfig) -> Self {
        self.config = config;
        self
    }
}

/// Outcome of a simulated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub name: String,
    pub seed: u64,
    pub rounds_played: u64,
    pub final_phase: Phase,
    pub study_completions: u32,
    pub final_streak: u32,
    pub best_streak: u32,
    pub milestone_count: u32,
    pub rewards_presented: usize,
    pub corrections: u32,
    pub timeouts: u32,
    /// Most deadline timers ever live at once.
    pub max_live_deadlines: usize,
    pub timer_stats: TimerStats,
    pub live_timers: usize,
    pub elapsed_ms: u64,
}

/// Play a scenario to completion.
///
/// Fails before playing if the learner or the config is invalid.
pub fn run(scenario: &SimulationScenario) -> Result<SimulationReport, ValidationError> {
    scenario.learner.validate()?;
    scenario.config.validate()?;
    let mut config = scenario.config.clone();
    config.seed = Some(scenario.seed);
    let mut ctl = RoundController::with_random_problems(config, RecordingFrontend::new());
    let mut rng = Mcg128Xsl64::seed_from_u64(scenario.seed ^ 0x5eed_5eed);
    let learner = &scenario.learner;

    let mut now = 0u64;
    let mut corrections = 0u32;
    let mut timeouts = 0u32;
    let mut max_live_deadlines = 0usize;

    ctl.start(now);
    ctl.interact(now);

    while ctl.session().round() <= scenario.rounds {
        max_live_deadlines = max_live_deadlines.max(ctl.live_deadlines());

        match ctl.state() {
            RoundState::AwaitingFirstInteraction => ctl.interact(now),
            RoundState::StudyPresent => {
                if rng.gen_bool(learner.narration_delivery) {
                    let id = ctl
                        .frontend()
                        .narrations_of(NarrationKind::Fact)
                        .last()
                        .map(|n| n.id);
                    if let Some(id) = id {
                        now += learner.narration_ms;
                        ctl.tick(now);
                        ctl.narration_finished(id, now);
                    }
                }
                if ctl.state() == RoundState::StudyPresent {
                    now = ctl.next_due_ms().unwrap_or(now).max(now);
                    ctl.tick(now);
                }
            }
            RoundState::StudyInput => {
                now += learner.answer_delay_ms;
                ctl.tick(now);
                let submission = study_answer(&ctl, &mut rng, learner.accuracy);
                ctl.submit(submission, now);
            }
            RoundState::RecallPresent => {
                if rng.gen_bool(learner.timeout_rate) {
                    now = ctl.next_due_ms().unwrap_or(now).max(now);
                    ctl.tick(now);
                } else {
                    now += learner.answer_delay_ms;
                    // A slow learner may lose the race against the deadline.
                    ctl.tick(now);
                    let submission = recall_answer(&ctl, &mut rng, learner.accuracy);
                    ctl.submit(submission, now);
                }
            }
            RoundState::Correcting(_) | RoundState::Rewarding => {
                now = ctl.next_due_ms().unwrap_or(now).max(now);
                ctl.tick(now);
            }
        }

        for event in ctl.drain_events() {
            if let Event::CorrectionStarted { cause, .. } = event {
                corrections += 1;
                if cause == CorrectionCause::RecallTimeout {
                    timeouts += 1;
                }
            }
        }
    }

    let session = ctl.session();
    Ok(SimulationReport {
        name: scenario.name.clone(),
        seed: scenario.seed,
        rounds_played: session.round().min(scenario.rounds),
        final_phase: session.phase(),
        study_completions: session.study_completions(),
        final_streak: session.streak(),
        best_streak: session.best_streak(),
        milestone_count: session.milestone_count(),
        rewards_presented: ctl.frontend().rewards.len(),
        corrections,
        timeouts,
        max_live_deadlines,
        timer_stats: ctl.timer_stats(),
        live_timers: ctl.live_timers(),
        elapsed_ms: now,
    })
}

fn study_answer(
    ctl: &RoundController<RecordingFrontend>,
    rng: &mut Mcg128Xsl64,
    accuracy: f64,
) -> Submission {
    let Some(p) = ctl.session().problem().copied() else {
        return Submission::study("", "", "");
    };
    let sum = if rng.gen_bool(accuracy) {
        p.sum()
    } else {
        p.sum() + 1
    };
    // Either addend order counts.
    if rng.gen_bool(0.5) {
        Submission::study(p.addend_a.to_string(), p.addend_b.to_string(), sum.to_string())
    } else {
        Submission::study(p.addend_b.to_string(), p.addend_a.to_string(), sum.to_string())
    }
}

fn recall_answer(
    ctl: &RoundController<RecordingFrontend>,
    rng: &mut Mcg128Xsl64,
    accuracy: f64,
) -> Submission {
    let Some(p) = ctl.session().problem().copied() else {
        return Submission::recall("");
    };
    if rng.gen_bool(accuracy) {
        Submission::recall(p.sum().to_string())
    } else {
        Submission::recall((p.sum() + 1).to_string())
    }
}
