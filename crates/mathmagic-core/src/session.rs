//! Per-session counters and round bookkeeping.
//!
//! Only the round controller mutates a `Session`; everything else reads
//! it or receives a [`Stats`] snapshot.

use serde::{Deserialize, Serialize};

use crate::problem::{Phase, Problem};
use crate::timer::TimerHandle;

/// Counter snapshot pushed to the stats display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub phase: Phase,
    pub streak: u32,
    pub milestone_count: u32,
    pub study_completions: u32,
    pub study_target: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    phase: Phase,
    study_target: u32,
    study_completions: u32,
    streak: u32,
    best_streak: u32,
    milestone_count: u32,
    is_locked: bool,
    pending_deadline: Option<TimerHandle>,
    /// Increments every time a round begins. Zero before the first round.
    round: u64,
    problem: Option<Problem>,
}

impl Session {
    pub fn new(study_target: u32) -> Self {
        Self {
            phase: Phase::Study,
            study_target,
            study_completions: 0,
            streak: 0,
            best_streak: 0,
            milestone_count: 0,
            is_locked: false,
            pending_deadline: None,
            round: 0,
            problem: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn study_target(&self) -> u32 {
        self.study_target
    }

    pub fn study_completions(&self) -> u32 {
        self.study_completions
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn milestone_count(&self) -> u32 {
        self.milestone_count
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    pub fn pending_deadline(&self) -> Option<TimerHandle> {
        self.pending_deadline
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            phase: self.phase,
            streak: self.streak,
            milestone_count: self.milestone_count,
            study_completions: self.study_completions,
            study_target: self.study_target,
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Re-evaluate the phase from the study count. Recall never reverts to study.
    ///
    /// Returns the previous phase when it changed.
    pub(crate) fn select_phase(&mut self) -> Option<Phase> {
        let previous = self.phase;
        if self.phase == Phase::Study && self.study_completions >= self.study_target {
            self.phase = Phase::Recall;
        }
        (previous != self.phase).then_some(previous)
    }

    pub(crate) fn begin_round(&mut self, problem: Problem) -> u64 {
        self.round += 1;
        self.problem = Some(problem);
        self.round
    }

    pub(crate) fn lock(&mut self) {
        self.is_locked = true;
    }

    pub(crate) fn unlock(&mut self) {
        self.is_locked = false;
    }

    pub(crate) fn set_deadline(&mut self, handle: TimerHandle) {
        debug_assert!(
            self.pending_deadline.is_none(),
            "deadline armed while another is pending"
        );
        self.pending_deadline = Some(handle);
    }

    pub(crate) fn take_deadline(&mut self) -> Option<TimerHandle> {
        self.pending_deadline.take()
    }

    pub(crate) fn record_study_completion(&mut self) -> u32 {
        self.study_completions += 1;
        self.study_completions
    }

    pub(crate) fn record_correct_recall(&mut self) -> u32 {
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.streak
    }

    /// Zero the streak, returning its previous value.
    pub(crate) fn reset_streak(&mut self) -> u32 {
        std::mem::take(&mut self.streak)
    }

    pub(crate) fn record_milestone(&mut self) -> u32 {
        self.milestone_count += 1;
        self.milestone_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_switches_once_target_is_met() {
        let mut s = Session::new(2);
        assert_eq!(s.select_phase(), None);
        s.record_study_completion();
        assert_eq!(s.select_phase(), None);
        s.record_study_completion();
        assert_eq!(s.select_phase(), Some(Phase::Study));
        assert_eq!(s.phase(), Phase::Recall);
        assert_eq!(s.select_phase(), None);
    }

    #[test]
    fn reset_streak_returns_previous_and_keeps_best() {
        let mut s = Session::new(1);
        for _ in 0..7 {
            s.record_correct_recall();
        }
        assert_eq!(s.reset_streak(), 7);
        assert_eq!(s.streak(), 0);
        assert_eq!(s.best_streak(), 7);
        assert_eq!(s.reset_streak(), 0);
    }

    #[test]
    fn rounds_are_numbered_from_one() {
        let mut s = Session::new(20);
        assert_eq!(s.round(), 0);
        assert_eq!(s.begin_round(Problem::new(1, 2)), 1);
        assert_eq!(s.begin_round(Problem::new(2, 2)), 2);
        assert_eq!(s.problem(), Some(&Problem::new(2, 2)));
    }

    #[test]
    fn stats_snapshot_mirrors_counters() {
        let mut s = Session::new(20);
        s.record_study_completion();
        s.record_milestone();
        let stats = s.stats();
        assert_eq!(stats.study_completions, 1);
        assert_eq!(stats.milestone_count, 1);
        assert_eq!(stats.study_target, 20);
        assert_eq!(stats.phase, Phase::Study);
    }
}
