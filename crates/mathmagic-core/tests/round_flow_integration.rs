//! Integration tests for full rounds on virtual time.
//!
//! Each test drives the controller through the public host API only:
//! gestures, ticks, narration completions and submissions.

use mathmagic_core::milestone::CALF_GALLERY;
use mathmagic_core::{
    CorrectionCause, DrillConfig, Event, IgnoreReason, NarrationKind, Phase, Problem,
    ProblemSource, RecordingFrontend, RoundController, RoundState, Submission, View,
};

/// Serves study and recall problems from separate fixed lists.
struct Fixed {
    study: Problem,
    recall: Problem,
}

impl ProblemSource for Fixed {
    fn next_problem(&mut self, phase: Phase) -> Problem {
        match phase {
            Phase::Study => self.study,
            Phase::Recall => self.recall,
        }
    }
}

type Ctl = RoundController<RecordingFrontend, Fixed>;

fn controller(target: u32, study: Problem, recall: Problem) -> Ctl {
    let mut config = DrillConfig::default();
    config.study.target = target;
    config.seed = Some(7);
    let mut ctl = RoundController::new(config, RecordingFrontend::new(), Fixed { study, recall });
    ctl.start(0);
    ctl.interact(0);
    ctl
}

/// Complete one study round via the safety timer, returning the time of the entry.
fn complete_study(ctl: &mut Ctl, started_at: u64) -> u64 {
    let now = started_at + 5000;
    ctl.tick(now);
    let p = *ctl.session().problem().unwrap();
    ctl.submit(
        Submission::study(p.addend_a.to_string(), p.addend_b.to_string(), p.sum().to_string()),
        now,
    );
    now
}

fn corrections(events: &[Event]) -> Vec<CorrectionCause> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::CorrectionStarted { cause, .. } => Some(*cause),
            _ => None,
        })
        .collect()
}

#[test]
fn test_study_entry_in_order_counts() {
    let mut ctl = controller(20, Problem::new(3, 4), Problem::new(1, 1));
    let id = ctl.frontend().last_narration().unwrap().id;
    ctl.narration_finished(id, 900);
    ctl.tick(1900);
    assert_eq!(ctl.state(), RoundState::StudyInput);

    ctl.submit(Submission::study("3", "4", "7"), 2500);

    assert_eq!(ctl.session().study_completions(), 1);
    assert_eq!(ctl.frontend().narrations_of(NarrationKind::Correction).count(), 0);
    assert_eq!(ctl.state(), RoundState::StudyPresent);
    assert_eq!(ctl.session().round(), 2);
    assert_eq!(ctl.frontend().last_stats().unwrap().study_completions, 1);
}

#[test]
fn test_study_entry_with_swapped_addends_counts() {
    let mut ctl = controller(20, Problem::new(3, 4), Problem::new(1, 1));
    ctl.tick(5000);
    ctl.submit(Submission::study("4", "3", "7"), 5100);
    assert_eq!(ctl.session().study_completions(), 1);
    assert!(corrections(&ctl.drain_events()).is_empty());
}

#[test]
fn test_study_entry_with_blank_field_is_a_mistake() {
    let mut ctl = controller(20, Problem::new(3, 4), Problem::new(1, 1));
    ctl.tick(5000);
    ctl.submit(Submission::study("3", "", "7"), 5100);
    assert_eq!(ctl.session().study_completions(), 0);
    assert_eq!(
        corrections(&ctl.drain_events()),
        vec![CorrectionCause::StudyMistake]
    );
}

#[test]
fn test_wrong_recall_resets_streak_and_advances_after_grace() {
    let mut ctl = controller(1, Problem::new(1, 1), Problem::new(4, 5));
    let now = complete_study(&mut ctl, 0);
    ctl.submit(Submission::recall("9"), now + 100);
    assert_eq!(ctl.session().streak(), 1);
    let round = ctl.session().round();

    ctl.submit(Submission::recall("8"), now + 200);

    assert_eq!(ctl.session().streak(), 0);
    assert_eq!(ctl.state(), RoundState::Correcting(CorrectionCause::RecallWrong));
    assert_eq!(
        ctl.frontend().last_narration().unwrap().text,
        "4 plus 5 is 9"
    );
    assert!(matches!(
        ctl.frontend().last_view(),
        Some(View::Correction { problem, .. }) if problem.sum() == 9
    ));
    assert_eq!(ctl.live_deadlines(), 0);

    ctl.tick(now + 200 + 1999);
    assert_eq!(ctl.session().round(), round);
    ctl.tick(now + 200 + 2000);
    assert_eq!(ctl.session().round(), round + 1);
    assert_eq!(ctl.state(), RoundState::RecallPresent);
    assert!(!ctl.session().is_locked());
}

#[test]
fn test_tenth_correct_answer_rewards_once() {
    let mut ctl = controller(1, Problem::new(1, 1), Problem::new(2, 2));
    let mut now = complete_study(&mut ctl, 0);
    for _ in 0..10 {
        now += 10;
        ctl.submit(Submission::recall("4"), now);
    }

    assert_eq!(ctl.state(), RoundState::Rewarding);
    assert_eq!(ctl.session().milestone_count(), 1);
    assert_eq!(ctl.frontend().rewards.len(), 1);
    let reward = &ctl.frontend().rewards[0];
    assert_eq!(reward.streak, 10);
    assert_eq!(reward.title, "BOUGIE STREAK!");
    assert!(CALF_GALLERY.contains(&reward.asset.as_str()));
    assert!(matches!(
        ctl.frontend().last_view(),
        Some(View::Reward { streak: 10, .. })
    ));
    assert_eq!(
        ctl.frontend().last_narration().unwrap().kind,
        NarrationKind::Celebration
    );

    // Input stays locked for the whole celebration.
    ctl.submit(Submission::recall("4"), now + 100);
    assert!(ctl.drain_events().iter().any(|e| matches!(
        e,
        Event::SubmissionIgnored {
            reason: IgnoreReason::Locked,
            ..
        }
    )));

    ctl.tick(now + 3499);
    assert_eq!(ctl.state(), RoundState::Rewarding);
    ctl.tick(now + 3500);
    assert_eq!(ctl.state(), RoundState::RecallPresent);
    assert_eq!(ctl.session().streak(), 10);
    assert_eq!(ctl.frontend().rewards.len(), 1);

    ctl.submit(Submission::recall("4"), now + 3600);
    assert_eq!(ctl.session().streak(), 11);
    assert_eq!(ctl.session().milestone_count(), 1);
}

#[test]
fn test_twentieth_answer_shows_second_tier() {
    let mut ctl = controller(1, Problem::new(1, 1), Problem::new(2, 2));
    let mut now = complete_study(&mut ctl, 0);
    for _ in 0..20 {
        now += 10;
        ctl.submit(Submission::recall("4"), now);
        if ctl.state() == RoundState::Rewarding {
            now += 3500;
            ctl.tick(now);
        }
    }
    assert_eq!(ctl.session().milestone_count(), 2);
    let second = ctl.frontend().rewards.last().unwrap();
    assert_eq!(second.title, "DOUBLE BOUGIE!");
    assert_eq!(second.asset, "assets/Double Bougie Ramming.png");
}

#[test]
fn test_timeout_matches_wrong_answer() {
    let mut ctl = controller(1, Problem::new(1, 1), Problem::new(4, 5));
    let start = complete_study(&mut ctl, 0);
    ctl.submit(Submission::recall("9"), start + 100);
    ctl.submit(Submission::recall("9"), start + 200);
    assert_eq!(ctl.session().streak(), 2);
    ctl.drain_events();

    // Round armed at start + 200; the deadline is due 3000 ms later.
    ctl.tick(start + 3199);
    assert_eq!(ctl.state(), RoundState::RecallPresent);
    ctl.tick(start + 3200);

    assert_eq!(ctl.state(), RoundState::Correcting(CorrectionCause::RecallTimeout));
    assert_eq!(ctl.session().streak(), 0);
    assert_eq!(ctl.frontend().last_narration().unwrap().text, "4 plus 5 is 9");
    let events = ctl.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        Event::CorrectionStarted {
            cause: CorrectionCause::RecallTimeout,
            previous_streak: 2,
            ..
        }
    )));

    // An answer that arrives after the deadline is ignored.
    ctl.submit(Submission::recall("9"), start + 3300);
    assert_eq!(ctl.session().streak(), 0);

    ctl.tick(start + 5200);
    assert_eq!(ctl.state(), RoundState::RecallPresent);
}

#[test]
fn test_late_tick_still_times_out_before_late_answer() {
    let mut ctl = controller(1, Problem::new(1, 1), Problem::new(4, 5));
    let start = complete_study(&mut ctl, 0);
    // Host stalls past the deadline, then delivers an answer.
    ctl.tick(start + 4000);
    ctl.submit(Submission::recall("9"), start + 4000);
    assert_eq!(ctl.session().streak(), 0);
    assert_eq!(ctl.state(), RoundState::Correcting(CorrectionCause::RecallTimeout));

    // Follow-up timers are measured from each expiry, not from the late tick.
    ctl.tick(start + 10_000);
    assert_eq!(ctl.session().round(), 4);
    assert_eq!(ctl.state(), RoundState::RecallPresent);
    assert_eq!(ctl.next_due_ms(), Some(start + 13_000));
}

#[test]
fn test_answer_stamped_after_deadline_loses_without_tick() {
    let mut ctl = controller(1, Problem::new(1, 1), Problem::new(4, 5));
    let start = complete_study(&mut ctl, 0);
    ctl.drain_events();
    // Deadline due at start + 3000; the answer carries a later time and no tick ran.
    ctl.submit(Submission::recall("9"), start + 4000);

    assert_eq!(ctl.session().streak(), 0);
    assert_eq!(ctl.state(), RoundState::Correcting(CorrectionCause::RecallTimeout));
    let events = ctl.drain_events();
    assert_eq!(corrections(&events), vec![CorrectionCause::RecallTimeout]);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::SubmissionIgnored {
            reason: IgnoreReason::Locked,
            ..
        }
    )));
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::AnswerAccepted { .. })));
}

#[test]
fn test_only_one_deadline_is_ever_live() {
    let mut ctl = controller(1, Problem::new(1, 1), Problem::new(2, 3));
    let mut now = complete_study(&mut ctl, 0);
    for i in 0..50u64 {
        assert!(ctl.live_deadlines() <= 1);
        now += 700;
        ctl.tick(now);
        if i % 3 == 0 {
            ctl.submit(Submission::recall("5"), now);
        } else if i % 3 == 1 {
            ctl.submit(Submission::recall("6"), now);
        }
        assert!(ctl.live_deadlines() <= 1);
        let stats = ctl.timer_stats();
        assert_eq!(
            stats.scheduled,
            stats.cancelled + stats.fired + ctl.live_timers() as u64
        );
    }
}
