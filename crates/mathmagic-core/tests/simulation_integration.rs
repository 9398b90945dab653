//! Property tests over simulated sessions.
//!
//! Random learners (accuracy, answer speed, flaky speech) must never
//! leave more than one deadline armed, and timer bookkeeping must balance.

use mathmagic_core::simulation::run;
use mathmagic_core::{DrillConfig, LearnerProfile, SimulationScenario};
use proptest::prelude::*;

fn learner() -> impl Strategy<Value = LearnerProfile> {
    (0.0..=1.0f64, 0.0..=0.5f64, 0.0..=1.0f64, 0u64..6000, 0u64..7000).prop_map(
        |(accuracy, timeout_rate, narration_delivery, answer_delay_ms, narration_ms)| {
            LearnerProfile {
                accuracy,
                timeout_rate,
                narration_delivery,
                answer_delay_ms,
                narration_ms,
            }
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn timers_stay_balanced(seed in any::<u64>(), target in 1u32..6, learner in learner()) {
        let mut config = DrillConfig::default();
        config.study.target = target;
        let report = run(&SimulationScenario::new("prop", seed)
            .with_rounds(80)
            .with_config(config)
            .with_learner(learner))
            .unwrap();

        prop_assert!(report.max_live_deadlines <= 1);
        let stats = report.timer_stats;
        prop_assert_eq!(
            stats.scheduled,
            stats.cancelled + stats.fired + report.live_timers as u64
        );
        prop_assert_eq!(report.rounds_played, 80);
        prop_assert!(report.study_completions <= target);
        prop_assert!(report.best_streak >= report.final_streak);
        prop_assert_eq!(report.milestone_count as usize, report.rewards_presented);
    }

    #[test]
    fn milestones_never_exceed_streak_tens(seed in any::<u64>()) {
        let learner = LearnerProfile {
            accuracy: 0.97,
            timeout_rate: 0.0,
            ..LearnerProfile::default()
        };
        let scenario = SimulationScenario::new("steady", seed)
            .with_rounds(120)
            .with_learner(learner);
        let report = run(&scenario).unwrap();
        // Every reward needs ten fresh correct answers.
        let recall_rounds = 120 - u64::from(report.study_completions);
        prop_assert!(u64::from(report.milestone_count) * 10 <= recall_rounds);
    }
}

#[test]
fn test_default_scenario_completes_study_phase() {
    let report = run(&SimulationScenario::new("default", 2024).with_rounds(200)).unwrap();
    assert_eq!(report.study_completions, 20);
    assert!(report.corrections > 0);
    assert!(report.elapsed_ms > 0);
}
