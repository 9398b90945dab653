use std::path::PathBuf;

use clap::Args;
use mathmagic_core::simulation;
use mathmagic_core::{DrillConfig, LearnerProfile, SimulationScenario};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(long, default_value_t = 1)]
    pub seed: u64,
    /// Rounds to play
    #[arg(long, default_value_t = 100)]
    pub rounds: u64,
    /// Probability that the learner answers correctly
    #[arg(long, default_value_t = 0.9)]
    pub accuracy: f64,
    /// Probability that the learner never answers a recall prompt
    #[arg(long, default_value_t = 0.05)]
    pub timeout_rate: f64,
    /// Configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = DrillConfig::load_or_default(args.config.as_deref())?;
    let learner = LearnerProfile {
        accuracy: args.accuracy,
        timeout_rate: args.timeout_rate,
        ..LearnerProfile::default()
    };
    let scenario = SimulationScenario::new("cli", args.seed)
        .with_rounds(args.rounds)
        .with_learner(learner)
        .with_config(config);

    let report = simulation::run(&scenario)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
