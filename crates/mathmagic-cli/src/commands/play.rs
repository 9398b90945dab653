use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use crossterm::terminal;
use mathmagic_core::{DrillConfig, RoundController};

use crate::logging;
use crate::terminal::{InputHandler, TerminalFrontend};

#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// Configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Fixed seed for a reproducible problem sequence
    #[arg(long)]
    pub seed: Option<u64>,
    /// Override the recall deadline
    #[arg(long)]
    pub deadline_ms: Option<u64>,
    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Restores the terminal even when the loop exits with an error.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing(args.log_file.as_deref())?;

    let mut config = DrillConfig::load_or_default(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(ms) = args.deadline_ms {
        config.recall.deadline_ms = ms;
    }
    config.validate()?;
    tracing::info!(seed = ?config.seed, deadline_ms = config.recall.deadline_ms, "starting drill");

    let frontend = TerminalFrontend::new(&config);
    let mut ctl = RoundController::with_random_problems(config, frontend);

    let _raw = RawModeGuard::enter()?;
    ctl.frontend_mut().enter()?;
    let result = game_loop(&mut ctl);
    ctl.frontend_mut().leave()?;

    let session = ctl.session();
    tracing::info!(
        rounds = session.round(),
        best_streak = session.best_streak(),
        milestones = session.milestone_count(),
        "drill finished"
    );
    result
}

fn game_loop(
    ctl: &mut RoundController<TerminalFrontend>,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = InputHandler::new();
    let clock = Instant::now();
    let now = || clock.elapsed().as_millis() as u64;

    ctl.start(now());
    loop {
        let t = now();
        for id in ctl.frontend_mut().poll_narrations(t) {
            ctl.narration_finished(id, t);
        }
        for id in ctl.frontend_mut().poll_presentations() {
            ctl.presentation_finished(id, t);
        }
        ctl.tick(t);
        log_events(ctl);
        ctl.frontend_mut().redraw();

        let Some(key) = input.read_key()? else {
            continue;
        };
        if InputHandler::is_exit(&key) {
            return Ok(());
        }
        let t = now();
        ctl.interact(t);
        if let Some(submission) = ctl.frontend_mut().handle_key(&key) {
            ctl.submit(submission, t);
        }
        log_events(ctl);
    }
}

fn log_events(ctl: &mut RoundController<TerminalFrontend>) {
    for event in ctl.drain_events() {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::debug!(event = %json, "drill event"),
            Err(e) => tracing::warn!(error = %e, "unserializable event"),
        }
    }
}
