//! # Math Magic Core Library
//!
//! This library provides the game logic for the Math Magic addition drill.
//! A learner first studies narrated addition facts by retyping them, then
//! recalls sums against a deadline while building a streak. Every host
//! (the terminal CLI, the headless simulator, tests) drives the same
//! controller.
//!
//! ## Architecture
//!
//! - **Round Controller**: A clock-driven state machine. The host passes a
//!   monotonic millisecond clock to every call and invokes `tick()` so
//!   expired timers fire
//! - **Collaborators**: Rendering, narration, rewards and stats are traits
//!   the host implements; completion reports come back as method calls
//! - **Timers**: Cancellable one-shot timers, each tagged with the round
//!   that armed it
//! - **Configuration**: TOML-based drill settings
//!
//! ## Key Components
//!
//! - [`RoundController`]: Core round state machine
//! - [`Session`]: Streak and study counters
//! - [`RandomProblems`]: Phase-aware problem generator
//! - [`DrillConfig`]: Drill configuration management
//! - [`Frontend`]: Trait bundle a host implements

pub mod answer;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod frontend;
pub mod milestone;
pub mod problem;
pub mod recorder;
pub mod session;
pub mod simulation;
pub mod timer;

pub use answer::Submission;
pub use config::DrillConfig;
pub use controller::{RoundController, RoundState};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{CorrectionCause, Event, IgnoreReason, RevealTrigger};
pub use frontend::{
    BlockStack, Frontend, Narration, NarrationId, NarrationKind, Narrator, PresentationId,
    Renderer, RewardPresentation, RewardPresenter, StatsDisplay, View,
};
pub use milestone::{milestone_for, Milestone, RewardAsset};
pub use problem::{Difficulty, Phase, Problem, ProblemSource, RandomProblems};
pub use recorder::RecordingFrontend;
pub use session::{Session, Stats};
pub use simulation::{LearnerProfile, SimulationReport, SimulationScenario};
pub use timer::{TimerHandle, TimerQueue, TimerStats};
