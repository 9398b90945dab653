//! Terminal frontend for the round controller.
//!
//! Collaborator calls only update local state and mark the screen dirty;
//! the play loop redraws and polls speech once per iteration. Drawing
//! errors are logged and otherwise ignored.

mod display;
mod input;
mod speech;

pub use input::InputHandler;

use display::{Frame, Piece, Screen};
use input::{AnswerForm, FormMode};
use speech::Speech;

use mathmagic_core::{
    DrillConfig, Narration, NarrationId, Narrator, PresentationId, Renderer, RewardPresentation,
    RewardPresenter, Stats, StatsDisplay, Submission, View,
};

use crossterm::event::KeyEvent;

pub struct TerminalFrontend {
    screen: Screen,
    speech: Speech,
    form: AnswerForm,
    view: View,
    stats: Option<Stats>,
    reward: Option<RewardPresentation>,
    confetti: Vec<Piece>,
    finished_presentations: Vec<PresentationId>,
    dirty: bool,
}

impl TerminalFrontend {
    pub fn new(config: &DrillConfig) -> Self {
        Self {
            screen: Screen::new(config.display.unit_px),
            speech: Speech::from_config(&config.narration),
            form: AnswerForm::new(),
            view: View::Idle,
            stats: None,
            reward: None,
            confetti: Vec::new(),
            finished_presentations: Vec::new(),
            dirty: true,
        }
    }

    pub fn enter(&mut self) -> std::io::Result<()> {
        self.screen.enter()
    }

    pub fn leave(&mut self) -> std::io::Result<()> {
        self.screen.leave()
    }

    /// Feed a key press to the open answer form.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<Submission> {
        self.dirty = true;
        self.form.handle_key(key)
    }

    /// Narrations that finished since the last poll.
    pub fn poll_narrations(&mut self, now_ms: u64) -> Vec<NarrationId> {
        let before = self.speech.current_id();
        let finished = self.speech.poll(now_ms);
        if self.speech.current_id() != before {
            self.dirty = true;
        }
        finished
    }

    pub fn poll_presentations(&mut self) -> Vec<PresentationId> {
        std::mem::take(&mut self.finished_presentations)
    }

    /// Redraw if anything changed since the last call.
    pub fn redraw(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let frame = Frame {
            view: &self.view,
            stats: self.stats.as_ref(),
            form: &self.form,
            caption: self.speech.caption(),
            reward: self.reward.as_ref(),
            confetti: &self.confetti,
        };
        if let Err(e) = self.screen.draw(&frame) {
            tracing::warn!(error = %e, "failed to draw frame");
        }
    }
}

impl Renderer for TerminalFrontend {
    fn render(&mut self, view: &View) {
        let mode = match view {
            View::StudyPrompt { .. } => FormMode::Study,
            View::RecallPrompt { .. } => FormMode::Recall,
            _ => FormMode::Closed,
        };
        self.form.open(mode);
        if !matches!(view, View::Reward { .. }) {
            self.reward = None;
            self.confetti.clear();
        }
        self.view = view.clone();
        self.dirty = true;
    }
}

impl Narrator for TerminalFrontend {
    fn narrate(&mut self, request: &Narration) {
        self.speech.enqueue(request.clone());
        self.dirty = true;
    }
}

impl RewardPresenter for TerminalFrontend {
    fn present(&mut self, reward: &RewardPresentation) {
        self.reward = Some(reward.clone());
        self.confetti = display::scatter(&mut rand::thread_rng());
        self.dirty = true;
        if let Err(e) = self.screen.chime() {
            tracing::warn!(error = %e, "failed to ring chime");
        }
        // The burst is static, so the presentation completes immediately.
        self.finished_presentations.push(reward.id);
    }
}

impl StatsDisplay for TerminalFrontend {
    fn show_stats(&mut self, stats: &Stats) {
        self.stats = Some(*stats);
        self.dirty = true;
    }
}
