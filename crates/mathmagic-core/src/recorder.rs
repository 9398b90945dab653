//! Headless frontend that records every collaborator call.
//!
//! Used by the simulator and by tests that drive the controller on
//! virtual time.

use crate::frontend::{
    Narration, NarrationKind, Narrator, Renderer, RewardPresentation, RewardPresenter,
    StatsDisplay, View,
};
use crate::session::Stats;

#[derive(Debug, Clone, Default)]
pub struct RecordingFrontend {
    pub views: Vec<View>,
    pub narrations: Vec<Narration>,
    pub rewards: Vec<RewardPresentation>,
    pub stats: Vec<Stats>,
}

impl RecordingFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_view(&self) -> Option<&View> {
        self.views.last()
    }

    pub fn last_narration(&self) -> Option<&Narration> {
        self.narrations.last()
    }

    pub fn last_stats(&self) -> Option<&Stats> {
        self.stats.last()
    }

    pub fn narrations_of(&self, kind: NarrationKind) -> impl Iterator<Item = &Narration> {
        self.narrations.iter().filter(move |n| n.kind == kind)
    }
}

impl Renderer for RecordingFrontend {
    fn render(&mut self, view: &View) {
        self.views.push(view.clone());
    }
}

impl Narrator for RecordingFrontend {
    fn narrate(&mut self, request: &Narration) {
        self.narrations.push(request.clone());
    }
}

impl RewardPresenter for RecordingFrontend {
    fn present(&mut self, reward: &RewardPresentation) {
        self.rewards.push(reward.clone());
    }
}

impl StatsDisplay for RecordingFrontend {
    fn show_stats(&mut self, stats: &Stats) {
        self.stats.push(*stats);
    }
}
