//! Collaborator seams: rendering, narration, rewards, stats.
//!
//! Every call is fire-and-forget. Narration and reward completion come
//! back through [`RoundController::narration_finished`] and
//! [`RoundController::presentation_finished`], and the controller never
//! waits on either without a fallback timer.
//!
//! [`RoundController::narration_finished`]: crate::RoundController::narration_finished
//! [`RoundController::presentation_finished`]: crate::RoundController::presentation_finished

use serde::{Deserialize, Serialize};

use crate::problem::Problem;
use crate::session::Stats;

/// Two stacked bars whose heights are linear in the addends.
///
/// The lower bar is addend A; the upper bar sits on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStack {
    pub lower_px: u32,
    pub upper_px: u32,
}

impl BlockStack {
    pub fn for_problem(problem: &Problem, unit_px: u32) -> Self {
        Self {
            lower_px: problem.addend_a.saturating_mul(unit_px),
            upper_px: problem.addend_b.saturating_mul(unit_px),
        }
    }

    /// Offset of the upper bar's base from the bottom of the stack.
    pub fn upper_offset_px(&self) -> u32 {
        self.lower_px
    }
}

/// What the problem area should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    /// Waiting for the first gesture before any audio may play.
    Idle,
    /// Static equation `a + b = sum`, narrated during study.
    Fact { problem: Problem, stack: BlockStack },
    /// Three blanks: both addends and the sum.
    StudyPrompt { stack: BlockStack },
    /// `a + b = _` with the deadline running.
    RecallPrompt { problem: Problem, stack: BlockStack },
    /// The correct equation after a miss.
    Correction { problem: Problem, stack: BlockStack },
    /// Milestone celebration over the answered equation.
    Reward {
        problem: Problem,
        stack: BlockStack,
        streak: u32,
        title: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NarrationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationKind {
    Fact,
    Correction,
    Celebration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    pub id: NarrationId,
    pub kind: NarrationKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresentationId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPresentation {
    pub id: PresentationId,
    pub streak: u32,
    pub title: String,
    pub asset: String,
}

pub trait Renderer {
    fn render(&mut self, view: &View);
}

/// Text-to-speech gateway. Completion may never be reported.
pub trait Narrator {
    fn narrate(&mut self, request: &Narration);
}

/// Celebration overlay, confetti and chime.
pub trait RewardPresenter {
    fn present(&mut self, reward: &RewardPresentation);
}

/// Read-only consumer of counter updates.
pub trait StatsDisplay {
    fn show_stats(&mut self, stats: &Stats);
}

/// Everything the round controller drives.
pub trait Frontend: Renderer + Narrator + RewardPresenter + StatsDisplay {}

impl<T: Renderer + Narrator + RewardPresenter + StatsDisplay> Frontend for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_linearly_with_addends() {
        let stack = BlockStack::for_problem(&Problem::new(3, 4), 50);
        assert_eq!(stack.lower_px, 150);
        assert_eq!(stack.upper_px, 200);
        assert_eq!(stack.upper_offset_px(), 150);
    }

    #[test]
    fn view_serializes_with_tag() {
        let json = serde_json::to_value(View::Idle).unwrap();
        assert_eq!(json["view"], "idle");
    }
}
