//! Terminal drawing with crossterm.
//!
//! The screen is redrawn whole on every change:
//! - Counter line at the top
//! - Stacked addend bars on the left, one row per unit
//! - Equation, prompt fields or reward title on the right
//! - Narration caption and key help at the bottom

use std::io::{stdout, Stdout, Write};

use crossterm::{
    cursor, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use mathmagic_core::{BlockStack, Phase, Problem, RewardPresentation, Stats, View};
use rand::Rng;

use super::input::{AnswerForm, FormMode};

const STACK_COL: u16 = 2;
const STACK_BASE_ROW: u16 = 22;
const EQUATION_COL: u16 = 14;
const EQUATION_ROW: u16 = 12;
const CAPTION_ROW: u16 = 24;
const FOOTER_ROW: u16 = 26;
const CONFETTI_PIECES: usize = 60;
const CONFETTI_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
];

/// Everything one redraw needs.
pub struct Frame<'a> {
    pub view: &'a View,
    pub stats: Option<&'a Stats>,
    pub form: &'a AnswerForm,
    pub caption: Option<&'a str>,
    pub reward: Option<&'a RewardPresentation>,
    pub confetti: &'a [Piece],
}

/// One confetti piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    x: u16,
    y: u16,
    color: Color,
    glyph: char,
}

/// Random confetti burst covering the current terminal.
pub fn scatter<R: Rng + ?Sized>(rng: &mut R) -> Vec<Piece> {
    let (cols, rows) = terminal::size().unwrap_or((80, 28));
    (0..CONFETTI_PIECES)
        .map(|_| Piece {
            x: rng.gen_range(0..cols.max(1)),
            y: rng.gen_range(1..rows.max(2)),
            color: CONFETTI_COLORS[rng.gen_range(0..CONFETTI_COLORS.len())],
            glyph: ['*', '+', 'o', '~'][rng.gen_range(0..4)],
        })
        .collect()
}

pub struct Screen {
    out: Stdout,
    unit_px: u32,
}

impl Screen {
    pub fn new(unit_px: u32) -> Self {
        Self {
            out: stdout(),
            unit_px: unit_px.max(1),
        }
    }

    pub fn enter(&mut self) -> std::io::Result<()> {
        queue!(self.out, EnterAlternateScreen, cursor::Hide)?;
        self.out.flush()
    }

    pub fn leave(&mut self) -> std::io::Result<()> {
        queue!(self.out, ResetColor, cursor::Show, LeaveAlternateScreen)?;
        self.out.flush()
    }

    pub fn draw(&mut self, frame: &Frame<'_>) -> std::io::Result<()> {
        queue!(
            self.out,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        if let Some(stats) = frame.stats {
            self.draw_stats(stats)?;
        }

        match frame.view {
            View::Idle => {
                queue!(
                    self.out,
                    cursor::MoveTo(EQUATION_COL, EQUATION_ROW),
                    SetForegroundColor(Color::Cyan),
                    Print("Press any key to start"),
                    ResetColor
                )?;
            }
            View::Fact { problem, stack } => {
                self.draw_stack(stack)?;
                self.draw_equation(problem, Color::White)?;
            }
            View::StudyPrompt { stack } => {
                self.draw_stack(stack)?;
                self.draw_study_fields(frame.form)?;
            }
            View::RecallPrompt { problem, stack } => {
                self.draw_stack(stack)?;
                self.draw_recall_prompt(problem, frame.form)?;
            }
            View::Correction { problem, stack } => {
                self.draw_stack(stack)?;
                self.draw_equation(problem, Color::Red)?;
            }
            View::Reward {
                problem,
                stack,
                streak,
                title,
            } => {
                self.draw_stack(stack)?;
                self.draw_equation(problem, Color::Green)?;
                queue!(
                    self.out,
                    cursor::MoveTo(EQUATION_COL, EQUATION_ROW - 4),
                    SetForegroundColor(Color::Magenta),
                    SetAttribute(Attribute::Bold),
                    Print(title),
                    SetAttribute(Attribute::Reset),
                    ResetColor,
                    cursor::MoveTo(EQUATION_COL, EQUATION_ROW - 3),
                    Print(format!("{streak} in a row!")),
                )?;
                if let Some(reward) = frame.reward {
                    queue!(
                        self.out,
                        cursor::MoveTo(EQUATION_COL, EQUATION_ROW + 2),
                        SetForegroundColor(Color::DarkGrey),
                        Print(&reward.asset),
                        ResetColor
                    )?;
                }
            }
        }

        for piece in frame.confetti {
            queue!(
                self.out,
                cursor::MoveTo(piece.x, piece.y),
                SetForegroundColor(piece.color),
                Print(piece.glyph)
            )?;
        }
        queue!(self.out, ResetColor)?;

        if let Some(text) = frame.caption {
            queue!(
                self.out,
                cursor::MoveTo(STACK_COL, CAPTION_ROW),
                SetForegroundColor(Color::Cyan),
                SetAttribute(Attribute::Italic),
                Print(format!("\u{266a} {text}")),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
        }
        queue!(
            self.out,
            cursor::MoveTo(STACK_COL, FOOTER_ROW),
            SetForegroundColor(Color::DarkGrey),
            Print("Enter: check   Tab: next box   Esc: quit"),
            ResetColor
        )?;
        self.out.flush()
    }

    /// Terminal bell.
    pub fn chime(&mut self) -> std::io::Result<()> {
        queue!(self.out, Print('\u{7}'))?;
        self.out.flush()
    }

    fn draw_stats(&mut self, stats: &Stats) -> std::io::Result<()> {
        let phase = match stats.phase {
            Phase::Study => format!(
                "Practice {}/{}",
                stats.study_completions, stats.study_target
            ),
            Phase::Recall => "Challenge".to_string(),
        };
        queue!(
            self.out,
            cursor::MoveTo(STACK_COL, 0),
            SetForegroundColor(Color::Magenta),
            Print(phase),
            ResetColor,
            Print(format!(
                "   Streak: {}   Bougies: {}",
                stats.streak, stats.milestone_count
            ))
        )
    }

    fn draw_stack(&mut self, stack: &BlockStack) -> std::io::Result<()> {
        let lower = rows_for(stack.lower_px, self.unit_px);
        let upper = rows_for(stack.upper_px, self.unit_px);
        let offset = rows_for(stack.upper_offset_px(), self.unit_px);
        for row in 0..lower {
            self.bar_cell(STACK_BASE_ROW - row, Color::Blue)?;
        }
        for row in 0..upper {
            self.bar_cell(STACK_BASE_ROW - offset - row, Color::Yellow)?;
        }
        Ok(())
    }

    fn bar_cell(&mut self, row: u16, color: Color) -> std::io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(STACK_COL, row),
            SetForegroundColor(color),
            Print("\u{2588}\u{2588}\u{2588}\u{2588}"),
            ResetColor
        )
    }

    fn draw_equation(&mut self, problem: &Problem, color: Color) -> std::io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(EQUATION_COL, EQUATION_ROW),
            SetForegroundColor(color),
            SetAttribute(Attribute::Bold),
            Print(format!(
                "{} + {} = {}",
                problem.addend_a,
                problem.addend_b,
                problem.sum()
            )),
            SetAttribute(Attribute::Reset),
            ResetColor
        )
    }

    fn draw_study_fields(&mut self, form: &AnswerForm) -> std::io::Result<()> {
        if form.mode() != FormMode::Study {
            return Ok(());
        }
        queue!(self.out, cursor::MoveTo(EQUATION_COL, EQUATION_ROW))?;
        let fields = form.fields();
        for (i, text) in fields.iter().enumerate() {
            let width = if i < 2 { 1 } else { 2 };
            self.field(text, width, form.focus() == i)?;
            match i {
                0 => queue!(self.out, Print(" + "))?,
                1 => queue!(self.out, Print(" = "))?,
                _ => {}
            }
        }
        Ok(())
    }

    fn draw_recall_prompt(&mut self, problem: &Problem, form: &AnswerForm) -> std::io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(EQUATION_COL, EQUATION_ROW),
            SetAttribute(Attribute::Bold),
            Print(format!("{} + {} = ", problem.addend_a, problem.addend_b)),
            SetAttribute(Attribute::Reset)
        )?;
        let answer = form.fields().first().map(String::as_str).unwrap_or("");
        self.field(answer, 2, true)
    }

    fn field(&mut self, text: &str, width: usize, focused: bool) -> std::io::Result<()> {
        let color = if focused { Color::Green } else { Color::DarkGrey };
        queue!(
            self.out,
            SetForegroundColor(color),
            Print(format!("[{text:<width$}]")),
            ResetColor
        )
    }
}

/// Terminal rows for a bar of `px` pixels, capped to fit the screen.
fn rows_for(px: u32, unit_px: u32) -> u16 {
    (px / unit_px).min(u32::from(STACK_BASE_ROW / 2)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_row_per_unit() {
        let stack = BlockStack::for_problem(&Problem::new(3, 9), 50);
        assert_eq!(rows_for(stack.lower_px, 50), 3);
        assert_eq!(rows_for(stack.upper_px, 50), 9);
        assert_eq!(rows_for(stack.upper_offset_px(), 50), 3);
    }

    #[test]
    fn confetti_stays_on_screen() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let pieces = scatter(&mut rng);
        assert_eq!(pieces.len(), CONFETTI_PIECES);
        // Row 0 holds the counters.
        assert!(pieces.iter().all(|p| p.y >= 1));
    }

    #[test]
    fn tall_bars_are_capped() {
        assert_eq!(rows_for(5000, 50), 11);
    }
}
