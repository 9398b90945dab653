//! Keystroke capture and the answer form.
//!
//! The form only collects raw digits. Whether an entry is right is
//! decided by the round controller.

use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use mathmagic_core::Submission;
use std::time::Duration;

/// Polls the terminal for key presses.
pub struct InputHandler {
    poll_timeout: Duration,
}

impl InputHandler {
    /// 50 ms keeps timers responsive without spinning.
    pub fn new() -> Self {
        InputHandler {
            poll_timeout: Duration::from_millis(50),
        }
    }

    /// Wait up to the poll timeout for a key press.
    pub fn read_key(&self) -> std::io::Result<Option<KeyEvent>> {
        if !event::poll(self.poll_timeout)? {
            return Ok(None);
        }
        match event::read()? {
            event::Event::Key(key) if key.kind != KeyEventKind::Release => Ok(Some(key)),
            _ => Ok(None),
        }
    }

    /// Ctrl+C or Escape.
    pub fn is_exit(key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
            KeyCode::Esc => true,
            _ => false,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Closed,
    /// Addend, addend, sum.
    Study,
    Recall,
}

#[derive(Debug, Clone)]
pub struct AnswerForm {
    mode: FormMode,
    fields: [String; 3],
    focus: usize,
}

impl AnswerForm {
    pub fn new() -> Self {
        Self {
            mode: FormMode::Closed,
            fields: Default::default(),
            focus: 0,
        }
    }

    /// Clear all fields and switch to `mode`.
    pub fn open(&mut self, mode: FormMode) {
        self.mode = mode;
        self.fields = Default::default();
        self.focus = 0;
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn fields(&self) -> &[String] {
        match self.mode {
            FormMode::Closed => &[],
            FormMode::Study => &self.fields,
            FormMode::Recall => &self.fields[..1],
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    fn max_len(&self, field: usize) -> usize {
        match (self.mode, field) {
            (FormMode::Study, 0 | 1) => 1,
            _ => 2,
        }
    }

    /// Apply one key press. Returns a submission when Enter is pressed.
    ///
    /// Addend fields move focus on after one digit, as a learner types the
    /// fact left to right.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<Submission> {
        let count = self.fields().len();
        if count == 0 {
            return None;
        }
        match key.code {
            KeyCode::Enter => return Some(self.submission()),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let max = self.max_len(self.focus);
                let field = &mut self.fields[self.focus];
                if field.len() < max {
                    field.push(c);
                }
                if self.fields[self.focus].len() >= max && self.focus + 1 < count {
                    self.focus += 1;
                }
            }
            KeyCode::Backspace => {
                if self.fields[self.focus].pop().is_none() && self.focus > 0 {
                    self.focus -= 1;
                    self.fields[self.focus].pop();
                }
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char(' ' | '+' | '=') => {
                if self.focus + 1 < count {
                    self.focus += 1;
                }
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.focus = self.focus.saturating_sub(1);
            }
            _ => {}
        }
        None
    }

    fn submission(&self) -> Submission {
        match self.mode {
            FormMode::Study => Submission::study(
                self.fields[0].clone(),
                self.fields[1].clone(),
                self.fields[2].clone(),
            ),
            _ => Submission::recall(self.fields[0].clone()),
        }
    }
}

impl Default for AnswerForm {
    fn default() -> Self {
        Self::new()
    }
}
