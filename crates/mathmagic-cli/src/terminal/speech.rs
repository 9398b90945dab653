//! Narration through an external text-to-speech program.
//!
//! Utterances play one at a time in request order. Without a configured
//! program each utterance is shown as a caption for an estimated speaking
//! time instead.

use std::collections::VecDeque;
use std::process::{Child, Command, Stdio};

use mathmagic_core::config::NarrationConfig;
use mathmagic_core::{Narration, NarrationId};

/// Speaking time per word at rate 1.0.
const CAPTION_MS_PER_WORD: f64 = 350.0;
const CAPTION_MIN_MS: u64 = 800;

enum Playback {
    Process(Child),
    Caption { until_ms: u64 },
}

struct Utterance {
    id: NarrationId,
    text: String,
    playback: Playback,
}

pub struct Speech {
    command: Option<String>,
    args: Vec<String>,
    rate: f64,
    queue: VecDeque<Narration>,
    current: Option<Utterance>,
}

impl Speech {
    pub fn from_config(cfg: &NarrationConfig) -> Self {
        let args = cfg
            .args
            .iter()
            .map(|a| a.replace("{lang}", &cfg.lang).replace("{rate}", &cfg.rate.to_string()))
            .collect();
        Self {
            command: cfg.command.clone(),
            args,
            rate: cfg.rate,
            queue: VecDeque::new(),
            current: None,
        }
    }

    pub fn enqueue(&mut self, narration: Narration) {
        self.queue.push_back(narration);
    }

    /// Text of the utterance playing now.
    pub fn caption(&self) -> Option<&str> {
        self.current.as_ref().map(|u| u.text.as_str())
    }

    pub fn current_id(&self) -> Option<NarrationId> {
        self.current.as_ref().map(|u| u.id)
    }

    /// Advance playback. Returns the ids of utterances that finished.
    ///
    /// An utterance whose program fails to start never reports completion.
    pub fn poll(&mut self, now_ms: u64) -> Vec<NarrationId> {
        let mut finished = Vec::new();
        loop {
            if let Some(current) = self.current.as_mut() {
                if !is_done(&mut current.playback, now_ms) {
                    break;
                }
                finished.push(current.id);
                self.current = None;
            }
            let Some(next) = self.queue.pop_front() else {
                break;
            };
            self.current = self.start(next, now_ms);
        }
        finished
    }

    fn start(&self, narration: Narration, now_ms: u64) -> Option<Utterance> {
        let playback = match &self.command {
            Some(program) => {
                let spawned = Command::new(program)
                    .args(&self.args)
                    .arg(&narration.text)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn();
                match spawned {
                    Ok(child) => Playback::Process(child),
                    Err(e) => {
                        tracing::warn!(program = %program, error = %e, "speech program failed to start");
                        return None;
                    }
                }
            }
            None => Playback::Caption {
                until_ms: now_ms + caption_ms(&narration.text, self.rate),
            },
        };
        tracing::debug!(id = narration.id.0, kind = ?narration.kind, "narrating");
        Some(Utterance {
            id: narration.id,
            text: narration.text,
            playback,
        })
    }
}

impl Drop for Speech {
    fn drop(&mut self) {
        if let Some(Utterance {
            playback: Playback::Process(child),
            ..
        }) = self.current.as_mut()
        {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn is_done(playback: &mut Playback, now_ms: u64) -> bool {
    match playback {
        Playback::Caption { until_ms } => now_ms >= *until_ms,
        Playback::Process(child) => match child.try_wait() {
            Ok(status) => status.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "lost track of speech program");
                true
            }
        },
    }
}

/// Estimated speaking time for caption-only narration.
fn caption_ms(text: &str, rate: f64) -> u64 {
    let words = text.split_whitespace().count() as f64;
    let ms = words * CAPTION_MS_PER_WORD / rate.max(0.1);
    (ms as u64).max(CAPTION_MIN_MS)
}
