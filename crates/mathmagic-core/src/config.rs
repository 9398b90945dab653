//! TOML-based drill configuration.
//!
//! Holds the tunable constants of a session:
//! - Study phase length and narration fallbacks
//! - Recall deadline and hard-problem probability
//! - Correction grace delay and reward duration
//! - Block rendering scale
//! - Speech command used by the terminal frontend
//!
//! Nothing about learner progress is stored here.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, CoreError, Result, ValidationError};

/// Study phase configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Correct reconstructions required before recall begins.
    #[serde(default = "default_study_target")]
    pub target: u32,
    /// Pause between narration completion and the input fields appearing.
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    /// Upper bound on waiting for narration before opening input anyway.
    #[serde(default = "default_narration_safety_ms")]
    pub narration_safety_ms: u64,
}

/// Recall phase configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallConfig {
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
    /// Probability of drawing a "hard" problem (sum 16..=20).
    #[serde(default = "default_hard_probability")]
    pub hard_probability: f64,
}

/// Delays that follow a round outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause after showing a corrected answer, measured from the start of the correction.
    #[serde(default = "default_grace_delay_ms")]
    pub grace_delay_ms: u64,
    #[serde(default = "default_reward_duration_ms")]
    pub reward_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Bar height per unit of an addend.
    #[serde(default = "default_unit_px")]
    pub unit_px: u32,
}

/// Speech output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// External text-to-speech program (for example `espeak`). Captions only when unset.
    #[serde(default)]
    pub command: Option<String>,
    /// Extra arguments placed before the spoken text. `{lang}` and `{rate}` are substituted.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_rate")]
    pub rate: f64,
}

/// Drill configuration.
///
/// Serialized to/from TOML. Every field has a default so a partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillConfig {
    /// Fixed RNG seed for reproducible sessions.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub study: StudyConfig,
    #[serde(default)]
    pub recall: RecallConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub narration: NarrationConfig,
}

// Default functions
fn default_study_target() -> u32 {
    20
}
fn default_reveal_delay_ms() -> u64 {
    1000
}
fn default_narration_safety_ms() -> u64 {
    5000
}
fn default_deadline_ms() -> u64 {
    3000
}
fn default_hard_probability() -> f64 {
    0.2
}
fn default_grace_delay_ms() -> u64 {
    2000
}
fn default_reward_duration_ms() -> u64 {
    3500
}
fn default_unit_px() -> u32 {
    50
}
fn default_lang() -> String {
    "en-AU".into()
}
fn default_rate() -> f64 {
    0.9
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            target: default_study_target(),
            reveal_delay_ms: default_reveal_delay_ms(),
            narration_safety_ms: default_narration_safety_ms(),
        }
    }
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
            hard_probability: default_hard_probability(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            grace_delay_ms: default_grace_delay_ms(),
            reward_duration_ms: default_reward_duration_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            unit_px: default_unit_px(),
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            lang: default_lang(),
            rate: default_rate(),
        }
    }
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            seed: None,
            study: StudyConfig::default(),
            recall: RecallConfig::default(),
            timing: TimingConfig::default(),
            display: DisplayConfig::default(),
            narration: NarrationConfig::default(),
        }
    }
}

impl DrillConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: DrillConfig = toml::from_str(content).map_err(ConfigError::from)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or
    /// holds values that fail [`DrillConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::from)?)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Result<String> {
        let json = serde_json::to_value(self).map_err(|e| CoreError::Custom(e.to_string()))?;
        let val = Self::get_json_value_by_path(&json, key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        Ok(match val {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Reject values the round controller cannot run with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.study.target == 0 {
            return Err(ValidationError::InvalidValue {
                field: "study.target".into(),
                message: "at least one study completion is required".into(),
            });
        }

        let durations = [
            ("study.narration_safety_ms", self.study.narration_safety_ms),
            ("recall.deadline_ms", self.recall.deadline_ms),
            ("timing.grace_delay_ms", self.timing.grace_delay_ms),
            ("timing.reward_duration_ms", self.timing.reward_duration_ms),
        ];
        for (field, value) in durations {
            if value == 0 {
                return Err(ValidationError::ZeroDuration {
                    field: field.into(),
                });
            }
        }

        let p = self.recall.hard_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ValidationError::OutOfRange {
                field: "recall.hard_probability".into(),
                value: p,
                min: 0.0,
                max: 1.0,
            });
        }

        if self.narration.rate <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "narration.rate".into(),
                message: "speech rate must be positive".into(),
            });
        }

        Ok(())
    }
}
