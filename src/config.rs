//! Trainer settings.
//!
//! Every component receives the part of the configuration it needs when it is
//! constructed. Values come from `TrainerConfig::default()`, optionally
//! replaced by a JSON file, and finally by command-line flags.

use crate::card::{Rarity, RatingField};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Quiz difficulty; controls band count for segment questions and
/// rounding granularity for numeric questions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Number of labeled bands (tertiles, quartiles, quintiles)
    pub fn segment_count(&self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 4,
            Difficulty::Hard => 5,
        }
    }

    /// Rounding step for numeric answers
    pub fn rounding_step(&self) -> f64 {
        match self {
            Difficulty::Easy => 2.0,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 0.5,
        }
    }
}

/// Which kind of quiz question to ask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QuizStyle {
    /// Pick the rounded rating value among several numbers
    #[default]
    Numeric,
    /// Classify the card into a labeled percentile band
    Segment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    pub commons_per_pack: usize,
    pub uncommons_per_pack: usize,
    pub picks_per_pack: usize,
    pub total_packs: usize,
    /// Minimum per-pack score needed to move on to the next pack
    pub advance_threshold: usize,
    pub rating_field: RatingField,
}

impl Default for DraftConfig {
    fn default() -> Self {
        DraftConfig {
            commons_per_pack: 10,
            uncommons_per_pack: 5,
            picks_per_pack: 5,
            total_packs: 3,
            advance_threshold: 4,
            rating_field: RatingField::OpeningHandWinRate,
        }
    }
}

impl DraftConfig {
    pub fn pack_size(&self) -> usize {
        self.commons_per_pack + self.uncommons_per_pack
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub rarities: Vec<Rarity>,
    pub rating_field: RatingField,
    pub num_questions: usize,
    /// Options per numeric question, including the correct one
    pub num_choices: usize,
    /// Chance that a numeric question includes an option one step from the answer
    pub near_miss_probability: f64,
    pub difficulty: Difficulty,
    pub style: QuizStyle,
    /// Pause between showing a card and showing its options
    pub answer_delay_ms: u64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        QuizConfig {
            rarities: vec![Rarity::Common, Rarity::Uncommon],
            rating_field: RatingField::OpeningHandWinRate,
            num_questions: 12,
            num_choices: 6,
            near_miss_probability: 0.67,
            difficulty: Difficulty::Medium,
            style: QuizStyle::Numeric,
            answer_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Three-letter set code whose ratings are loaded
    pub set_code: String,
    /// Directory holding `sets/<set_code>/...`
    pub data_dir: PathBuf,
    /// Rating exports older than this many days are refused
    pub stale_cutoff_days: i64,
    pub draft: DraftConfig,
    pub quiz: QuizConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            set_code: "eoe".to_string(),
            data_dir: PathBuf::from("resources"),
            stale_cutoff_days: 5,
            draft: DraftConfig::default(),
            quiz: QuizConfig::default(),
        }
    }
}

impl TrainerConfig {
    /// Load settings from a JSON file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: TrainerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let draft = &self.draft;
        if draft.picks_per_pack == 0 {
            return Err(ConfigError::Invalid("picks_per_pack must be at least 1".into()));
        }
        if draft.picks_per_pack > draft.pack_size() {
            return Err(ConfigError::Invalid(format!(
                "picks_per_pack ({}) exceeds the pack size ({})",
                draft.picks_per_pack,
                draft.pack_size()
            )));
        }
        if draft.advance_threshold > draft.picks_per_pack {
            return Err(ConfigError::Invalid(format!(
                "advance_threshold ({}) can never be reached with {} picks per pack",
                draft.advance_threshold, draft.picks_per_pack
            )));
        }

        let quiz = &self.quiz;
        if quiz.num_choices < 2 {
            return Err(ConfigError::Invalid("num_choices must be at least 2".into()));
        }
        // Options are answered by letter, a through z
        if quiz.num_choices > 26 {
            return Err(ConfigError::Invalid(format!(
                "num_choices ({}) exceeds the 26 answer letters",
                quiz.num_choices
            )));
        }
        if !(0.0..=1.0).contains(&quiz.near_miss_probability) {
            return Err(ConfigError::Invalid(
                "near_miss_probability must be within [0, 1]".into(),
            ));
        }
        if quiz.rarities.is_empty() {
            return Err(ConfigError::Invalid("at least one quiz rarity is required".into()));
        }
        if self.stale_cutoff_days < 0 {
            return Err(ConfigError::Invalid("stale_cutoff_days must not be negative".into()));
        }
        Ok(())
    }
}
