//! Segment classification: "is this card bad, okay, good or great?"
//!
//! The rating distribution of the quiz pool is cut into `k` percentile bands.
//! Each band option carries its exclusive upper threshold, so the correct band
//! for a value is always the first option whose threshold exceeds it.

use crate::card::{CardRecord, RatingField};
use crate::config::QuizConfig;
use crate::quiz::question::{AnswerOption, Question, QuestionStrategy};
use crate::quiz::{sample_cards, QuizError};
use crate::rng::TrainerRng;
use std::collections::BTreeSet;
use tracing::debug;

/// Band names from worst to best
pub fn segment_labels(count: usize) -> Vec<String> {
    let fixed: &[&str] = match count {
        3 => &["bad", "okay", "good"],
        4 => &["bad", "okay", "good", "great"],
        5 => &["awful", "bad", "okay", "good", "great"],
        _ => &[],
    };
    if fixed.is_empty() {
        (1..=count).map(|i| format!("band {}", i)).collect()
    } else {
        fixed.iter().map(|s| s.to_string()).collect()
    }
}

/// The `count - 1` cut points splitting `values` into `count` equally sized groups
pub fn percentile_thresholds(values: &[f64], count: usize) -> Vec<f64> {
    if values.is_empty() || count < 2 {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    (1..count).map(|i| sorted[i * n / count]).collect()
}

/// Index of the band holding `value`: the first threshold it is below, or the
/// top band when it reaches the last threshold
pub fn segment_index(thresholds: &[f64], value: f64) -> usize {
    thresholds
        .iter()
        .position(|t| value < *t)
        .unwrap_or(thresholds.len())
}

fn correct_band(options: &[AnswerOption], true_value: f64) -> BTreeSet<usize> {
    // The top option always carries an infinite threshold, so a band is always found
    options
        .iter()
        .position(|o| true_value < o.value)
        .into_iter()
        .collect()
}

#[derive(Debug, Clone)]
pub struct SegmentStrategy {
    field: RatingField,
    num_questions: usize,
    band_count: usize,
    thresholds: Option<Vec<f64>>,
}

impl SegmentStrategy {
    pub fn new(config: &QuizConfig) -> Self {
        SegmentStrategy {
            field: config.rating_field,
            num_questions: config.num_questions,
            band_count: config.difficulty.segment_count(),
            thresholds: None,
        }
    }

    /// Use fixed cut points instead of the pool's percentiles
    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.band_count = thresholds.len() + 1;
        self.thresholds = Some(thresholds);
        self
    }

    pub fn band_count(&self) -> usize {
        self.band_count
    }

    /// Cut points for `pool`: the fixed ones if configured, otherwise its percentiles
    pub fn thresholds_for(&self, pool: &[CardRecord]) -> Vec<f64> {
        match &self.thresholds {
            Some(fixed) => fixed.clone(),
            None => {
                let values: Vec<f64> = pool.iter().filter_map(|c| c.rating(self.field)).collect();
                percentile_thresholds(&values, self.band_count)
            }
        }
    }

    pub fn make_question(&self, card: CardRecord, true_value: f64, thresholds: &[f64]) -> Question {
        let upper_bounds = thresholds.iter().copied().chain(std::iter::once(f64::INFINITY));
        let options: Vec<AnswerOption> = segment_labels(thresholds.len() + 1)
            .into_iter()
            .zip(upper_bounds)
            .map(|(label, upper)| AnswerOption::new(label, upper))
            .collect();

        let correct = correct_band(&options, true_value);
        Question::new(card, true_value, options, correct)
    }
}

impl QuestionStrategy for SegmentStrategy {
    fn generate(
        &self,
        pool: &[CardRecord],
        rng: &mut TrainerRng,
    ) -> Result<Vec<Question>, QuizError> {
        let sampled = sample_cards(pool, self.field, self.num_questions, rng)?;
        let thresholds = self.thresholds_for(pool);
        debug!(?thresholds, field = %self.field, "segment thresholds");

        Ok(sampled
            .into_iter()
            .map(|(card, value)| self.make_question(card, value, &thresholds))
            .collect())
    }

    fn narrow(&self, question: &Question, chosen: usize) -> Question {
        if !question.can_narrow(chosen) {
            return question.clone();
        }

        // Dropping a band drops its upper threshold; the band below a removed
        // top band becomes the new catch-all
        let mut options = question.options_without(chosen);
        if let Some(top) = options.last_mut() {
            top.value = f64::INFINITY;
        }

        let correct = correct_band(&options, question.true_value());
        debug!(
            card = question.card().name(),
            removed = %question.options()[chosen].label,
            left = options.len(),
            "narrowed segment question"
        );
        Question::new(
            question.card().clone(),
            question.true_value(),
            options,
            correct,
        )
    }
}
