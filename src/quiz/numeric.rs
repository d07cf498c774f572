//! Numeric multiple choice: "what is this card's rating, to the nearest step?"

use crate::card::{rating_bounds, CardRecord, RatingField};
use crate::config::QuizConfig;
use crate::quiz::question::{AnswerOption, Question, QuestionStrategy};
use crate::quiz::{sample_cards, QuizError};
use crate::rng::TrainerRng;
use std::collections::BTreeSet;
use tracing::debug;

/// Round a value to the nearest multiple of `step`
pub fn round_to_increment(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

/// Every option within one step of the true value counts as correct
pub fn correct_indices(options: &[AnswerOption], true_value: f64, step: f64) -> BTreeSet<usize> {
    options
        .iter()
        .enumerate()
        .filter(|(_, o)| (o.value - true_value).abs() < step)
        .map(|(i, _)| i)
        .collect()
}

fn option_for(value: f64) -> AnswerOption {
    AnswerOption::new(format!("{:.1}", value), value)
}

#[derive(Debug, Clone)]
pub struct NumericChoiceStrategy {
    field: RatingField,
    step: f64,
    num_choices: usize,
    num_questions: usize,
    near_miss_probability: f64,
}

impl NumericChoiceStrategy {
    pub fn new(config: &QuizConfig) -> Self {
        NumericChoiceStrategy {
            field: config.rating_field,
            step: config.difficulty.rounding_step(),
            num_choices: config.num_choices,
            num_questions: config.num_questions,
            near_miss_probability: config.near_miss_probability,
        }
    }

    /// Build the question for one card whose rating is `true_value`, offering
    /// step-aligned values inside `[min, max]`.
    pub fn make_question(
        &self,
        card: CardRecord,
        true_value: f64,
        (min, max): (f64, f64),
        rng: &mut TrainerRng,
    ) -> Question {
        let step = self.step;
        // Work in whole multiples of `step` so candidates compare exactly
        let true_k = (true_value / step).round() as i64;
        let min_k = (min / step).ceil() as i64;
        let max_k = (max / step).floor() as i64;

        let others: Vec<i64> = (min_k..=max_k).filter(|&k| k != true_k).collect();
        let wanted = others.len().min(self.num_choices.saturating_sub(1));

        let mut wrong: Vec<i64> = Vec::with_capacity(wanted);
        if wanted > 0 && rng.chance(self.near_miss_probability) {
            let near: Vec<i64> = others
                .iter()
                .copied()
                .filter(|&k| (k - true_k).abs() == 1)
                .collect();
            if let Some(&k) = rng.pick(&near) {
                wrong.push(k);
            }
        }
        let rest: Vec<i64> = others
            .into_iter()
            .filter(|k| !wrong.contains(k))
            .collect();
        let remaining = wanted - wrong.len();
        wrong.extend(rng.sample(&rest, remaining));

        let mut options: Vec<AnswerOption> = wrong
            .into_iter()
            .chain(std::iter::once(true_k))
            .map(|k| option_for(k as f64 * step))
            .collect();
        rng.shuffle(&mut options);

        let correct = correct_indices(&options, true_value, step);
        Question::new(card, true_value, options, correct)
    }
}

impl QuestionStrategy for NumericChoiceStrategy {
    fn generate(
        &self,
        pool: &[CardRecord],
        rng: &mut TrainerRng,
    ) -> Result<Vec<Question>, QuizError> {
        let bounds =
            rating_bounds(pool, self.field).ok_or(QuizError::EmptyPool(self.field))?;
        let sampled = sample_cards(pool, self.field, self.num_questions, rng)?;

        Ok(sampled
            .into_iter()
            .map(|(card, value)| self.make_question(card, value, bounds, rng))
            .collect())
    }

    fn narrow(&self, question: &Question, chosen: usize) -> Question {
        if !question.can_narrow(chosen) {
            return question.clone();
        }

        let options = question.options_without(chosen);
        let correct = correct_indices(&options, question.true_value(), self.step);
        debug!(
            card = question.card().name(),
            removed = %question.options()[chosen].label,
            left = options.len(),
            "narrowed numeric question"
        );
        Question::new(
            question.card().clone(),
            question.true_value(),
            options,
            correct,
        )
    }
}
