use crate::card::CardRecord;
use crate::quiz::QuizError;
use crate::rng::TrainerRng;
use std::collections::BTreeSet;

/// One selectable answer.
///
/// For numeric questions `value` is the offered rating. For segment questions
/// it is the band's exclusive upper threshold (`f64::INFINITY` for the top band).
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOption {
    pub label: String,
    pub value: f64,
}

impl AnswerOption {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        AnswerOption {
            label: label.into(),
            value,
        }
    }
}

/// A quiz item about one card. Wrong answers produce a narrowed copy through
/// `QuestionStrategy::narrow`; a question is never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    card: CardRecord,
    true_value: f64,
    options: Vec<AnswerOption>,
    correct_indices: BTreeSet<usize>,
}

impl Question {
    pub fn new(
        card: CardRecord,
        true_value: f64,
        options: Vec<AnswerOption>,
        correct_indices: BTreeSet<usize>,
    ) -> Self {
        Question {
            card,
            true_value,
            options,
            correct_indices,
        }
    }

    pub fn card(&self) -> &CardRecord {
        &self.card
    }

    /// The card's unrounded rating
    pub fn true_value(&self) -> f64 {
        self.true_value
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn correct_indices(&self) -> &BTreeSet<usize> {
        &self.correct_indices
    }

    pub fn is_correct(&self, chosen: usize) -> bool {
        self.correct_indices.contains(&chosen)
    }

    /// A question can only shrink by a wrong, existing option, and never below one option
    pub fn can_narrow(&self, chosen: usize) -> bool {
        chosen < self.options.len() && self.options.len() > 1 && !self.is_correct(chosen)
    }

    /// Options with `chosen` taken out, in their original order
    pub(crate) fn options_without(&self, chosen: usize) -> Vec<AnswerOption> {
        self.options
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != chosen)
            .map(|(_, o)| o.clone())
            .collect()
    }
}

/// A way of turning cards into questions and shrinking questions after a miss
pub trait QuestionStrategy {
    /// One question per sampled card of `pool`
    fn generate(
        &self,
        pool: &[CardRecord],
        rng: &mut TrainerRng,
    ) -> Result<Vec<Question>, QuizError>;

    /// The question to ask again after `chosen` was answered wrong.
    /// Returns an unchanged copy when `chosen` cannot be removed.
    fn narrow(&self, question: &Question, chosen: usize) -> Question;
}
