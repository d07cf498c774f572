pub mod numeric;
pub mod question;
pub mod segment;
pub mod session;

pub use numeric::{round_to_increment, NumericChoiceStrategy};
pub use question::{AnswerOption, Question, QuestionStrategy};
pub use segment::{percentile_thresholds, segment_index, segment_labels, SegmentStrategy};
pub use session::{QuizSession, Responder, RoundReport};

use crate::card::{CardRecord, RatingField};
use crate::config::{QuizConfig, QuizStyle};
use crate::rng::TrainerRng;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuizError {
    #[error("No cards with a {0} rating are available for the quiz")]
    EmptyPool(RatingField),
}

/// The question strategy selected by `config.style`
pub fn build_strategy(config: &QuizConfig) -> Box<dyn QuestionStrategy> {
    match config.style {
        QuizStyle::Numeric => Box::new(NumericChoiceStrategy::new(config)),
        QuizStyle::Segment => Box::new(SegmentStrategy::new(config)),
    }
}

/// Sample up to `count` distinct cards that carry `field`, paired with their value.
/// A pool smaller than `count` yields every eligible card.
pub(crate) fn sample_cards(
    pool: &[CardRecord],
    field: RatingField,
    count: usize,
    rng: &mut TrainerRng,
) -> Result<Vec<(CardRecord, f64)>, QuizError> {
    let eligible: Vec<&CardRecord> = pool.iter().filter(|c| c.has_rating(field)).collect();
    if eligible.is_empty() {
        return Err(QuizError::EmptyPool(field));
    }
    if eligible.len() < count {
        warn!(
            "only {} cards available for {} requested questions",
            eligible.len(),
            count
        );
    }

    Ok(rng
        .sample(&eligible, count)
        .into_iter()
        .filter_map(|card| card.rating(field).map(|value| (card.clone(), value)))
        .collect())
}
