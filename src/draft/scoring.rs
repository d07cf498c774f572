use crate::card::CardRecord;
use crate::draft::pack::{DraftSimulator, PackDisplay};

/// Outcome of one pick position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickResult {
    /// 1-based pick position
    pub position: usize,
    /// Name of the card under the chosen display number, None if the number was not shown
    pub chosen_name: Option<String>,
    pub is_correct: bool,
    /// The card that belonged at this position; only set for wrong picks
    pub best_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickEvaluation {
    pub score: usize,
    pub results: Vec<PickResult>,
}

/// Compare picks position by position against the win-rate ordering.
///
/// Pick `j` is correct only when the card shown under `picks[j]` is the
/// `j`-th best card; choosing the right card at the wrong position scores nothing.
pub fn evaluate_picks(
    picks: &[usize],
    display: &PackDisplay,
    winrate_order: &[CardRecord],
) -> PickEvaluation {
    let mut score = 0;
    let mut results = Vec::with_capacity(picks.len());

    for (j, &pick) in picks.iter().enumerate() {
        let chosen = display.get(pick);
        let best = winrate_order.get(j);

        let is_correct = matches!((chosen, best), (Some(c), Some(b)) if c.name() == b.name());
        if is_correct {
            score += 1;
        }

        results.push(PickResult {
            position: j + 1,
            chosen_name: chosen.map(|c| c.name().to_string()),
            is_correct,
            best_name: if is_correct {
                None
            } else {
                best.map(|b| b.name().to_string())
            },
        });
    }

    PickEvaluation { score, results }
}

impl DraftSimulator {
    /// Whether a pack score is good enough to continue to the next pack
    pub fn should_advance(&self, score: usize) -> bool {
        score >= self.config().advance_threshold
    }

    pub fn max_possible_score(&self, total_rounds: usize) -> usize {
        total_rounds * self.config().picks_per_pack
    }
}
