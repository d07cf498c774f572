//! The interactive pack-by-pack draft loop.

use crate::card::CardRecord;
use crate::cli::{InputError, Prompter};
use crate::display;
use crate::draft::pack::DraftSimulator;
use crate::draft::scoring::evaluate_picks;
use crate::rng::TrainerRng;
use std::collections::HashSet;
use std::io::{BufRead, Write};
use tracing::warn;

/// Why the draft stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftEnd {
    /// Every pack was played
    Completed,
    /// A pack score fell below the advance threshold
    BelowThreshold { pack: usize },
    /// Pack `pack` came out empty after trimming
    OutOfCards { pack: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOutcome {
    pub total_score: usize,
    pub packs_played: usize,
    pub pack_scores: Vec<usize>,
    pub end: DraftEnd,
}

/// Play up to `total_packs` packs, reading picks from `prompter`.
/// Only end of input or an I/O failure is an error; an exhausted card pool
/// just ends the draft early.
pub fn play_draft<R: BufRead, W: Write>(
    simulator: &DraftSimulator,
    commons: &[CardRecord],
    uncommons: &[CardRecord],
    exclude: &HashSet<String>,
    prompter: &mut Prompter<R, W>,
    rng: &mut TrainerRng,
) -> Result<DraftOutcome, InputError> {
    let config = simulator.config();
    let mut pack_scores = Vec::with_capacity(config.total_packs);
    let mut end = DraftEnd::Completed;

    for round_index in 0..config.total_packs {
        let pack = round_index + 1;
        println!("Pack {} of {}:", pack, config.total_packs);
        let round = simulator.deal_round(round_index, commons, uncommons, exclude, rng);
        if round.display.is_empty() {
            warn!(pack, "no cards left after trimming");
            println!("Not enough cards left for another pack.");
            end = DraftEnd::OutOfCards { pack };
            break;
        }
        display::print_pack(&round.display);

        let picks = prompter.ask_picks(config.picks_per_pack, round.display.len())?;
        let evaluation = evaluate_picks(&picks, &round.display, &round.winrate_order);
        pack_scores.push(evaluation.score);

        println!("\nYour score: {}/{}", evaluation.score, config.picks_per_pack);
        display::print_pick_summary(&evaluation, &round.display, config.rating_field);
        println!();

        if !simulator.should_advance(evaluation.score) {
            println!(
                "Game over! You needed {} correct picks to advance to the next pack.",
                config.advance_threshold
            );
            end = DraftEnd::BelowThreshold { pack };
            break;
        }
    }

    Ok(DraftOutcome {
        total_score: pack_scores.iter().sum(),
        packs_played: pack_scores.len(),
        pack_scores,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rarity, RatingField};
    use crate::config::DraftConfig;
    use std::io::Cursor;

    const FIELD: RatingField = RatingField::OpeningHandWinRate;

    fn pool(rarity: Rarity, count: usize, base: f64) -> Vec<CardRecord> {
        (0..count)
            .map(|i| {
                CardRecord::new(format!("{} {}", rarity, i), "R", rarity)
                    .with_rating(FIELD, base + i as f64)
            })
            .collect()
    }

    fn play(
        config: DraftConfig,
        commons: &[CardRecord],
        uncommons: &[CardRecord],
        input: &str,
    ) -> Result<DraftOutcome, InputError> {
        let simulator = DraftSimulator::new(config);
        let mut output = Vec::new();
        let mut prompter = Prompter::new(Cursor::new(input.to_string()), &mut output);
        let mut rng = TrainerRng::new(Some(1));
        play_draft(&simulator, commons, uncommons, &HashSet::new(), &mut prompter, &mut rng)
    }

    #[test]
    fn test_small_set_ends_early_without_error() {
        // 7 commons and 3 uncommons: pack 2 keeps 5 cards, pack 3 has none left
        let config = DraftConfig {
            advance_threshold: 0,
            ..DraftConfig::default()
        };
        let outcome = play(
            config,
            &pool(Rarity::Common, 7, 40.0),
            &pool(Rarity::Uncommon, 3, 60.0),
            "1,2,3,4,5\n1,2,3,4,5\n",
        )
        .expect("an exhausted pool is not an error");

        assert_eq!(outcome.end, DraftEnd::OutOfCards { pack: 3 });
        assert_eq!(outcome.packs_played, 2);
        assert_eq!(outcome.pack_scores.len(), 2);
        assert!(outcome.total_score <= 10);
    }

    #[test]
    fn test_low_score_stops_the_draft() {
        let config = DraftConfig {
            advance_threshold: 5,
            ..DraftConfig::default()
        };
        // Picking the same card five times scores at most one position
        let outcome = play(
            config,
            &pool(Rarity::Common, 30, 40.0),
            &pool(Rarity::Uncommon, 10, 60.0),
            "1,1,1,1,1\n",
        )
        .unwrap();

        assert_eq!(outcome.end, DraftEnd::BelowThreshold { pack: 1 });
        assert_eq!(outcome.packs_played, 1);
        assert!(outcome.total_score <= 1);
    }

    #[test]
    fn test_all_packs_played() {
        let config = DraftConfig {
            advance_threshold: 0,
            ..DraftConfig::default()
        };
        let outcome = play(
            config,
            &pool(Rarity::Common, 30, 40.0),
            &pool(Rarity::Uncommon, 10, 60.0),
            "1,2,3,4,5\n5,4,3,2,1\n2,2,2,2,2\n",
        )
        .unwrap();

        assert_eq!(outcome.end, DraftEnd::Completed);
        assert_eq!(outcome.packs_played, 3);
    }

    #[test]
    fn test_input_ending_mid_draft_is_an_error() {
        let result = play(
            DraftConfig::default(),
            &pool(Rarity::Common, 30, 40.0),
            &pool(Rarity::Uncommon, 10, 60.0),
            "",
        );
        assert!(matches!(result, Err(InputError::Eof)));
    }
}
