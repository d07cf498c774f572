use crate::card::{CardRecord, RatingField};
use crate::config::DraftConfig;
use crate::rng::TrainerRng;
use std::collections::HashSet;
use tracing::{debug, warn};

/// A set of cards offered together for one round of picks. Names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pack {
    cards: Vec<CardRecord>,
}

impl Pack {
    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// The pack in the order shown to the user. Display numbers are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct PackDisplay {
    cards: Vec<CardRecord>,
}

impl PackDisplay {
    /// Card shown under display number `index` (1-based)
    pub fn get(&self, index: usize) -> Option<&CardRecord> {
        index.checked_sub(1).and_then(|i| self.cards.get(i))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// (display number, card) pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CardRecord)> {
        self.cards.iter().enumerate().map(|(i, c)| (i + 1, c))
    }

    pub fn find(&self, name: &str) -> Option<&CardRecord> {
        self.cards.iter().find(|c| c.name() == name)
    }
}

impl From<Vec<CardRecord>> for PackDisplay {
    fn from(cards: Vec<CardRecord>) -> Self {
        PackDisplay { cards }
    }
}

/// Everything the orchestrator needs to run one round of picks
#[derive(Debug, Clone)]
pub struct DraftRound {
    pub round_index: usize,
    pub display: PackDisplay,
    /// The shown cards sorted best first by the scoring field
    pub winrate_order: Vec<CardRecord>,
}

/// Composes packs, trims them as rounds progress, and scores picks
#[derive(Debug, Clone)]
pub struct DraftSimulator {
    config: DraftConfig,
}

/// Missing ratings sort below every real value
fn rating_key(card: &CardRecord, field: RatingField) -> f64 {
    card.rating(field).unwrap_or(f64::NEG_INFINITY)
}

/// Stable sort, best first. Equal ratings keep their current relative order.
fn sort_by_rating_desc(cards: &mut [CardRecord], field: RatingField) {
    cards.sort_by(|a, b| rating_key(b, field).total_cmp(&rating_key(a, field)));
}

impl DraftSimulator {
    pub fn new(config: DraftConfig) -> Self {
        DraftSimulator { config }
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    /// Draw a fresh pack: `commons_per_pack` commons then `uncommons_per_pack`
    /// uncommons, skipping excluded names and names already in the pack.
    /// A pool that runs dry leaves the pack short rather than failing.
    pub fn draw_pack(
        &self,
        commons: &[CardRecord],
        uncommons: &[CardRecord],
        exclude: &HashSet<String>,
        rng: &mut TrainerRng,
    ) -> Pack {
        let mut common_pool: Vec<&CardRecord> = commons.iter().collect();
        let mut uncommon_pool: Vec<&CardRecord> = uncommons.iter().collect();
        rng.shuffle(&mut common_pool);
        rng.shuffle(&mut uncommon_pool);

        let mut seen: HashSet<&str> = HashSet::new();
        let mut cards = Vec::with_capacity(self.config.pack_size());

        for (pool, quota, label) in [
            (&common_pool, self.config.commons_per_pack, "common"),
            (&uncommon_pool, self.config.uncommons_per_pack, "uncommon"),
        ] {
            let mut taken = 0;
            for &card in pool.iter() {
                if taken == quota {
                    break;
                }
                if exclude.contains(card.name()) || !seen.insert(card.name()) {
                    continue;
                }
                cards.push(card.clone());
                taken += 1;
            }
            if taken < quota {
                warn!(
                    "{} pool exhausted: only {} of {} cards available",
                    label, taken, quota
                );
            }
        }

        debug!(size = cards.len(), "drew pack");
        Pack { cards }
    }

    /// How many of the best cards are already gone in round `round_index` (0-based)
    pub fn cards_to_remove(&self, round_index: usize) -> usize {
        round_index * self.config.picks_per_pack
    }

    /// Sort the pack best first and drop the cards earlier drafters would have taken
    pub fn escalate_difficulty(&self, pack: Pack, round_index: usize) -> Pack {
        let to_remove = self.cards_to_remove(round_index);
        if to_remove == 0 {
            return pack;
        }

        let mut cards = pack.cards;
        sort_by_rating_desc(&mut cards, self.config.rating_field);
        let cards = cards.into_iter().skip(to_remove).collect();
        Pack { cards }
    }

    /// The pack's cards sorted best first by the scoring field
    pub fn winrate_order(&self, cards: &[CardRecord]) -> Vec<CardRecord> {
        let mut ordered = cards.to_vec();
        sort_by_rating_desc(&mut ordered, self.config.rating_field);
        ordered
    }

    /// Shuffle the pack into display order so position says nothing about rating
    pub fn present_pack(&self, pack: Pack, rng: &mut TrainerRng) -> PackDisplay {
        let mut cards = pack.cards;
        rng.shuffle(&mut cards);
        PackDisplay { cards }
    }

    /// Draw, trim, and present the pack for round `round_index`
    pub fn deal_round(
        &self,
        round_index: usize,
        commons: &[CardRecord],
        uncommons: &[CardRecord],
        exclude: &HashSet<String>,
        rng: &mut TrainerRng,
    ) -> DraftRound {
        let pack = self.draw_pack(commons, uncommons, exclude, rng);
        let pack = self.escalate_difficulty(pack, round_index);
        let display = self.present_pack(pack, rng);
        let winrate_order = self.winrate_order(&display.cards);
        DraftRound {
            round_index,
            display,
            winrate_order,
        }
    }
}
