use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Numeric performance statistics published per card
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum RatingField {
    /// Win rate when the card is in the opening hand
    #[serde(rename = "oh-wr")]
    #[value(name = "oh-wr")]
    OpeningHandWinRate,
    /// Win rate when the card was drawn at any point (games in hand)
    #[serde(rename = "gih-wr")]
    #[value(name = "gih-wr")]
    GamesInHandWinRate,
    /// Win rate of games where the card was in the maindeck
    #[serde(rename = "gp-wr")]
    #[value(name = "gp-wr")]
    GamesPlayedWinRate,
    /// Number of games the card was drawn in
    #[serde(rename = "gih-count")]
    #[value(name = "gih-count")]
    GamesInHandCount,
    /// Share of decks that maindecked the card
    #[serde(rename = "gp-percent")]
    #[value(name = "gp-percent")]
    GamesPlayedPercent,
}

impl RatingField {
    pub const ALL: [RatingField; 5] = [
        RatingField::OpeningHandWinRate,
        RatingField::GamesInHandWinRate,
        RatingField::GamesPlayedWinRate,
        RatingField::GamesInHandCount,
        RatingField::GamesPlayedPercent,
    ];

    /// Column header used in the card-ratings CSV export
    pub fn column(&self) -> &'static str {
        match self {
            RatingField::OpeningHandWinRate => "OH WR",
            RatingField::GamesInHandWinRate => "GIH WR",
            RatingField::GamesPlayedWinRate => "GP WR",
            RatingField::GamesInHandCount => "# GIH",
            RatingField::GamesPlayedPercent => "% GP",
        }
    }
}

impl fmt::Display for RatingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Print frequency tier of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    #[serde(rename = "C")]
    Common,
    #[serde(rename = "U")]
    Uncommon,
    #[serde(rename = "R")]
    Rare,
    #[serde(rename = "M")]
    Mythic,
    #[serde(rename = "S")]
    Special,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown rarity code '{0}' (expected one of C, U, R, M, S)")]
pub struct UnknownRarity(pub String);

impl Rarity {
    /// Convert to the single character representation
    pub fn to_char(&self) -> char {
        match self {
            Rarity::Common => 'C',
            Rarity::Uncommon => 'U',
            Rarity::Rare => 'R',
            Rarity::Mythic => 'M',
            Rarity::Special => 'S',
        }
    }
}

impl FromStr for Rarity {
    type Err = UnknownRarity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Ok(Rarity::Common),
            "U" => Ok(Rarity::Uncommon),
            "R" => Ok(Rarity::Rare),
            "M" => Ok(Rarity::Mythic),
            "S" => Ok(Rarity::Special),
            _ => Err(UnknownRarity(s.to_string())),
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A single card of a set with its parsed rating statistics.
///
/// Records are built once at ingestion and only ever shared by reference or
/// cloned afterwards; there is no way to change a rating on an existing record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRecord {
    name: String,
    color: String,
    rarity: Rarity,
    ratings: BTreeMap<RatingField, f64>,
}

impl CardRecord {
    pub fn new(name: impl Into<String>, color: impl Into<String>, rarity: Rarity) -> Self {
        CardRecord {
            name: name.into(),
            color: color.into(),
            rarity,
            ratings: BTreeMap::new(),
        }
    }

    /// Builder used during ingestion to attach a parsed rating
    pub fn with_rating(mut self, field: RatingField, value: f64) -> Self {
        self.ratings.insert(field, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color identity: empty (colorless), one letter, or several letters for multicolor
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn rarity(&self) -> Rarity {
        self.rarity
    }

    pub fn rating(&self, field: RatingField) -> Option<f64> {
        self.ratings.get(&field).copied()
    }

    pub fn has_rating(&self, field: RatingField) -> bool {
        self.ratings.contains_key(&field)
    }
}

/// Filter cards by rarity
pub fn filter_by_rarity(cards: &[CardRecord], rarity: Rarity) -> Vec<CardRecord> {
    cards
        .iter()
        .filter(|c| c.rarity() == rarity)
        .cloned()
        .collect()
}

/// Smallest and largest value of `field` across `cards`, ignoring cards without it
pub fn rating_bounds(cards: &[CardRecord], field: RatingField) -> Option<(f64, f64)> {
    cards
        .iter()
        .filter_map(|c| c.rating(field))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
