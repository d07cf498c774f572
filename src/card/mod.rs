pub mod record;
pub mod repository;

pub use record::{filter_by_rarity, rating_bounds, CardRecord, Rarity, RatingField, UnknownRarity};
pub use repository::{
    card_data_url, ingest_row, parse_percentage, CardRepository, CsvCardRepository,
    RawCardRow, RepositoryError,
};
