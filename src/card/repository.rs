//! Loading card ratings and exclude lists for a set.
//!
//! The on-disk layout is `<root>/sets/<set>/card-ratings-YYYY-MM-DD.csv` (one
//! export per day, the newest wins) plus an optional `<root>/sets/<set>/exclude.csv`.

use crate::card::record::{CardRecord, Rarity, RatingField};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const RATINGS_PREFIX: &str = "card-ratings-";
const RATINGS_SUFFIX: &str = ".csv";
const EXCLUDE_FILE: &str = "exclude.csv";

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("No card rating files found for set '{set}' in {dir}")]
    NoRatingFiles { set: String, dir: String },
    #[error("Could not parse date from filename: {0}")]
    BadFileDate(String),
    #[error(
        "The most recent data file is from {file_date}, which is more than {cutoff_days} days old. \
         Go to {download_url} to retrieve the latest data file, then update the data files in {dir}"
    )]
    StaleData {
        file_date: NaiveDate,
        cutoff_days: i64,
        dir: String,
        download_url: String,
    },
}

/// 17lands card data table for `set_code`, where fresh rating exports are downloaded
pub fn card_data_url(set_code: &str) -> String {
    format!(
        "https://www.17lands.com/card_data?expansion={}&format=PremierDraft&view=table&columns=opening",
        set_code.to_uppercase()
    )
}

/// Source of card records for a named set
pub trait CardRepository {
    /// Records of `set_code` that carry a usable value for `field`
    fn load_card_data(
        &self,
        set_code: &str,
        field: RatingField,
    ) -> Result<Vec<CardRecord>, RepositoryError>;

    /// Names that must never appear in packs or quizzes
    fn load_exclude_list(&self, set_code: &str) -> Result<HashSet<String>, RepositoryError>;
}

/// One row of a card-ratings export, before any conversion
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCardRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Color", default)]
    pub color: String,
    #[serde(rename = "Rarity")]
    pub rarity: String,
    #[serde(rename = "OH WR", default)]
    pub oh_wr: String,
    #[serde(rename = "GIH WR", default)]
    pub gih_wr: String,
    #[serde(rename = "GP WR", default)]
    pub gp_wr: String,
    #[serde(rename = "# GIH", default)]
    pub gih_count: String,
    #[serde(rename = "% GP", default)]
    pub gp_percent: String,
}

impl RawCardRow {
    fn rating_text(&self, field: RatingField) -> &str {
        match field {
            RatingField::OpeningHandWinRate => &self.oh_wr,
            RatingField::GamesInHandWinRate => &self.gih_wr,
            RatingField::GamesPlayedWinRate => &self.gp_wr,
            RatingField::GamesInHandCount => &self.gih_count,
            RatingField::GamesPlayedPercent => &self.gp_percent,
        }
    }
}

/// Parse a rating cell such as `"56.3%"`, `"1,204"` or `"48"`.
/// Returns None for empty or unparseable cells.
pub fn parse_percentage(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert a raw row into a typed record. Unparseable rating cells are left
/// off the record; an unknown rarity code rejects the row.
pub fn ingest_row(row: &RawCardRow) -> Option<CardRecord> {
    let rarity = match row.rarity.parse::<Rarity>() {
        Ok(r) => r,
        Err(e) => {
            warn!(card = %row.name, "{}", e);
            return None;
        }
    };

    let mut record = CardRecord::new(row.name.trim(), row.color.trim(), rarity);
    for field in RatingField::ALL {
        let text = row.rating_text(field);
        match parse_percentage(text) {
            Some(value) => record = record.with_rating(field, value),
            None if !text.trim().is_empty() => {
                debug!(card = %row.name, field = %field, value = text, "unparseable rating left out");
            }
            None => {}
        }
    }
    Some(record)
}

/// Card repository backed by dated CSV exports on disk
pub struct CsvCardRepository {
    root: PathBuf,
    stale_cutoff_days: i64,
    today: NaiveDate,
}

impl CsvCardRepository {
    pub fn new(root: impl Into<PathBuf>, stale_cutoff_days: i64) -> Self {
        CsvCardRepository {
            root: root.into(),
            stale_cutoff_days,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the date used by the staleness check
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn set_dir(&self, set_code: &str) -> PathBuf {
        self.root.join("sets").join(set_code)
    }

    /// Find the newest ratings export for the set and make sure it is recent enough
    pub fn find_most_recent_csv(&self, set_code: &str) -> Result<PathBuf, RepositoryError> {
        let dir = self.set_dir(set_code);
        let no_files = || RepositoryError::NoRatingFiles {
            set: set_code.to_string(),
            dir: dir.display().to_string(),
        };

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(no_files()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with(RATINGS_PREFIX) && name.ends_with(RATINGS_SUFFIX) {
                names.push(name);
            }
        }

        // Filenames embed an ISO date, so the lexicographic maximum is the newest export
        names.sort_unstable_by(|a, b| b.cmp(a));
        let newest = names.into_iter().next().ok_or_else(no_files)?;

        let date_text = &newest[RATINGS_PREFIX.len()..newest.len() - RATINGS_SUFFIX.len()];
        let file_date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d")
            .map_err(|_| RepositoryError::BadFileDate(newest.clone()))?;

        if (self.today - file_date).num_days() > self.stale_cutoff_days {
            return Err(RepositoryError::StaleData {
                file_date,
                cutoff_days: self.stale_cutoff_days,
                dir: dir.display().to_string(),
                download_url: card_data_url(set_code),
            });
        }

        Ok(dir.join(newest))
    }

    fn read_rows(path: &Path) -> Result<Vec<RawCardRow>, RepositoryError> {
        let content = std::fs::read_to_string(path)?;
        // Exports are written with a UTF-8 byte order mark
        let content = content.trim_start_matches('\u{feff}');

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    fn read_exclude_file(path: &Path) -> Result<HashSet<String>, RepositoryError> {
        let content = std::fs::read_to_string(path)?;
        let content = content.trim_start_matches('\u{feff}');

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut names = HashSet::new();
        for record in reader.records() {
            let record = record?;
            if let Some(name) = record.get(0).map(str::trim).filter(|n| !n.is_empty()) {
                names.insert(name.to_string());
            }
        }
        Ok(names)
    }
}

impl CardRepository for CsvCardRepository {
    fn load_card_data(
        &self,
        set_code: &str,
        field: RatingField,
    ) -> Result<Vec<CardRecord>, RepositoryError> {
        let path = self.find_most_recent_csv(set_code)?;
        let rows = Self::read_rows(&path)?;
        let total = rows.len();

        let cards: Vec<CardRecord> = rows
            .iter()
            .filter_map(ingest_row)
            .filter(|card| card.has_rating(field))
            .collect();

        debug!(
            file = %path.display(),
            rows = total,
            kept = cards.len(),
            field = %field,
            "loaded card ratings"
        );
        Ok(cards)
    }

    fn load_exclude_list(&self, set_code: &str) -> Result<HashSet<String>, RepositoryError> {
        let path = self.set_dir(set_code).join(EXCLUDE_FILE);
        if !path.exists() {
            return Ok(HashSet::new());
        }

        match Self::read_exclude_file(&path) {
            Ok(names) => Ok(names),
            Err(e) => {
                warn!("Could not load exclude file {}: {}", path.display(), e);
                Ok(HashSet::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "Name,Color,Rarity,# GIH,GIH WR,OH WR\n";

    fn write_set(dir: &TempDir, set: &str, files: &[(&str, &str)]) {
        let set_dir = dir.path().join("sets").join(set);
        std::fs::create_dir_all(&set_dir).unwrap();
        for (name, content) in files {
            std::fs::write(set_dir.join(name), content).unwrap();
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("50%"), Some(50.0));
        assert_eq!(parse_percentage(" 56.3% "), Some(56.3));
        assert_eq!(parse_percentage("1,204"), Some(1204.0));
        assert_eq!(parse_percentage("abc"), None);
        assert_eq!(parse_percentage(""), None);
        assert_eq!(parse_percentage("%"), None);
    }

    #[test]
    fn test_ingest_row_skips_unparseable_rating() {
        let row = RawCardRow {
            name: "Foo".into(),
            color: "G".into(),
            rarity: "C".into(),
            oh_wr: "abc".into(),
            gih_wr: "55.1%".into(),
            ..Default::default()
        };
        let card = ingest_row(&row).expect("row should ingest");
        assert_eq!(card.rating(RatingField::OpeningHandWinRate), None);
        assert_eq!(card.rating(RatingField::GamesInHandWinRate), Some(55.1));
    }

    #[test]
    fn test_ingest_row_rejects_unknown_rarity() {
        let row = RawCardRow {
            name: "Foo".into(),
            rarity: "Common".into(),
            ..Default::default()
        };
        assert!(ingest_row(&row).is_none());
    }

    #[test]
    fn test_find_most_recent_csv() {
        let dir = TempDir::new().unwrap();
        write_set(
            &dir,
            "fin",
            &[
                ("card-ratings-2025-06-18.csv", HEADER),
                ("card-ratings-2025-06-24.csv", HEADER),
                ("exclude.csv", "Name\n"),
            ],
        );
        let repo = CsvCardRepository::new(dir.path(), 5).with_today(date(2025, 6, 26));
        let path = repo.find_most_recent_csv("fin").unwrap();
        assert!(path.ends_with("sets/fin/card-ratings-2025-06-24.csv"));
    }

    #[test]
    fn test_find_most_recent_csv_no_files() {
        let dir = TempDir::new().unwrap();
        let repo = CsvCardRepository::new(dir.path(), 5);
        let result = repo.find_most_recent_csv("unknown");
        assert!(matches!(result, Err(RepositoryError::NoRatingFiles { .. })));
    }

    #[test]
    fn test_stale_data_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_set(&dir, "fin", &[("card-ratings-2025-06-18.csv", HEADER)]);

        let fresh = CsvCardRepository::new(dir.path(), 5).with_today(date(2025, 6, 23));
        assert!(fresh.find_most_recent_csv("fin").is_ok());

        let stale = CsvCardRepository::new(dir.path(), 5).with_today(date(2025, 6, 24));
        let err = stale.find_most_recent_csv("fin").unwrap_err();
        assert!(err
            .to_string()
            .contains("https://www.17lands.com/card_data?expansion=FIN"));
        match err {
            RepositoryError::StaleData {
                file_date,
                cutoff_days,
                download_url,
                ..
            } => {
                assert_eq!(file_date, date(2025, 6, 18));
                assert_eq!(cutoff_days, 5);
                assert_eq!(download_url, card_data_url("fin"));
            }
            other => panic!("expected stale data error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_file_date() {
        let dir = TempDir::new().unwrap();
        write_set(&dir, "fin", &[("card-ratings-latest.csv", HEADER)]);
        let repo = CsvCardRepository::new(dir.path(), 5);
        assert!(matches!(
            repo.find_most_recent_csv("fin"),
            Err(RepositoryError::BadFileDate(_))
        ));
    }

    #[test]
    fn test_load_card_data_filters_missing_field() {
        let dir = TempDir::new().unwrap();
        let csv = format!(
            "\u{feff}{}{}{}{}",
            HEADER,
            "Foo,G,C,1200,58.0%,23.5%\n",
            "Bar,R,R,40,51.0%,\n",
            "\"Baz, the Quoted\",WU,U,300,55.5%,bad\n",
        );
        write_set(&dir, "fin", &[("card-ratings-2025-06-24.csv", &csv)]);
        let repo = CsvCardRepository::new(dir.path(), 5).with_today(date(2025, 6, 24));

        let cards = repo
            .load_card_data("fin", RatingField::OpeningHandWinRate)
            .unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name(), "Foo");
        assert_eq!(cards[0].rating(RatingField::OpeningHandWinRate), Some(23.5));
        assert_eq!(cards[0].rating(RatingField::GamesInHandCount), Some(1200.0));

        let by_gih = repo
            .load_card_data("fin", RatingField::GamesInHandWinRate)
            .unwrap();
        let names: Vec<_> = by_gih.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Foo", "Bar", "Baz, the Quoted"]);
        assert_eq!(by_gih[2].color(), "WU");
    }

    #[test]
    fn test_load_exclude_list() {
        let dir = TempDir::new().unwrap();
        write_set(
            &dir,
            "fin",
            &[("exclude.csv", "Name\n\"Baron, Airship Kingdom\"\n\nTreasure\n")],
        );
        let repo = CsvCardRepository::new(dir.path(), 5);
        let exclude = repo.load_exclude_list("fin").unwrap();
        assert_eq!(exclude.len(), 2);
        assert!(exclude.contains("Baron, Airship Kingdom"));
        assert!(exclude.contains("Treasure"));
    }

    #[test]
    fn test_missing_exclude_list_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = CsvCardRepository::new(dir.path(), 5);
        assert!(repo.load_exclude_list("fin").unwrap().is_empty());
    }
}
