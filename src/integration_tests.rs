//! End-to-end tests for the trainer
//! Loads a generated set from disk and plays draft rounds and quizzes with known seeds

use crate::card::{
    filter_by_rarity, CardRecord, CardRepository, CsvCardRepository, Rarity, RatingField,
    RepositoryError,
};
use crate::config::{QuizConfig, QuizStyle, TrainerConfig};
use crate::draft::{evaluate_picks, DraftSimulator};
use crate::quiz::{build_strategy, Question, QuizSession, Responder};
use crate::rng::TrainerRng;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

const SET: &str = "tst";
const FIELD: RatingField = RatingField::OpeningHandWinRate;
const EXCLUDED: [&str; 2] = ["Common 3", "Common 17"];

/// 30 commons, 12 uncommons and 3 rares with distinct opening hand win rates
fn write_test_set() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let set_dir = dir.path().join("sets").join(SET);
    fs::create_dir_all(&set_dir).expect("Failed to create set dir");

    let colors = ["W", "U", "B", "R", "G", "WU", ""];
    let mut csv = String::from("\u{feff}Name,Color,Rarity,# GIH,GIH WR,OH WR,GP WR\n");
    let rarities = [("Common", "C", 30), ("Uncommon", "U", 12), ("Rare", "R", 3)];
    let mut row = 0;
    for (label, code, count) in rarities {
        for i in 0..count {
            let oh = 45.0 + (row * 7 % 45) as f64 * 0.37;
            csv.push_str(&format!(
                "{} {},{},{},\"1,{:03}\",{:.1}%,{:.1}%,{:.1}%\n",
                label,
                i,
                colors[row % colors.len()],
                code,
                row,
                oh + 1.5,
                oh,
                oh - 0.8
            ));
            row += 1;
        }
    }
    // A card nobody has played yet
    csv.push_str("Unplayed,G,C,0,,,\n");

    fs::write(set_dir.join("card-ratings-2025-06-20.csv"), csv).expect("Failed to write ratings");
    fs::write(
        set_dir.join("exclude.csv"),
        format!("name\n{}\n{}\n", EXCLUDED[0], EXCLUDED[1]),
    )
    .expect("Failed to write exclude list");
    dir
}

fn repository(dir: &TempDir) -> CsvCardRepository {
    CsvCardRepository::new(dir.path(), 5)
        .with_today(NaiveDate::from_ymd_opt(2025, 6, 22).expect("valid date"))
}

fn quiz_pool(cards: &[CardRecord], exclude: &HashSet<String>, config: &QuizConfig) -> Vec<CardRecord> {
    cards
        .iter()
        .filter(|c| config.rarities.contains(&c.rarity()))
        .filter(|c| !exclude.contains(c.name()))
        .cloned()
        .collect()
}

/// Picks the first wrong option while one is left
struct AlwaysWrong;

impl Responder for AlwaysWrong {
    fn choose(&mut self, question: &Question, _number: usize, _round: usize) -> usize {
        (0..question.option_count())
            .find(|i| !question.is_correct(*i))
            .unwrap_or(0)
    }
}

struct AlwaysRight;

impl Responder for AlwaysRight {
    fn choose(&mut self, question: &Question, _number: usize, _round: usize) -> usize {
        *question.correct_indices().iter().next().expect("a correct option")
    }
}

#[test]
fn test_load_test_set() {
    let dir = write_test_set();
    let repo = repository(&dir);

    let cards = repo.load_card_data(SET, FIELD).expect("Failed to load cards");
    assert_eq!(cards.len(), 45, "the unplayed card has no rating");
    assert_eq!(filter_by_rarity(&cards, Rarity::Common).len(), 30);
    assert_eq!(cards[0].rating(RatingField::GamesInHandCount), Some(1000.0));

    let exclude = repo.load_exclude_list(SET).expect("Failed to load exclude list");
    assert_eq!(exclude.len(), 2);
    assert!(EXCLUDED.iter().all(|name| exclude.contains(*name)));
}

#[test]
fn test_stale_set_is_refused() {
    let dir = write_test_set();
    let repo = CsvCardRepository::new(dir.path(), 5)
        .with_today(NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date"));
    assert!(matches!(
        repo.load_card_data(SET, FIELD),
        Err(RepositoryError::StaleData { cutoff_days: 5, .. })
    ));
}

#[test]
fn test_first_round_with_perfect_picks() {
    let dir = write_test_set();
    let repo = repository(&dir);
    let cards = repo.load_card_data(SET, FIELD).expect("Failed to load cards");
    let exclude = repo.load_exclude_list(SET).expect("Failed to load exclude list");
    let commons = filter_by_rarity(&cards, Rarity::Common);
    let uncommons = filter_by_rarity(&cards, Rarity::Uncommon);

    let config = TrainerConfig::default();
    let simulator = DraftSimulator::new(config.draft.clone());
    let mut rng = TrainerRng::new(Some(12345));
    let round = simulator.deal_round(0, &commons, &uncommons, &exclude, &mut rng);

    assert_eq!(round.display.len(), 15);
    let names: HashSet<&str> = round.display.iter().map(|(_, c)| c.name()).collect();
    assert_eq!(names.len(), 15, "no duplicate names in a pack");
    assert!(EXCLUDED.iter().all(|name| !names.contains(name)));

    // Enter the display numbers of the five best cards, best first
    let picks: Vec<usize> = round.winrate_order[..5]
        .iter()
        .map(|best| {
            round
                .display
                .iter()
                .find(|(_, c)| c.name() == best.name())
                .map(|(i, _)| i)
                .expect("best card is displayed")
        })
        .collect();

    let evaluation = evaluate_picks(&picks, &round.display, &round.winrate_order);
    assert_eq!(evaluation.score, 5);
    assert!(simulator.should_advance(evaluation.score));
    assert!(evaluation.results.iter().all(|r| r.best_name.is_none()));
}

#[test]
fn test_later_rounds_are_smaller_and_weaker() {
    let dir = write_test_set();
    let repo = repository(&dir);
    let cards = repo.load_card_data(SET, FIELD).expect("Failed to load cards");
    let commons = filter_by_rarity(&cards, Rarity::Common);
    let uncommons = filter_by_rarity(&cards, Rarity::Uncommon);

    let simulator = DraftSimulator::new(TrainerConfig::default().draft);
    let mut rng = TrainerRng::new(Some(7));
    for (round_index, expected_len) in [(0, 15), (1, 10), (2, 5)] {
        let round = simulator.deal_round(round_index, &commons, &uncommons, &HashSet::new(), &mut rng);
        assert_eq!(round.display.len(), expected_len);
        assert_eq!(round.winrate_order.len(), expected_len);
    }
    assert_eq!(simulator.max_possible_score(3), 15);
}

#[test]
fn test_same_seed_deals_same_packs() {
    let dir = write_test_set();
    let repo = repository(&dir);
    let cards = repo.load_card_data(SET, FIELD).expect("Failed to load cards");
    let commons = filter_by_rarity(&cards, Rarity::Common);
    let uncommons = filter_by_rarity(&cards, Rarity::Uncommon);
    let simulator = DraftSimulator::new(TrainerConfig::default().draft);

    let deal = |seed| {
        let mut rng = TrainerRng::new(Some(seed));
        let round = simulator.deal_round(0, &commons, &uncommons, &HashSet::new(), &mut rng);
        round
            .display
            .iter()
            .map(|(_, c)| c.name().to_string())
            .collect::<Vec<_>>()
    };

    assert_eq!(deal(54321), deal(54321), "Same seed should deal the same pack");
    assert_ne!(deal(111), deal(222), "Different seeds should deal different packs");
}

#[test]
fn test_numeric_quiz_ends_for_stubborn_player() {
    let dir = write_test_set();
    let repo = repository(&dir);
    let config = TrainerConfig::default();
    let cards = repo.load_card_data(SET, config.quiz.rating_field).expect("Failed to load cards");
    let exclude = repo.load_exclude_list(SET).expect("Failed to load exclude list");
    let pool = quiz_pool(&cards, &exclude, &config.quiz);
    assert_eq!(pool.len(), 40);

    let strategy = build_strategy(&config.quiz);
    let mut rng = TrainerRng::new(Some(2024));
    let questions = strategy.generate(&pool, &mut rng).expect("Failed to build quiz");
    assert_eq!(questions.len(), 12);
    assert!(questions.iter().all(|q| q.card().rarity() != Rarity::Rare));
    assert!(questions.iter().all(|q| !exclude.contains(q.card().name())));

    let mut session = QuizSession::new(strategy.as_ref(), questions);
    let reports = session.run(&mut AlwaysWrong, &mut rng);

    assert!(session.is_complete());
    assert!(session.first_round_missed());
    assert!(reports.len() <= config.quiz.num_choices);
    let total_correct: usize = reports.iter().map(|r| r.correct).sum();
    assert_eq!(total_correct, 12, "every question is eventually answered correctly");
}

#[test]
fn test_segment_quiz_perfect_player() {
    let dir = write_test_set();
    let repo = repository(&dir);
    let mut config = TrainerConfig::default();
    config.quiz.style = QuizStyle::Segment;
    config.quiz.num_questions = 20;

    let cards = repo.load_card_data(SET, config.quiz.rating_field).expect("Failed to load cards");
    let exclude = repo.load_exclude_list(SET).expect("Failed to load exclude list");
    let pool = quiz_pool(&cards, &exclude, &config.quiz);

    let strategy = build_strategy(&config.quiz);
    let mut rng = TrainerRng::new(Some(99));
    let questions = strategy.generate(&pool, &mut rng).expect("Failed to build quiz");
    assert!(questions.iter().all(|q| q.option_count() == 4));

    let mut session = QuizSession::new(strategy.as_ref(), questions);
    let reports = session.run(&mut AlwaysRight, &mut rng);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].correct, 20);
    assert!(!session.first_round_missed());
}

#[test]
fn test_same_seed_builds_same_quiz() {
    let dir = write_test_set();
    let repo = repository(&dir);
    let config = TrainerConfig::default();
    let cards = repo.load_card_data(SET, FIELD).expect("Failed to load cards");
    let pool = quiz_pool(&cards, &HashSet::new(), &config.quiz);
    let strategy = build_strategy(&config.quiz);

    let build = |seed| {
        let mut rng = TrainerRng::new(Some(seed));
        strategy.generate(&pool, &mut rng).expect("Failed to build quiz")
    };
    assert_eq!(build(31337), build(31337));
}
