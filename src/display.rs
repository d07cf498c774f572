//! Terminal output for the draft and quiz modes.

use crate::card::{CardRecord, RatingField};
use crate::config::{DraftConfig, QuizStyle};
use crate::draft::{PackDisplay, PickEvaluation};
use crate::quiz::{percentile_thresholds, Question, RoundReport};
use crossterm::style::{style, Color, Stylize};

/// Terminal color for a card's color identity
pub fn color_for(card_color: &str) -> Color {
    match card_color {
        "G" => Color::Green,
        "W" => Color::White,
        "U" => Color::Blue,
        "B" => Color::Black,
        "R" => Color::Red,
        c if c.len() > 1 => Color::Yellow,
        _ => Color::Magenta,
    }
}

/// OSC 8 hyperlink; terminals without support just show `text`
pub fn clickable_link(url: &str, text: &str) -> String {
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, text)
}

/// Scryfall search for the card's name
pub fn card_url(name: &str) -> String {
    format!("https://scryfall.com/search?q={}", name.replace(' ', "+"))
}

pub fn format_rating(field: RatingField, value: f64) -> String {
    match field {
        RatingField::GamesInHandCount => format!("{:.0}", value),
        _ => format!("{:.1}%", value),
    }
}

/// "Name (R) - link", optionally followed by the card's rating
pub fn format_card_line(card: &CardRecord, rating: Option<RatingField>) -> String {
    let link = clickable_link(&card_url(card.name()), "link");
    let base = format!("{} ({}) - {}", card.name(), card.rarity(), link);
    match rating.and_then(|field| card.rating(field).map(|v| (field, v))) {
        Some((field, value)) => format!("{} - {}", base, format_rating(field, value)),
        None => base,
    }
}

fn print_card_line(prefix: &str, card: &CardRecord, rating: Option<RatingField>) {
    let line = format!("{}{}", prefix, format_card_line(card, rating));
    println!("{}", style(line).with(color_for(card.color())));
}

pub fn print_intro(config: &DraftConfig) {
    println!("Welcome to the Limited draft trainer!");
    println!(
        "You will be presented with up to {} packs of cards.",
        config.total_packs
    );
    println!(
        "For each pack, pick {} cards in order of their {}, best first.",
        config.picks_per_pack, config.rating_field
    );
    println!(
        "Match at least {} of {} positions to move on to the next pack.",
        config.advance_threshold, config.picks_per_pack
    );
    println!("Let's begin!\n");
}

pub fn print_pack(display: &PackDisplay) {
    for (index, card) in display.iter() {
        print_card_line(&format!("{}. ", index), card, None);
    }
    println!("- - - - - - - ");
}

pub fn print_pick_summary(evaluation: &PickEvaluation, display: &PackDisplay, field: RatingField) {
    println!("Pick summary:");
    for result in &evaluation.results {
        let prefix = format!("Pick {}: ", result.position);
        let chosen = result.chosen_name.as_deref().and_then(|n| display.find(n));

        match chosen {
            Some(card) if result.is_correct => {
                let line = format!("{}{} - Correct", prefix, format_card_line(card, Some(field)));
                println!("{}", style(line).with(color_for(card.color())));
            }
            Some(card) => print_card_line(&prefix, card, Some(field)),
            None => println!("{}Invalid selection", prefix),
        }

        if !result.is_correct {
            match result.best_name.as_deref().and_then(|n| display.find(n)) {
                Some(best) => print_card_line("\t - Wrong, best pick is: ", best, Some(field)),
                None => println!("\t - Wrong"),
            }
        }
    }
}

/// Low and high tertile cut points of the quiz pool, used to color numeric options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tertiles {
    pub low: f64,
    pub high: f64,
}

impl Tertiles {
    pub fn from_pool(pool: &[CardRecord], field: RatingField) -> Option<Self> {
        let values: Vec<f64> = pool.iter().filter_map(|c| c.rating(field)).collect();
        match percentile_thresholds(&values, 3).as_slice() {
            [low, high] => Some(Tertiles {
                low: *low,
                high: *high,
            }),
            _ => None,
        }
    }

    pub fn color(&self, value: f64) -> Color {
        if value < self.low {
            Color::Red
        } else if value < self.high {
            Color::Yellow
        } else {
            Color::Green
        }
    }
}

/// Letter shown for option `index`: a, b, c, ...
pub fn option_letter(index: usize) -> char {
    (b'a' + (index % 26) as u8) as char
}

pub fn print_round_header(round: usize, pending: usize) {
    println!("\n--- Round {}: {} question(s) ---", round, pending);
}

pub fn print_question_card(question: &Question, number: usize) {
    print_card_line(&format!("{}. ", number), question.card(), None);
}

fn band_range(question: &Question, index: usize) -> String {
    let upper = question.options()[index].value;
    let lower = index
        .checked_sub(1)
        .map(|i| question.options()[i].value);
    match (lower, upper.is_finite()) {
        (None, true) => format!("below {:.1}", upper),
        (None, false) => "any value".to_string(),
        (Some(lo), true) => format!("{:.1} to {:.1}", lo, upper),
        (Some(lo), false) => format!("{:.1} and up", lo),
    }
}

pub fn print_options(question: &Question, style_kind: QuizStyle, tertiles: Option<&Tertiles>) {
    for (i, option) in question.options().iter().enumerate() {
        let letter = option_letter(i);
        match style_kind {
            QuizStyle::Numeric => {
                let line = format!("  {}) {}", letter, option.label);
                match tertiles {
                    Some(t) => println!("{}", style(line).with(t.color(option.value))),
                    None => println!("{}", line),
                }
            }
            QuizStyle::Segment => {
                println!("  {}) {} ({})", letter, option.label, band_range(question, i));
            }
        }
    }
}

pub fn print_feedback(correct: bool) {
    if correct {
        println!("{}", style("Correct").with(Color::Green));
    } else {
        println!("{}", style("Wrong").with(Color::Red));
    }
}

pub fn print_round_summary(report: &RoundReport) {
    println!(
        "You answered {}/{} correct this round.",
        report.correct, report.asked
    );
    if report.wrong() > 0 {
        println!("Repeating wrong questions...\n");
    }
}
