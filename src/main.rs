use clap::{Parser, Subcommand};
use limited_trainer::card::{
    filter_by_rarity, CardRecord, CardRepository, CsvCardRepository, Rarity, RatingField,
};
use limited_trainer::cli::{InputError, Prompter};
use limited_trainer::config::{Difficulty, QuizStyle, TrainerConfig};
use limited_trainer::display::{self, Tertiles};
use limited_trainer::draft::{play_draft, DraftSimulator};
use limited_trainer::quiz::{build_strategy, Question, QuizSession, Responder};
use limited_trainer::rng::TrainerRng;
use std::collections::HashSet;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "limited-trainer")]
#[command(about = "Limited draft pick trainer and card rating quiz", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Seed for random number generator (for reproducibility)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set code whose ratings are loaded
    #[arg(long)]
    set: Option<String>,

    /// Directory containing sets/<set>/card-ratings-YYYY-MM-DD.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick the best cards of each pack in order (default)
    Draft {
        /// Number of packs to play
        #[arg(short, long)]
        packs: Option<usize>,

        /// Rating used to rank the cards
        #[arg(short, long, value_enum)]
        rating_field: Option<RatingField>,
    },

    /// Guess card ratings until every answer is right
    Quiz {
        /// Card rarities to include (e.g. C U)
        #[arg(long, num_args = 1..)]
        rarities: Option<Vec<Rarity>>,

        /// Rating the questions ask about
        #[arg(short, long, value_enum)]
        rating_field: Option<RatingField>,

        /// Number of cards in the quiz
        #[arg(short, long)]
        num_questions: Option<usize>,

        /// Options per numeric question
        #[arg(long)]
        choices: Option<usize>,

        #[arg(short, long, value_enum)]
        difficulty: Option<Difficulty>,

        /// Numeric values or labeled percentile bands
        #[arg(long, value_enum)]
        style: Option<QuizStyle>,

        /// Pause in milliseconds between a card and its options
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

fn fail(message: impl Display) -> ! {
    eprintln!("✗ {}", message);
    std::process::exit(1);
}

/// Line announcing the generated seed of an unseeded run, so it can be replayed with `--seed`
fn seed_banner(requested: Option<u64>, rng: &TrainerRng) -> Option<String> {
    match requested {
        Some(_) => None,
        None => Some(format!("Seed: {}", rng.seed())),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "limited_trainer=debug"
    } else {
        "limited_trainer=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match TrainerConfig::from_file(path) {
            Ok(config) => {
                eprintln!("✓ Loaded settings from {}", path.display());
                config
            }
            Err(e) => fail(format!("Failed to load settings from {}: {}", path.display(), e)),
        },
        None => TrainerConfig::default(),
    };
    if let Some(set) = &cli.set {
        config.set_code = set.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }

    let command = cli.command.unwrap_or(Commands::Draft {
        packs: None,
        rating_field: None,
    });
    let is_quiz = matches!(command, Commands::Quiz { .. });
    apply_overrides(&mut config, command);
    if let Err(e) = config.validate() {
        fail(e);
    }

    let repository = CsvCardRepository::new(&config.data_dir, config.stale_cutoff_days);
    let mut rng = TrainerRng::new(cli.seed);
    if let Some(banner) = seed_banner(cli.seed, &rng) {
        eprintln!("{}", banner);
    }

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    let result = if is_quiz {
        run_quiz(&config, &repository, &mut prompter, &mut rng)
    } else {
        run_draft(&config, &repository, &mut prompter, &mut rng)
    };
    if let Err(e) = result {
        fail(e);
    }
}

fn apply_overrides(config: &mut TrainerConfig, command: Commands) {
    match command {
        Commands::Draft {
            packs,
            rating_field,
        } => {
            if let Some(packs) = packs {
                config.draft.total_packs = packs;
            }
            if let Some(field) = rating_field {
                config.draft.rating_field = field;
            }
        }
        Commands::Quiz {
            rarities,
            rating_field,
            num_questions,
            choices,
            difficulty,
            style,
            delay_ms,
        } => {
            let quiz = &mut config.quiz;
            if let Some(rarities) = rarities {
                quiz.rarities = rarities;
            }
            if let Some(field) = rating_field {
                quiz.rating_field = field;
            }
            if let Some(n) = num_questions {
                quiz.num_questions = n;
            }
            if let Some(n) = choices {
                quiz.num_choices = n;
            }
            if let Some(d) = difficulty {
                quiz.difficulty = d;
            }
            if let Some(s) = style {
                quiz.style = s;
            }
            if let Some(ms) = delay_ms {
                quiz.answer_delay_ms = ms;
            }
        }
    }
}

fn load_cards(
    repository: &impl CardRepository,
    set_code: &str,
    field: RatingField,
) -> (Vec<CardRecord>, HashSet<String>) {
    let cards = match repository.load_card_data(set_code, field) {
        Ok(cards) => {
            eprintln!("✓ Loaded {} cards for {} with a {} rating", cards.len(), set_code, field);
            cards
        }
        Err(e) => fail(format!("Failed to load cards: {}", e)),
    };
    let exclude = match repository.load_exclude_list(set_code) {
        Ok(exclude) => exclude,
        Err(e) => fail(format!("Failed to load exclude list: {}", e)),
    };
    (cards, exclude)
}

fn run_draft<R: BufRead, W: Write>(
    config: &TrainerConfig,
    repository: &impl CardRepository,
    prompter: &mut Prompter<R, W>,
    rng: &mut TrainerRng,
) -> Result<(), InputError> {
    let draft = &config.draft;
    let (cards, exclude) = load_cards(repository, &config.set_code, draft.rating_field);
    let commons = filter_by_rarity(&cards, Rarity::Common);
    let uncommons = filter_by_rarity(&cards, Rarity::Uncommon);

    let simulator = DraftSimulator::new(draft.clone());
    display::print_intro(draft);

    let outcome = play_draft(&simulator, &commons, &uncommons, &exclude, prompter, rng)?;
    println!(
        "Overall score: {}/{}",
        outcome.total_score,
        simulator.max_possible_score(draft.total_packs)
    );
    Ok(())
}

/// Asks quiz questions on the terminal
struct TerminalResponder<'a, R, W> {
    prompter: &'a mut Prompter<R, W>,
    style: QuizStyle,
    tertiles: Option<Tertiles>,
    delay: Duration,
}

impl<R: BufRead, W: Write> Responder for TerminalResponder<'_, R, W> {
    fn choose(&mut self, question: &Question, number: usize, _round: usize) -> usize {
        display::print_question_card(question, number);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        display::print_options(question, self.style, self.tertiles.as_ref());

        match self.prompter.ask_answer(question.option_count()) {
            Ok(chosen) => chosen,
            Err(e) => fail(e),
        }
    }

    fn on_answer(&mut self, _question: &Question, _chosen: usize, correct: bool) {
        display::print_feedback(correct);
    }
}

fn run_quiz<R: BufRead, W: Write>(
    config: &TrainerConfig,
    repository: &impl CardRepository,
    prompter: &mut Prompter<R, W>,
    rng: &mut TrainerRng,
) -> Result<(), InputError> {
    let quiz = &config.quiz;
    let (cards, exclude) = load_cards(repository, &config.set_code, quiz.rating_field);
    let pool: Vec<CardRecord> = cards
        .into_iter()
        .filter(|card| quiz.rarities.contains(&card.rarity()))
        .filter(|card| !exclude.contains(card.name()))
        .collect();

    let strategy = build_strategy(quiz);
    let questions = match strategy.generate(&pool, rng) {
        Ok(questions) => questions,
        Err(e) => fail(e),
    };

    let mut session = QuizSession::new(strategy.as_ref(), questions);
    let mut responder = TerminalResponder {
        prompter,
        style: quiz.style,
        tertiles: Tertiles::from_pool(&pool, quiz.rating_field),
        delay: Duration::from_millis(quiz.answer_delay_ms),
    };

    println!(
        "Rate {} cards by their {}. Missed cards come back with fewer options.",
        session.remaining().len(),
        quiz.rating_field
    );
    loop {
        while !session.is_complete() {
            display::print_round_header(session.round(), session.remaining().len());
            let report = session.play_round(&mut responder, rng);
            display::print_round_summary(&report);
        }
        println!("Quiz complete!");

        if !session.first_round_missed()
            || !responder.prompter.ask_yes_no("Restart the quiz with the same cards?")?
        {
            break;
        }
        session.restart(rng);
    }
    Ok(())
}
