pub mod game;
pub mod pack;
pub mod scoring;

pub use game::{play_draft, DraftEnd, DraftOutcome};
pub use pack::{DraftRound, DraftSimulator, Pack, PackDisplay};
pub use scoring::{evaluate_picks, PickEvaluation, PickResult};
