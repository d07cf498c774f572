use crate::quiz::question::{Question, QuestionStrategy};
use crate::rng::TrainerRng;

/// Supplies answers to quiz questions; implemented by the terminal front end
/// and by scripted players in tests.
pub trait Responder {
    /// Index of the chosen option. Must be below `question.option_count()`.
    fn choose(&mut self, question: &Question, number: usize, round: usize) -> usize;

    /// Called right after each answer is graded
    fn on_answer(&mut self, _question: &Question, _chosen: usize, _correct: bool) {}
}

/// Tally of one pass over the pending questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    pub round: usize,
    pub asked: usize,
    pub correct: usize,
}

impl RoundReport {
    pub fn wrong(&self) -> usize {
        self.asked - self.correct
    }
}

/// Repeats missed questions, narrowed, until every question was answered correctly
pub struct QuizSession<'a, S: QuestionStrategy + ?Sized> {
    strategy: &'a S,
    original: Vec<Question>,
    remaining: Vec<Question>,
    round: usize,
    first_round_missed: bool,
}

impl<'a, S: QuestionStrategy + ?Sized> QuizSession<'a, S> {
    pub fn new(strategy: &'a S, questions: Vec<Question>) -> Self {
        QuizSession {
            strategy,
            remaining: questions.clone(),
            original: questions,
            round: 1,
            first_round_missed: false,
        }
    }

    /// Questions still waiting for a correct answer, in asking order
    pub fn remaining(&self) -> &[Question] {
        &self.remaining
    }

    /// Number of the next round to be played (1-based)
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Whether anything was missed in the first round; a restart is only offered then
    pub fn first_round_missed(&self) -> bool {
        self.first_round_missed
    }

    /// Ask every pending question once. Correct ones are done; wrong ones are
    /// narrowed and come back, in shuffled order, next round.
    pub fn play_round<R: Responder + ?Sized>(
        &mut self,
        responder: &mut R,
        rng: &mut TrainerRng,
    ) -> RoundReport {
        let current = std::mem::take(&mut self.remaining);
        let mut wrong = Vec::new();

        for (i, question) in current.iter().enumerate() {
            let chosen = responder.choose(question, i + 1, self.round);
            let correct = question.is_correct(chosen);
            responder.on_answer(question, chosen, correct);
            if !correct {
                wrong.push(self.strategy.narrow(question, chosen));
            }
        }

        let report = RoundReport {
            round: self.round,
            asked: current.len(),
            correct: current.len() - wrong.len(),
        };

        if self.round == 1 && !wrong.is_empty() {
            self.first_round_missed = true;
        }
        rng.shuffle(&mut wrong);
        self.remaining = wrong;
        self.round += 1;
        report
    }

    /// Play rounds until nothing is pending
    pub fn run<R: Responder + ?Sized>(
        &mut self,
        responder: &mut R,
        rng: &mut TrainerRng,
    ) -> Vec<RoundReport> {
        let mut reports = Vec::new();
        while !self.is_complete() {
            reports.push(self.play_round(responder, rng));
        }
        reports
    }

    /// Start over with the original, unnarrowed questions in a fresh order
    pub fn restart(&mut self, rng: &mut TrainerRng) {
        let mut questions = self.original.clone();
        rng.shuffle(&mut questions);
        self.remaining = questions;
        self.round = 1;
        self.first_round_missed = false;
    }
}
