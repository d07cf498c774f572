//! Reading the player's answers from a line-oriented input.
//!
//! Parsers are pure functions; [`Prompter`] wraps them in a loop that keeps
//! asking until the input is usable or the stream ends.

use crate::display::option_letter;
use std::io::{BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("expected exactly {expected} numbers, got {got}")]
    WrongCount { expected: usize, got: usize },
    #[error("{value} is not between 1 and {max}")]
    OutOfRange { value: usize, max: usize },
    #[error("'{0}' is not one of the offered choices")]
    InvalidChoice(String),
    #[error("end of input")]
    Eof,
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl InputError {
    /// Errors that end the prompt loop instead of asking again
    pub fn is_fatal(&self) -> bool {
        matches!(self, InputError::Eof | InputError::IoError(_))
    }
}

/// Parse comma separated 1-based pack positions, e.g. `"3, 1,7"`
pub fn parse_picks(input: &str, expected: usize, pack_len: usize) -> Result<Vec<usize>, InputError> {
    let picks = input
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<usize>()
                .map_err(|_| InputError::NotANumber(part.to_string()))
        })
        .collect::<Result<Vec<usize>, _>>()?;

    if picks.len() != expected {
        return Err(InputError::WrongCount {
            expected,
            got: picks.len(),
        });
    }
    if let Some(&bad) = picks.iter().find(|&&p| p == 0 || p > pack_len) {
        return Err(InputError::OutOfRange {
            value: bad,
            max: pack_len,
        });
    }
    Ok(picks)
}

/// Parse a quiz answer given as a letter (`a`, `b`, ...) or a 1-based number.
/// Returns the 0-based option index.
pub fn parse_answer(input: &str, option_count: usize) -> Result<usize, InputError> {
    let answer = input.trim().to_lowercase();

    if let Ok(number) = answer.parse::<usize>() {
        if number == 0 || number > option_count {
            return Err(InputError::OutOfRange {
                value: number,
                max: option_count,
            });
        }
        return Ok(number - 1);
    }

    let mut chars = answer.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => {
            let index = (c as u8 - b'a') as usize;
            if index < option_count {
                Ok(index)
            } else {
                Err(InputError::InvalidChoice(answer))
            }
        }
        _ => Err(InputError::InvalidChoice(answer)),
    }
}

pub fn parse_yes_no(input: &str) -> Result<bool, InputError> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        other => Err(InputError::InvalidChoice(other.to_string())),
    }
}

/// `a/b/c` for a question with three options
pub fn choice_letters(option_count: usize) -> String {
    (0..option_count)
        .map(|i| option_letter(i).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    fn read_line(&mut self) -> Result<String, InputError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputError::Eof);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Show `prompt` and re-ask until `parse` accepts the line
    pub fn ask<T, F>(&mut self, prompt: &str, parse: F) -> Result<T, InputError>
    where
        F: Fn(&str) -> Result<T, InputError>,
    {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
            let line = self.read_line()?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => writeln!(self.output, "Invalid input: {}. Please try again.", e)?,
            }
        }
    }

    pub fn ask_picks(&mut self, expected: usize, pack_len: usize) -> Result<Vec<usize>, InputError> {
        let prompt = format!(
            "Please enter your selection as {} comma separated numbers (1-{}): ",
            expected, pack_len
        );
        self.ask(&prompt, |line| parse_picks(line, expected, pack_len))
    }

    pub fn ask_answer(&mut self, option_count: usize) -> Result<usize, InputError> {
        let prompt = format!("Your answer ({}): ", choice_letters(option_count));
        self.ask(&prompt, |line| parse_answer(line, option_count))
    }

    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool, InputError> {
        let prompt = format!("{} (y/n): ", question);
        self.ask(&prompt, parse_yes_no)
    }
}
