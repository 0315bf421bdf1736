/*!
One round of the game: show a random formula, take a SAT / NOT SAT guess, and
grade it against the solver.
*/

use std::{fmt::Display, str::FromStr};

use rand::Rng;

use crate::formula::{Assignment, Formula};
use crate::generator::{GenerateError, GeneratorParams};
use crate::prelude::*;
use crate::solver::Backend;

#[derive(Debug, Snafu)]
pub enum GuessParseError {
    #[snafu(display("Unknown guess '{}' (expected 'sat' or 'unsat')", guess))]
    UnknownGuess { guess: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Sat,
    NotSat,
}

impl FromStr for Guess {
    type Err = GuessParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sat" => Ok(Guess::Sat),
            "unsat" | "not-sat" | "notsat" => Ok(Guess::NotSat),
            _ => UnknownGuess {
                guess: s.to_owned(),
            }
            .fail(),
        }
    }
}

impl Display for Guess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Guess::Sat => write!(f, "SAT"),
            Guess::NotSat => write!(f, "NOT SAT"),
        }
    }
}

/// Graded guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub guess: Guess,
    pub correct: bool,
    /// Ground truth: a satisfying assignment, or `None` when unsatisfiable.
    pub witness: Option<Assignment>,
}

impl Verdict {
    pub fn answer(&self) -> Guess {
        if self.witness.is_some() {
            Guess::Sat
        } else {
            Guess::NotSat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    formula: Formula,
}

impl Puzzle {
    pub fn generate<R: Rng + ?Sized>(
        params: &GeneratorParams,
        rng: &mut R,
    ) -> Result<Self, GenerateError> {
        Ok(Puzzle {
            formula: params.generate(rng)?,
        })
    }

    pub fn from_formula(formula: Formula) -> Self {
        Puzzle { formula }
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Grades `guess` with the default solver.
    pub fn check(&self, guess: Guess) -> Verdict {
        self.check_with(Backend::default(), guess)
    }

    pub fn check_with(&self, backend: Backend, guess: Guess) -> Verdict {
        let witness = backend.solve(&self.formula);
        let correct = match guess {
            Guess::Sat => witness.is_some(),
            Guess::NotSat => witness.is_none(),
        };
        debug!("Guess {} is {}", guess, if correct { "correct" } else { "wrong" });

        Verdict {
            guess,
            correct,
            witness,
        }
    }
}
