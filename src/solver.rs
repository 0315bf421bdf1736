use crate::formula::{Assignment, Formula};

mod backtrack;
mod iterative;

pub use backtrack::BacktrackingSolver;
pub use iterative::IterativeSolver;

pub trait Solver<'a> {
    /// Creates a new solver instance over a borrowed formula.
    fn new(formula: &'a Formula) -> Self;

    /// Solves a CNF SAT problem with the solver.
    /// Returns a satisfying `Some(Assignment)` if satisfiable, `None` otherwise.
    ///
    /// The witness may leave variables unassigned when their value does not matter.
    fn solve(self) -> Option<Assignment>;
}

/// Decides `formula` with the recursive backtracking search.
pub fn solve(formula: &Formula) -> Option<Assignment> {
    BacktrackingSolver::new(formula).solve()
}

/// Runtime choice of solver, for callers that pick one by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Backtracking,
    Iterative,
}

impl Backend {
    pub const NAMES: &'static [&'static str] = &["backtrack", "iterative"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "backtrack" => Some(Backend::Backtracking),
            "iterative" => Some(Backend::Iterative),
            _ => None,
        }
    }

    pub fn solve(self, formula: &Formula) -> Option<Assignment> {
        match self {
            Backend::Backtracking => BacktrackingSolver::new(formula).solve(),
            Backend::Iterative => IterativeSolver::new(formula).solve(),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Backtracking
    }
}
