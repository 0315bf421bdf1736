use crate::formula::{Assignment, Formula, Variable};

use super::Solver;

/// A decision on the search stack.
#[derive(Clone, Copy, Debug)]
struct Frame {
    variable: Variable,
    /// The value currently tried, `true` first.
    value: bool,
}

/// The same search as [`super::BacktrackingSolver`] driven by an explicit stack
/// of decision frames instead of recursion, so stack usage does not grow with
/// the number of variables. Returns the same witness for every formula.
#[derive(Debug)]
pub struct IterativeSolver<'a> {
    formula: &'a Formula,
    assignment: Assignment,
    frames: Vec<Frame>,
    decisions: usize,
    backtracks: usize,
}

impl IterativeSolver<'_> {
    /// Flips the deepest decision still having an untried value, undoing
    /// exhausted ones. Returns false when the stack runs out.
    fn backtrack(&mut self) -> bool {
        while let Some(frame) = self.frames.pop() {
            if frame.value {
                trace!("Decide {} = false", frame.variable);
                self.decisions += 1;
                self.assignment.assign(frame.variable, false);
                self.frames.push(Frame {
                    variable: frame.variable,
                    value: false,
                });
                return true;
            }

            trace!("Backtrack {}", frame.variable);
            self.backtracks += 1;
            self.assignment.unassign(frame.variable);
        }

        false
    }
}

impl<'a> Solver<'a> for IterativeSolver<'a> {
    fn new(formula: &'a Formula) -> Self {
        let num_variables = formula.cardinality();

        IterativeSolver {
            formula,
            assignment: Assignment::new(num_variables),
            frames: Vec::with_capacity(num_variables),
            decisions: 0,
            backtracks: 0,
        }
    }

    fn solve(mut self) -> Option<Assignment> {
        let satisfiable = loop {
            if self.formula.is_satisfied(&self.assignment) {
                break true;
            }

            if !self.formula.has_unsatisfied_clause(&self.assignment) {
                if let Some(variable) = self.assignment.first_unassigned() {
                    trace!("Decide {} = true", variable);
                    self.decisions += 1;
                    self.assignment.assign(variable, true);
                    self.frames.push(Frame {
                        variable,
                        value: true,
                    });
                    continue;
                }
            }

            if !self.backtrack() {
                break false;
            }
        };

        debug!(
            "Iterative search finished ({}) after {} decisions, {} backtracks",
            if satisfiable { "SAT" } else { "UNSAT" },
            self.decisions,
            self.backtracks
        );

        if satisfiable {
            Some(self.assignment)
        } else {
            None
        }
    }
}
