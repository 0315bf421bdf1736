use crate::formula::{Assignment, Formula};

use super::Solver;

/// Chronological backtracking without propagation.
///
/// Branches on the lowest-indexed unassigned variable, trying `true` before
/// `false`. Recursion depth is bounded by the number of variables.
#[derive(Debug)]
pub struct BacktrackingSolver<'a> {
    formula: &'a Formula,
    assignment: Assignment,
    decisions: usize,
    backtracks: usize,
}

impl<'a> Solver<'a> for BacktrackingSolver<'a> {
    fn new(formula: &'a Formula) -> Self {
        BacktrackingSolver {
            formula,
            assignment: Assignment::for_formula(formula),
            decisions: 0,
            backtracks: 0,
        }
    }

    fn solve(mut self) -> Option<Assignment> {
        /// Returns true when the current assignment became a witness.
        /// On false, the assignment is exactly as it was on entry.
        fn solve_inner(solver: &mut BacktrackingSolver) -> bool {
            if solver.formula.is_satisfied(&solver.assignment) {
                // Every clause has a true literal, the rest is don't-care.
                return true;
            } else if solver.formula.has_unsatisfied_clause(&solver.assignment) {
                // There is a clause that can be never satisfied.
                return false;
            }

            // A fully assigned formula is always satisfied or falsified.
            let variable = match solver.assignment.first_unassigned() {
                Some(variable) => variable,
                None => unreachable!("undecided formula under a complete assignment"),
            };

            for &value in &[true, false] {
                trace!("Decide {} = {}", variable, value);
                solver.decisions += 1;
                solver.assignment.assign(variable, value);
                if solve_inner(solver) {
                    return true;
                }
            }

            trace!("Backtrack {}", variable);
            solver.backtracks += 1;
            solver.assignment.unassign(variable);

            false
        }

        let satisfiable = solve_inner(&mut self);
        debug!(
            "Backtracking search finished ({}) after {} decisions, {} backtracks",
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
