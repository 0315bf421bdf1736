/*!
Random m-SAT instance generation.
*/

use std::{collections::HashSet, convert::TryInto};

use rand::{seq::index, Rng};

use crate::formula::{Clause, Formula, FormulaError, Literal, Variable};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum GenerateError {
    #[snafu(display(
        "Generator parameters must be positive (got {} variables, {} literals per clause, {} clauses)",
        num_variables,
        clause_arity,
        num_clauses
    ))]
    EmptyParameter {
        num_variables: usize,
        clause_arity: usize,
        num_clauses: usize,
    },
    #[snafu(display(
        "Variable count {} is out of range (must be within 1 to {})",
        num_variables,
        Variable::MAX_VARIABLE_ID
    ))]
    TooManyVariables { num_variables: usize },
    #[snafu(display(
        "Clauses of {} distinct variables need at least {} variables, got {}",
        clause_arity,
        clause_arity,
        num_variables
    ))]
    ArityExceedsVariables {
        num_variables: usize,
        clause_arity: usize,
    },
    #[snafu(display(
        "Cannot draw {} distinct clauses of {} literals over {} variables (only {} exist)",
        num_clauses,
        clause_arity,
        num_variables,
        available
    ))]
    TooManyClauses {
        num_variables: usize,
        clause_arity: usize,
        num_clauses: usize,
        available: usize,
    },
    #[snafu(display("Generated clauses do not form a valid formula"))]
    InvalidInstance { source: FormulaError },
}

/// Shape of the instances to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorParams {
    /// Variables are drawn from `x1..=x{num_variables}`.
    pub num_variables: usize,
    /// Literals per clause.
    pub clause_arity: usize,
    /// Clauses per instance.
    pub num_clauses: usize,
    /// Draw the variables of a clause without repetition.
    pub distinct_variables: bool,
}

impl GeneratorParams {
    pub fn new(num_variables: usize, clause_arity: usize, num_clauses: usize) -> Self {
        GeneratorParams {
            num_variables,
            clause_arity,
            num_clauses,
            distinct_variables: false,
        }
    }

    pub fn with_distinct_variables(self, distinct_variables: bool) -> Self {
        GeneratorParams {
            distinct_variables,
            ..self
        }
    }

    /// Number of distinct clause tuples: `(2n)^m`, or `n!/(n-m)! * 2^m` without
    /// repeated variables. `None` when it overflows.
    fn distinct_clauses(&self) -> Option<usize> {
        let exponent = self.clause_arity.try_into().ok()?;
        if self.distinct_variables {
            let first = self.num_variables - self.clause_arity + 1;
            let permutations = (first..=self.num_variables)
                .try_fold(1usize, |acc, factor| acc.checked_mul(factor))?;
            permutations.checked_mul(2usize.checked_pow(exponent)?)
        } else {
            self.num_variables.checked_mul(2)?.checked_pow(exponent)
        }
    }

    /// Rejects parameters for which generation could not terminate.
    pub fn validate(&self) -> Result<(), GenerateError> {
        ensure!(
            self.num_variables > 0 && self.clause_arity > 0 && self.num_clauses > 0,
            EmptyParameter {
                num_variables: self.num_variables,
                clause_arity: self.clause_arity,
                num_clauses: self.num_clauses,
            }
        );
        ensure!(
            self.num_variables <= Variable::MAX_VARIABLE_ID,
            TooManyVariables {
                num_variables: self.num_variables,
            }
        );
        ensure!(
            !self.distinct_variables || self.clause_arity <= self.num_variables,
            ArityExceedsVariables {
                num_variables: self.num_variables,
                clause_arity: self.clause_arity,
            }
        );
        if let Some(available) = self.distinct_clauses() {
            ensure!(
                self.num_clauses <= available,
                TooManyClauses {
                    num_variables: self.num_variables,
                    clause_arity: self.clause_arity,
                    num_clauses: self.num_clauses,
                    available,
                }
            );
        }

        Ok(())
    }

    /// Draws a random formula.
    ///
    /// Each literal picks its variable uniformly from `x1..=xn` and is negated with
    /// probability 1/2. A clause equal to an earlier one (same literals, same order,
    /// same signs) is redrawn. The variables that were drawn are then renumbered
    /// `x1..=xN` in increasing order, so the numbering has no gaps and `N <= n`.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Formula, GenerateError> {
        self.validate()?;

        let clauses = self.draw_clauses(rng);
        let formula = Formula::new(self.renumber(clauses)).context(InvalidInstance)?;
        debug!(
            "Generated {} clauses over {} of {} variables",
            formula.clauses().len(),
            formula.cardinality(),
            self.num_variables
        );

        Ok(formula)
    }

    fn draw_clause<R: Rng + ?Sized>(&self, rng: &mut R) -> Clause {
        let indices = if self.distinct_variables {
            index::sample(rng, self.num_variables, self.clause_arity).into_vec()
        } else {
            (0..self.clause_arity)
                .map(|_| rng.gen_range(0..self.num_variables))
                .collect()
        };

        Clause::new(
            indices
                .into_iter()
                .map(|index| Literal::new(Variable::from(index), rng.gen_bool(0.5)))
                .collect(),
        )
    }

    fn draw_clauses<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Clause> {
        let mut clauses = Vec::with_capacity(self.num_clauses);
        let mut used_clauses = HashSet::with_capacity(self.num_clauses);

        while clauses.len() < self.num_clauses {
            let clause = self.draw_clause(rng);
            if used_clauses.insert(clause.clone()) {
                clauses.push(clause);
            } else {
                trace!("Redrawing duplicate clause {}", clause);
            }
        }

        clauses
    }

    /// Maps the drawn variables onto `x1..=xN`, keeping their relative order.
    /// The mapping is one-to-one, so distinct clauses stay distinct.
    fn renumber(&self, clauses: Vec<Clause>) -> Vec<Clause> {
        let mut used = vec![false; self.num_variables];
        for literal in clauses.iter().flat_map(Clause::iter) {
            used[literal.variable().as_index()] = true;
        }

        let mut renumbered = vec![0; self.num_variables];
        let mut next = 0;
        for (index, &used) in used.iter().enumerate() {
            if used {
                renumbered[index] = next;
                next += 1;
            }
        }
        if next < self.num_variables {
            trace!("Renumbered {} used variables to x1..=x{}", next, next);
        }

        clauses
            .iter()
            .map(|clause| {
                Clause::new(
                    clause
                        .iter()
                        .map(|literal| {
                            let index = renumbered[literal.variable().as_index()];
                            Literal::new(Variable::from(index), literal.positive())
                        })
                        .collect(),
                )
            })
            .collect()
    }
}

impl Default for GeneratorParams {
    /// The game's puzzle shape: 3 variables, 3 literals per clause, 6 clauses.
    fn default() -> Self {
        GeneratorParams::new(3, 3, 6)
    }
}

/// Draws `num_clauses` distinct clauses of `clause_arity` literals over `num_variables` variables.
pub fn generate<R: Rng + ?Sized>(
    num_variables: usize,
    clause_arity: usize,
    num_clauses: usize,
    rng: &mut R,
) -> Result<Formula, GenerateError> {
    GeneratorParams::new(num_variables, clause_arity, num_clauses).generate(rng)
}
