/*!
A module to represent conjunctive normal form formulas and partial assignments.
*/

use std::{convert::TryInto, fmt::Display, num::NonZeroU32, str::FromStr};

use typed_index_collections::TiVec;

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum VariableParseError {
    #[snafu(display("Failed to parse literal"))]
    ParseIntError { source: std::num::ParseIntError },
    #[snafu(display(
        "Literal {} is out of range (variable ID must be within 1 to {})",
        num,
        Variable::MAX_VARIABLE_ID
    ))]
    RangeError { num: i64 },
}

#[derive(Debug, Snafu)]
pub enum FormulaError {
    #[snafu(display("Formula does not mention any variable"))]
    NoVariables,
    #[snafu(display(
        "Clause #{} has {} literals, but the formula uses {} literals per clause",
        index,
        found,
        expected
    ))]
    RaggedClause {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display(
        "Variable x{} never appears although the formula has {} variables",
        missing,
        cardinality
    ))]
    NumberingGap { missing: usize, cardinality: usize },
}

/// Newtype wrapper for variable ID.
/// Invariant: 0 < ID <= MAX_VARIABLE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(NonZeroU32);

impl Variable {
    pub const MAX_VARIABLE_ID: usize = std::i32::MAX as usize;
}

impl Variable {
    /// Creates a variable from its 1-based ID.
    /// Returns `None` if the ID is zero or too large.
    pub fn new(id: usize) -> Option<Self> {
        if id > Variable::MAX_VARIABLE_ID {
            return None;
        }
        Some(Variable(NonZeroU32::new(id.try_into().ok()?)?))
    }

    pub fn id(&self) -> usize {
        self.0.get() as usize
    }

    pub fn as_index(&self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Creates a variable from a raw index.
    /// Returns `None` if the index is invalid.
    pub fn from_index(index: usize) -> Option<Self> {
        Variable::new(index.checked_add(1)?)
    }
}

// Keys for `TiVec`. Indices handed out by a `TiVec` always fit.
impl From<usize> for Variable {
    fn from(index: usize) -> Self {
        Variable::from_index(index).expect("variable index out of range")
    }
}

impl From<Variable> for usize {
    fn from(variable: Variable) -> Self {
        variable.as_index()
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    id: Variable,
    positive: bool,
}

impl Literal {
    pub fn new(id: Variable, positive: bool) -> Self {
        Literal { id, positive }
    }

    /// Converts a signed, nonzero integer (DIMACS convention) into a literal.
    pub fn from_dimacs(num: i64) -> Option<Self> {
        let id = Variable::new(num.checked_abs()?.try_into().ok()?)?;
        Some(Literal::new(id, num > 0))
    }

    pub fn to_dimacs(&self) -> i64 {
        let id = self.id.id() as i64;
        if self.positive {
            id
        } else {
            -id
        }
    }

    pub fn variable(&self) -> Variable {
        self.id
    }

    pub fn positive(&self) -> bool {
        self.positive
    }

    /// Value of the literal under a partial assignment, `None` while its variable is unassigned.
    ///
    /// # Panics
    ///
    /// Panics when the variable lies outside of `assignment`.
    pub fn evaluate(&self, assignment: &Assignment) -> Option<bool> {
        assignment.get(self.id).map(|val| val ^ !self.positive)
    }
}

impl FromStr for Literal {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s.parse::<i64>().context(ParseIntError)?;
        Literal::from_dimacs(num).context(RangeError { num })
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", if self.positive { "" } else { "¬" }, self.id)
    }
}

/// Disjunction of literals, in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    pub fn num_literals(&self) -> usize {
        self.literals.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.iter().copied()
    }

    /// True iff some literal is true. Unassigned literals are no witness.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.iter()
            .any(|literal| literal.evaluate(assignment) == Some(true))
    }

    /// True iff every literal is false.
    ///
    /// A clause with unassigned literals and no true literal is neither
    /// satisfied nor unsatisfied.
    pub fn is_unsatisfied(&self, assignment: &Assignment) -> bool {
        self.iter()
            .all(|literal| literal.evaluate(assignment) == Some(false))
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;

        let mut iter = self.literals.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for literal in iter {
            write!(f, " ∨ {}", literal)?;
        }

        write!(f, ")")?;

        Ok(())
    }
}

/// Formula representation in Conjunctive Normal Form.
///
/// Invariants, checked by [`Formula::new`]:
/// - every clause has the same number of literals,
/// - variables are numbered densely: with `N` the highest variable ID, each of
///   `x1..=xN` appears in some clause,
/// - `N > 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    num_variables: usize,
    clauses: Vec<Clause>,
}

impl Formula {
    pub fn new(clauses: Vec<Clause>) -> Result<Self, FormulaError> {
        let arity = clauses.first().map(Clause::num_literals).context(NoVariables)?;
        for (index, clause) in clauses.iter().enumerate() {
            ensure!(
                clause.num_literals() == arity,
                RaggedClause {
                    index,
                    expected: arity,
                    found: clause.num_literals(),
                }
            );
        }

        let num_variables = clauses
            .iter()
            .flat_map(Clause::iter)
            .map(|literal| literal.variable().id())
            .max()
            .context(NoVariables)?;

        let mut seen = vec![false; num_variables];
        for literal in clauses.iter().flat_map(Clause::iter) {
            seen[literal.variable().as_index()] = true;
        }
        if let Some(index) = seen.iter().position(|&seen| !seen) {
            return NumberingGap {
                missing: index + 1,
                cardinality: num_variables,
            }
            .fail();
        }

        Ok(Formula {
            num_variables,
            clauses,
        })
    }

    /// Number of variables, i.e. the highest variable ID in the formula.
    pub fn cardinality(&self) -> usize {
        self.num_variables
    }

    /// Number of literals in each clause.
    pub fn arity(&self) -> usize {
        self.clauses[0].num_literals()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> {
        (0..self.num_variables).map(Variable::from)
    }

    /// True iff every clause is satisfied.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.is_satisfied(assignment))
    }

    /// True iff some clause is unsatisfied.
    pub fn has_unsatisfied_clause(&self, assignment: &Assignment) -> bool {
        self.clauses
            .iter()
            .any(|clause| clause.is_unsatisfied(assignment))
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CNF with {} variables (", self.num_variables)?;

        let mut iter = self.clauses.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for clause in iter {
            write!(f, " ∧ {}", clause)?;
        }

        write!(f, ")")?;

        Ok(())
    }
}

/// Partial map from variables `x1..=xN` to truth values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: TiVec<Variable, Option<bool>>,
}

impl Assignment {
    /// Creates an assignment of `num_variables` unassigned variables.
    pub fn new(num_variables: usize) -> Self {
        Assignment {
            values: TiVec::from(vec![None; num_variables]),
        }
    }

    pub fn for_formula(formula: &Formula) -> Self {
        Assignment::new(formula.cardinality())
    }

    pub fn from_values(values: Vec<Option<bool>>) -> Self {
        Assignment {
            values: TiVec::from(values),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, variable: Variable) -> Option<bool> {
        self.values[variable]
    }

    pub fn assign(&mut self, variable: Variable, value: bool) {
        self.values[variable] = Some(value);
    }

    pub fn unassign(&mut self, variable: Variable) {
        self.values[variable] = None;
    }

    /// Lowest-indexed unassigned variable.
    pub fn first_unassigned(&self) -> Option<Variable> {
        self.values
            .iter_enumerated()
            .find(|(_, value)| value.is_none())
            .map(|(variable, _)| variable)
    }

    /// True when no variable is left unassigned.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, Option<bool>)> + '_ {
        self.values
            .iter_enumerated()
            .map(|(variable, &value)| (variable, value))
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Assignment:")?;
        for (variable, value) in self.iter() {
            match value {
                Some(val) => write!(f, "\n  {}: {}", variable, val)?,
                None => write!(f, "\n  {}: unassigned", variable)?,
            }
        }

        Ok(())
    }
}
