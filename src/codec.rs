/*!
Lossless text encoding of formulas and assignments, for passing problem state
through request parameters.

- clause: signed literals joined by `.`, e.g. `1.-2.3`
- formula: clauses joined by `,`, e.g. `1.-2.3,-1.2.2`
- assignment: one of `T`, `F`, `_` (unassigned) per variable, in index order
*/

use crate::formula::{Assignment, Clause, Formula, FormulaError, Literal, VariableParseError};
use crate::prelude::*;

pub const LITERAL_SEPARATOR: &str = ".";
pub const CLAUSE_SEPARATOR: &str = ",";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Invalid literal in encoded clause '{}'", clause))]
    MalformedLiteral {
        clause: String,
        source: VariableParseError,
    },
    #[snafu(display("Encoded formula '{}' violates a formula invariant", formula))]
    InvalidFormula {
        formula: String,
        source: FormulaError,
    },
    #[snafu(display("Unexpected character '{}' in encoded assignment", found))]
    MalformedValue { found: char },
}

pub fn encode_clause(clause: &Clause) -> String {
    clause
        .iter()
        .map(|literal| literal.to_dimacs().to_string())
        .collect::<Vec<_>>()
        .join(LITERAL_SEPARATOR)
}

pub fn parse_clause(encoded: &str) -> Result<Clause, Error> {
    let literals = encoded
        .split(LITERAL_SEPARATOR)
        .map(|s| {
            s.parse::<Literal>().with_context(|| MalformedLiteral {
                clause: encoded.to_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Clause::new(literals))
}

pub fn encode_formula(formula: &Formula) -> String {
    formula
        .clauses()
        .iter()
        .map(encode_clause)
        .collect::<Vec<_>>()
        .join(CLAUSE_SEPARATOR)
}

/// Parses one encoded clause per item, the shape of repeated query parameters.
pub fn parse_clauses<'s>(encoded: impl IntoIterator<Item = &'s str>) -> Result<Formula, Error> {
    let encoded = encoded.into_iter().collect::<Vec<_>>();
    let clauses = encoded
        .iter()
        .map(|clause| parse_clause(clause))
        .collect::<Result<Vec<_>, _>>()?;

    Formula::new(clauses).with_context(|| InvalidFormula {
        formula: encoded.join(CLAUSE_SEPARATOR),
    })
}

pub fn parse_formula(encoded: &str) -> Result<Formula, Error> {
    parse_clauses(encoded.split(CLAUSE_SEPARATOR))
}

pub fn encode_assignment(assignment: &Assignment) -> String {
    assignment
        .iter()
        .map(|(_, value)| match value {
            Some(true) => 'T',
            Some(false) => 'F',
            None => '_',
        })
        .collect()
}

pub fn parse_assignment(encoded: &str) -> Result<Assignment, Error> {
    let values = encoded
        .chars()
        .map(|c| match c {
            'T' => Ok(Some(true)),
            'F' => Ok(Some(false)),
            '_' => Ok(None),
            found => MalformedValue { found }.fail(),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Assignment::from_values(values))
}
