use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use crate::formula::{Clause, Formula, FormulaError, Literal, VariableParseError};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to open CNF file '{}'", path.display()))]
    OpenError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("I/O error occurred while reading CNF input"))]
    ReadError { source: std::io::Error },
    #[snafu(display("Failed to parse line '{}' as clause", clause))]
    MalformedClause { clause: String },
    #[snafu(display("Invalid variable found in clause '{}'", clause))]
    MalformedVariable {
        clause: String,
        source: VariableParseError,
    },
    #[snafu(display(
        "Literal {} in clause '{}' exceeds the {} declared variables",
        literal,
        clause,
        num_variables
    ))]
    UndeclaredVariable {
        clause: String,
        literal: i64,
        num_variables: usize,
    },
    #[snafu(display("Problem line 'p cnf <num_variables> <num_clauses>' is not found"))]
    MalformedProblemDefinition,
    #[snafu(display(
        "The number of clauses ({}) does not match the clauses number in the problem definition ({})",
        found,
        expected,
    ))]
    ClauseCountMismatch { expected: usize, found: usize },
    #[snafu(display("CNF input is not a valid formula"))]
    InvalidFormula { source: FormulaError },
}

/// Parse a line to a clause
fn parse_line(line: &str, num_variables: usize) -> Result<Clause, Error> {
    let mut literals = Vec::new();

    let splitted = line.split_whitespace().collect::<Vec<_>>();

    ensure!(
        !splitted.is_empty() && splitted[splitted.len() - 1] == "0",
        MalformedClause {
            clause: line.to_owned(),
        }
    );

    for s in &splitted[..splitted.len() - 1] {
        let literal = s.parse::<Literal>().with_context(|| MalformedVariable {
            clause: line.to_owned(),
        })?;
        ensure!(
            literal.variable().id() <= num_variables,
            UndeclaredVariable {
                clause: line.to_owned(),
                literal: literal.to_dimacs(),
                num_variables,
            }
        );
        literals.push(literal);
    }

    Ok(Clause::new(literals))
}

/// Parses DIMACS CNF from a reader
pub fn parse_reader(reader: impl Read) -> Result<Formula, Error> {
    let lines = BufReader::new(reader)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .context(ReadError)?;

    // skip until we find the problem definition
    let mut lines = lines
        .iter()
        .map(|line| line.trim())
        .skip_while(|line| !line.starts_with('p'));

    let prob_line = lines.next().context(MalformedProblemDefinition)?;

    let splitted = prob_line.split_whitespace().collect::<Vec<_>>();

    // We only support CNF DIMACS format
    ensure!(
        splitted.len() == 4 && splitted[0] == "p" && splitted[1] == "cnf",
        MalformedProblemDefinition
    );

    let (num_variables, num_clauses) =
        match (splitted[2].parse::<usize>(), splitted[3].parse::<usize>()) {
            (Ok(num_variables), Ok(num_clauses)) => (num_variables, num_clauses),
            _ => return MalformedProblemDefinition.fail(),
        };

    let mut clauses = Vec::with_capacity(num_clauses);

    for line in lines {
        if line.is_empty() || line.starts_with('c') {
            // empty line, comment
            continue;
        }
        clauses.push(parse_line(line, num_variables)?);
    }

    ensure!(
        clauses.len() == num_clauses,
        ClauseCountMismatch {
            found: clauses.len(),
            expected: num_clauses,
        }
    );

    let formula = Formula::new(clauses).context(InvalidFormula)?;
    if formula.cardinality() < num_variables {
        warn!(
            "Problem line declares {} variables, but only {} are used",
            num_variables,
            formula.cardinality()
        );
    }

    Ok(formula)
}

pub fn parse_str(text: &str) -> Result<Formula, Error> {
    parse_reader(text.as_bytes())
}

/// Parses CNF formula from a file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Formula, Error> {
    let path = path.as_ref();
    let file = File::open(path).context(OpenError {
        path: path.to_owned(),
    })?;

    parse_reader(file)
}
