/*!
Human-readable rendering of formulas and assignments.

Variables `x1..=x26` are named `a..=z`; a negated literal is prefixed with `!`.
*/

use crate::formula::{Assignment, Clause, Formula, Literal, Variable};
use crate::prelude::*;

pub const OR_SYMBOL: &str = "∨";
pub const AND_SYMBOL: &str = "∧";

/// Number of variables with a display name.
pub const MAX_NAMED_VARIABLES: usize = 26;

#[derive(Debug, Snafu)]
pub enum RenderError {
    #[snafu(display(
        "Variable {} has no display name (only {} variables can be rendered)",
        variable,
        MAX_NAMED_VARIABLES
    ))]
    Unnamed { variable: Variable },
}

pub fn variable_name(variable: Variable) -> Result<char, RenderError> {
    ensure!(variable.id() <= MAX_NAMED_VARIABLES, Unnamed { variable });
    Ok((b'a' + variable.as_index() as u8) as char)
}

pub fn literal_name(literal: Literal) -> Result<String, RenderError> {
    let name = variable_name(literal.variable())?;
    Ok(if literal.positive() {
        name.to_string()
    } else {
        format!("!{}", name)
    })
}

/// Renders a clause as `(a | !b | c)` for `or_symbol = "|"`.
pub fn render_clause(clause: &Clause, or_symbol: &str) -> Result<String, RenderError> {
    let names = clause
        .iter()
        .map(literal_name)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", names.join(format!(" {} ", or_symbol).as_str())))
}

/// Renders every clause and joins them with `and_symbol`.
pub fn render(formula: &Formula, or_symbol: &str, and_symbol: &str) -> Result<String, RenderError> {
    let clauses = formula
        .clauses()
        .iter()
        .map(|clause| render_clause(clause, or_symbol))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clauses.join(format!(" {} ", and_symbol).as_str()))
}

/// Renders a witness as `a = true, b = false, c = ?`.
pub fn render_assignment(assignment: &Assignment) -> Result<String, RenderError> {
    let entries = assignment
        .iter()
        .map(|(variable, value)| -> Result<String, RenderError> {
            let value = match value {
                Some(true) => "true",
                Some(false) => "false",
                None => "?",
            };
            Ok(format!("{} = {}", variable_name(variable)?, value))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries.join(", "))
}
