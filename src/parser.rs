use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::formula::{Clause, Cnf, FormulaError, Literal, VariableParseError};
use crate::prelude::*;

/// Largest variable count accepted from a problem line. Solvers keep one
/// assignment slot per declared variable.
pub const MAX_VARIABLES: usize = 1 << 26;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while opening CNF file '{}'", path.display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("I/O error occurred while reading CNF input"))]
    ReadError { source: std::io::Error },
    #[snafu(display("Invalid literal '{}' found on line {}", token, line))]
    MalformedLiteral {
        line: usize,
        token: String,
        source: VariableParseError,
    },
    #[snafu(display("Non-standard CNF encoding on line {}", line))]
    VariableOutOfRange { line: usize, source: FormulaError },
    #[snafu(display("The last clause is not terminated by '0'"))]
    UnterminatedClause,
    #[snafu(display("Problem line 'p cnf <num_variables> <num_clauses>' is not found"))]
    MalformedProblemDefinition,
    #[snafu(display(
        "Problem line declares {} variables (at most {} are supported)",
        num_variables,
        MAX_VARIABLES
    ))]
    TooManyVariables { num_variables: usize },
}

/// Parses the `p cnf <num_variables> <num_clauses>` line.
fn parse_problem_line(line: &str) -> Result<(usize, usize), Error> {
    let splitted = line.split_whitespace().collect::<Vec<_>>();

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
    ensure!(
        num_variables <= MAX_VARIABLES,
        TooManyVariables { num_variables }
    );

    Ok((num_variables, num_clauses))
}

/// Parses a DIMACS CNF formula.
///
/// Only comments and blank lines may precede the problem line. After it, literals are read
/// as whitespace separated tokens and every `0` closes a clause, so a clause
/// may span several lines.
pub fn parse_reader(reader: impl BufRead) -> Result<Cnf, Error> {
    let mut lines = reader.lines().enumerate();

    let (num_variables, num_clauses) = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line.context(ReadError)?;
                let trimmed = line.trim();
                if trimmed.starts_with('p') {
                    break parse_problem_line(trimmed)?;
                }
                ensure!(
                    trimmed.is_empty() || trimmed.starts_with('c'),
                    MalformedProblemDefinition
                );
            }
            None => return MalformedProblemDefinition.fail(),
        }
    };

    let mut cnf = Cnf::new(num_variables);
    let mut pending = Vec::new();

    for (index, line) in lines {
        let line = line.context(ReadError)?;
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('c') {
            // empty line, comment
            continue;
        }
        if trimmed.starts_with('%') {
            // SATLIB end marker
            break;
        }

        for token in trimmed.split_whitespace() {
            if token == "0" {
                let clause = Clause::new(std::mem::take(&mut pending));
                cnf.add_clause(clause)
                    .context(VariableOutOfRange { line: line_number })?;
            } else {
                pending.push(token.parse::<Literal>().with_context(|| MalformedLiteral {
                    line: line_number,
                    token: token.to_owned(),
                })?);
            }
        }
    }

    ensure!(pending.is_empty(), UnterminatedClause);

    if cnf.clauses().len() != num_clauses {
        warn!(
            "The number of clauses ({}) does not match the clauses number in the problem definition ({})",
            cnf.clauses().len(),
            num_clauses
        );
    }

    Ok(cnf)
}

/// Parses a DIMACS CNF formula held in memory.
pub fn parse_str(input: &str) -> Result<Cnf, Error> {
    parse_reader(input.as_bytes())
}

/// Parses CNF formula from a file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf, Error> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path).context(IoError {
        path: path.to_owned(),
    })?);

    parse_reader(file)
}
