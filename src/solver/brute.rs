use std::time::Instant;

use crate::formula::{Cnf, Model};

use super::{Abort, Limits, Outcome, Solver};

/// Tries every assignment in turn. Only meant for small formulas, as a
/// reference to check other solvers against.
#[derive(Debug)]
pub struct BruteForceSolver {
    formula: Cnf,
    limits: Limits,
}

impl BruteForceSolver {
    pub const MAX_VARIABLES: usize = 24;

    /// Checks `formula` against the assignment encoded in the bits of `bits`,
    /// bit `i` holding the value of the variable with index `i`.
    fn satisfied_by(formula: &Cnf, bits: u64) -> bool {
        formula.clauses().iter().all(|clause| {
            clause.iter().any(|literal| {
                let value = (bits >> literal.variable().as_index()) & 1 == 1;
                value == literal.positive()
            })
        })
    }
}

impl Solver for BruteForceSolver {
    fn new(formula: Cnf, limits: Limits) -> Self {
        BruteForceSolver { formula, limits }
    }

    fn solve(self) -> Outcome {
        let num_variables = self.formula.num_variables();
        if num_variables > Self::MAX_VARIABLES {
            warn!(
                "Brute force refuses {} variables (at most {})",
                num_variables,
                Self::MAX_VARIABLES
            );
            return Outcome::Unknown(Abort::TooManyVariables);
        }

        let started = Instant::now();
        for bits in 0..(1u64 << num_variables) {
            if bits % 4096 == 0 {
                if let Some(timeout) = self.limits.timeout {
                    if started.elapsed() >= timeout {
                        return Outcome::Unknown(Abort::Timeout);
                    }
                }
            }

            if Self::satisfied_by(&self.formula, bits) {
                debug!("assignment {:#b} satisfies the formula", bits);
                let assignment = (0..num_variables)
                    .map(|index| Some((bits >> index) & 1 == 1))
                    .collect();
                return Outcome::Satisfiable(Model::new(self.formula, assignment));
            }
        }

        Outcome::Unsatisfiable
    }
}
