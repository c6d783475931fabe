use std::{fmt::Display, time::Duration};

use crate::formula::{Cnf, Model};

mod brute;
mod dpll;

pub use brute::BruteForceSolver;
pub use dpll::DpllSolver;

pub trait Solver {
    /// Creates a new solver instance.
    fn new(formula: Cnf, limits: Limits) -> Self;

    /// Solves a CNF SAT problem with the solver.
    fn solve(self) -> Outcome;
}

/// Resource limits for a single solve. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    pub max_decisions: Option<u64>,
    pub timeout: Option<Duration>,
}

/// Why a solve stopped before reaching a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abort {
    DecisionLimit,
    Timeout,
    TooManyVariables,
}

impl Display for Abort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Abort::DecisionLimit => write!(f, "decision limit reached"),
            Abort::Timeout => write!(f, "timed out"),
            Abort::TooManyVariables => write!(f, "too many variables"),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Satisfiable(Model),
    Unsatisfiable,
    Unknown(Abort),
}

impl Outcome {
    pub fn is_sat(&self) -> bool {
        matches!(self, Outcome::Satisfiable(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, Outcome::Unsatisfiable)
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            Outcome::Satisfiable(model) => Some(model),
            _ => None,
        }
    }
}

/// Counters collected during a DPLL search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub pure_eliminations: u64,
    pub backtracks: u64,
    /// Deepest choice point stack seen.
    pub max_depth: usize,
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} decisions, {} propagations, {} pure eliminations, {} backtracks, max depth {}",
            self.decisions, self.propagations, self.pure_eliminations, self.backtracks, self.max_depth
        )
    }
}
