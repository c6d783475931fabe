use std::time::Instant;

use typed_index_collections::TiVec;

use crate::formula::{Cnf, Literal, Model};

use self::{
    detect::{find_pure, find_unit},
    heuristic::choose_variable,
    simplify::{simplify, Simplified},
};

use super::{Abort, Limits, Outcome, Solver, Stats};

mod detect;
mod heuristic;
mod simplify;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct DecisionLevel(usize);

impl From<usize> for DecisionLevel {
    fn from(index: usize) -> Self {
        DecisionLevel(index)
    }
}

impl From<DecisionLevel> for usize {
    fn from(level: DecisionLevel) -> Self {
        level.0
    }
}

/// A decision whose negative branch has not been explored yet.
#[derive(Debug)]
struct ChoicePoint {
    /// Clause set right before the decision.
    clauses: Simplified,
    /// Decision literal of the branch being explored.
    literal: Literal,
    /// Trail length right before the decision.
    trail_len: usize,
}

/// DPLL solver with pure literal elimination, unit propagation and
/// most-frequent-variable branching.
///
/// The search runs on an explicit stack of choice points instead of native
/// recursion, so its depth is bounded by memory rather than by the call stack.
#[derive(Debug)]
pub struct DpllSolver {
    formula: Cnf,
    limits: Limits,
    /// Variable index -> assigned value. Unassigned variables are the free pool.
    assignment: Vec<Option<bool>>,
    /// Asserted literals, in assertion order.
    trail: Vec<Literal>,
    choice_points: TiVec<DecisionLevel, ChoicePoint>,
    stats: Stats,
}

impl DpllSolver {
    fn assert_literal(&mut self, literal: Literal) {
        let slot = &mut self.assignment[literal.variable().as_index()];
        debug_assert!(slot.is_none(), "{} is already assigned", literal.variable());

        *slot = Some(literal.positive());
        self.trail.push(literal);
    }

    /// Unassigns everything asserted after the first `len` trail entries.
    fn undo_to(&mut self, len: usize) {
        for literal in self.trail.drain(len..) {
            self.assignment[literal.variable().as_index()] = None;
        }
    }

    fn free_variables(&self) -> usize {
        self.formula.num_variables() - self.trail.len()
    }

    fn decision_limit_reached(&self) -> bool {
        self.limits
            .max_decisions
            .map_or(false, |max| self.stats.decisions >= max)
    }

    /// Returns whether the formula is satisfiable under the current assignment.
    fn search(&mut self) -> Result<bool, Abort> {
        let started = Instant::now();
        let mut current = Simplified::from_clauses(self.formula.clauses().iter().cloned());

        loop {
            if let Some(timeout) = self.limits.timeout {
                if started.elapsed() >= timeout {
                    return Err(Abort::Timeout);
                }
            }

            let clauses = match &current {
                Simplified::Formula(clauses) => clauses,
                Simplified::Conflict => {
                    // Retry the latest decision with the opposite polarity.
                    let choice_point = match self.choice_points.pop() {
                        Some(choice_point) => choice_point,
                        None => return Ok(false),
                    };
                    self.stats.backtracks += 1;
                    self.undo_to(choice_point.trail_len);

                    let literal = !choice_point.literal;
                    debug!(
                        "backtrack to level {}, trying {}",
                        self.choice_points.len(),
                        literal
                    );
                    self.assert_literal(literal);
                    current = simplify(&choice_point.clauses, literal);
                    continue;
                }
            };

            if clauses.is_empty() {
                return Ok(true);
            }

            if let Some(literal) = find_pure(clauses) {
                trace!("pure literal {}", literal);
                self.stats.pure_eliminations += 1;
                self.assert_literal(literal);
                current = simplify(&current, literal);
                continue;
            }

            if let Some(literal) = find_unit(clauses) {
                trace!("unit propagation {}", literal);
                self.stats.propagations += 1;
                self.assert_literal(literal);
                current = simplify(&current, literal);
                continue;
            }

            if self.decision_limit_reached() {
                return Err(Abort::DecisionLimit);
            }

            // `Formula` never holds an empty clause, so a non-empty one has literals.
            let variable = choose_variable(clauses).expect("non-empty formula without literals");
            let literal = Literal::new(variable, true);

            self.stats.decisions += 1;
            let trail_len = self.trail.len();
            self.assert_literal(literal);

            let next = simplify(&current, literal);
            let clauses = std::mem::replace(&mut current, next);
            self.choice_points.push(ChoicePoint {
                clauses,
                literal,
                trail_len,
            });
            self.stats.max_depth = self.stats.max_depth.max(self.choice_points.len());

            debug!(
                "decide {} at level {}, {} variables free",
                literal,
                self.choice_points.len(),
                self.free_variables()
            );
        }
    }

    /// Solves the formula and also returns the search counters.
    pub fn solve_with_stats(mut self) -> (Outcome, Stats) {
        let result = self.search();
        info!("DPLL search finished: {}", self.stats);

        let outcome = match result {
            Ok(true) => Outcome::Satisfiable(Model::new(self.formula, self.assignment)),
            Ok(false) => Outcome::Unsatisfiable,
            Err(abort) => {
                warn!("DPLL search aborted: {}", abort);
                Outcome::Unknown(abort)
            }
        };

        (outcome, self.stats)
    }
}

impl Solver for DpllSolver {
    fn new(formula: Cnf, limits: Limits) -> Self {
        let num_variables = formula.num_variables();

        DpllSolver {
            formula,
            limits,
            assignment: vec![None; num_variables],
            trail: Vec::new(),
            choice_points: TiVec::new(),
            stats: Stats::default(),
        }
    }

    fn solve(self) -> Outcome {
        self.solve_with_stats().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(num_variables: usize, clauses: &[&[i64]]) -> Cnf {
        Cnf::from_dimacs(num_variables, clauses).unwrap()
    }

    fn solve(num_variables: usize, clauses: &[&[i64]]) -> (Outcome, Stats) {
        DpllSolver::new(formula(num_variables, clauses), Limits::default()).solve_with_stats()
    }

    #[test]
    fn contradicting_units_need_no_decision() {
        let (outcome, stats) = solve(1, &[&[1], &[-1]]);
        assert!(outcome.is_unsat());
        assert_eq!(stats.decisions, 0);
        assert_eq!(stats.backtracks, 0);
    }

    #[test]
    fn empty_clause_fails_immediately() {
        let (outcome, stats) = solve(2, &[&[1, 2], &[]]);
        assert!(outcome.is_unsat());
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn pure_literals_before_units() {
        let (outcome, stats) = solve(2, &[&[1], &[1, 2]]);
        let model = outcome.model().unwrap();
        assert_eq!(stats.pure_eliminations, 1);
        assert_eq!(stats.propagations, 0);
        // x2 is never touched
        assert_eq!(model.assignment(), &[Some(true), None]);
    }

    #[test]
    fn backtracking_clears_abandoned_assignments() {
        // x1 = true propagates x2 and x3 before failing; x1 = false never needs x3.
        let (outcome, stats) = solve(3, &[&[-1, 2], &[-1, -2, 3], &[-1, -3], &[1, 2]]);
        let model = outcome.model().unwrap();
        assert_eq!(stats.decisions, 1);
        assert_eq!(stats.backtracks, 1);
        assert_eq!(model.assignment(), &[Some(false), Some(true), None]);
    }

    #[test]
    fn deep_search_does_not_recurse() {
        // Independent pairs (a ∨ b) ∧ (¬a ∨ ¬b): one decision each.
        let pairs = 1000;
        let clauses = (0..pairs)
            .flat_map(|i| {
                let a = 2 * i + 1;
                let b = 2 * i + 2;
                vec![vec![a, b], vec![-a, -b]]
            })
            .collect::<Vec<_>>();
        let formula = Cnf::from_dimacs(2 * pairs as usize, &clauses).unwrap();

        let (outcome, stats) = DpllSolver::new(formula, Limits::default()).solve_with_stats();
        assert!(outcome.model().unwrap().falsified_clause().is_none());
        assert_eq!(stats.decisions, pairs as u64);
        assert_eq!(stats.max_depth, pairs as usize);
        assert_eq!(stats.backtracks, 0);
    }

    #[test]
    fn decision_limit_aborts() {
        let formula = formula(2, &[&[1, 2], &[-1, -2]]);
        let limits = Limits {
            max_decisions: Some(0),
            ..Limits::default()
        };
        let outcome = DpllSolver::new(formula, limits).solve();
        assert!(matches!(outcome, Outcome::Unknown(Abort::DecisionLimit)));
    }

    #[test]
    fn decision_limit_ignored_without_decisions() {
        let formula = formula(2, &[&[1], &[-1, 2]]);
        let limits = Limits {
            max_decisions: Some(0),
            ..Limits::default()
        };
        assert!(DpllSolver::new(formula, limits).solve().is_sat());
    }
}
