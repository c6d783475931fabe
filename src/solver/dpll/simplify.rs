use std::rc::Rc;

use crate::formula::{Clause, Literal};

/// A clause set reduced under the literals asserted so far.
///
/// Unchanged clauses are shared between a clause set and the sets derived
/// from it, so a snapshot kept for backtracking costs one pointer per clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Simplified {
    /// Remaining clauses. Never contains an empty clause.
    Formula(Vec<Rc<Clause>>),
    /// The current branch already falsifies some clause.
    Conflict,
}

impl Simplified {
    pub fn from_clauses<I: IntoIterator<Item = Clause>>(clauses: I) -> Self {
        let mut formula = Vec::new();
        for clause in clauses {
            if clause.is_empty() {
                return Simplified::Conflict;
            }
            formula.push(Rc::new(clause));
        }
        Simplified::Formula(formula)
    }
}

/// Reduces `formula` under the assumption that `literal` holds.
///
/// Clauses containing `literal` are dropped and occurrences of its negation
/// are removed. Emptying a clause turns the whole result into `Conflict`.
pub fn simplify(formula: &Simplified, literal: Literal) -> Simplified {
    let clauses = match formula {
        Simplified::Formula(clauses) => clauses,
        Simplified::Conflict => return Simplified::Conflict,
    };

    let mut simplified = Vec::with_capacity(clauses.len());
    for clause in clauses {
        if clause.contains(literal) {
            continue;
        }

        if clause.contains(!literal) {
            let reduced = clause.without(!literal);
            if reduced.is_empty() {
                return Simplified::Conflict;
            }
            simplified.push(Rc::new(reduced));
        } else {
            simplified.push(Rc::clone(clause));
        }
    }

    Simplified::Formula(simplified)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(clauses: &[&[i64]]) -> Simplified {
        Simplified::from_clauses(clauses.iter().map(|clause| {
            clause
                .iter()
                .map(|&value| Literal::from_dimacs(value).unwrap())
                .collect::<Clause>()
        }))
    }

    fn lit(value: i64) -> Literal {
        Literal::from_dimacs(value).unwrap()
    }

    #[test]
    fn drops_satisfied_and_shrinks_falsified() {
        let input = formula(&[&[1, 2], &[-1, 3], &[2, 3]]);
        assert_eq!(simplify(&input, lit(1)), formula(&[&[3], &[2, 3]]));
        assert_eq!(simplify(&input, lit(-1)), formula(&[&[2], &[2, 3]]));
    }

    #[test]
    fn input_is_left_untouched() {
        let input = formula(&[&[1, 2], &[-1, 3]]);
        let before = input.clone();
        simplify(&input, lit(1));
        assert_eq!(input, before);
    }

    #[test]
    fn emptied_clause_is_a_conflict() {
        let input = formula(&[&[2, 3], &[-1], &[1, 2]]);
        assert_eq!(simplify(&input, lit(1)), Simplified::Conflict);
    }

    #[test]
    fn conflict_stays_conflict() {
        assert_eq!(simplify(&Simplified::Conflict, lit(1)), Simplified::Conflict);
        assert_eq!(simplify(&Simplified::Conflict, lit(-4)), Simplified::Conflict);
    }

    #[test]
    fn empty_clause_in_input_is_a_conflict() {
        assert_eq!(formula(&[&[1], &[]]), Simplified::Conflict);
        assert_eq!(formula(&[]), Simplified::Formula(Vec::new()));
    }

    #[test]
    fn never_grows() {
        let input = formula(&[&[1, -2, 3], &[-1, 2], &[2, 3], &[-3, -2, 1]]);
        let originals = match &input {
            Simplified::Formula(clauses) => clauses.clone(),
            Simplified::Conflict => unreachable!(),
        };

        for value in &[1, -1, 2, -2, 3, -3] {
            if let Simplified::Formula(clauses) = simplify(&input, lit(*value)) {
                assert!(clauses.len() <= originals.len());
                for clause in &clauses {
                    assert!(originals
                        .iter()
                        .any(|original| clause.iter().all(|l| original.contains(l))));
                }
            }
        }
    }
}
