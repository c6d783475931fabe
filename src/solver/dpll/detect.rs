use std::{collections::BTreeSet, rc::Rc};

use crate::formula::{Clause, Literal};

/// Finds a literal whose negation does not occur anywhere in `clauses`.
/// Among several pure literals, the one over the smallest variable wins.
pub fn find_pure(clauses: &[Rc<Clause>]) -> Option<Literal> {
    let literals = clauses
        .iter()
        .flat_map(|clause| clause.iter())
        .collect::<BTreeSet<_>>();

    literals
        .iter()
        .copied()
        .find(|&literal| !literals.contains(&!literal))
}

/// Returns the literal of the first unit clause in formula order.
pub fn find_unit(clauses: &[Rc<Clause>]) -> Option<Literal> {
    clauses.iter().find_map(|clause| clause.unit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clauses(input: &[&[i64]]) -> Vec<Rc<Clause>> {
        input
            .iter()
            .map(|clause| {
                Rc::new(
                    clause
                        .iter()
                        .map(|&value| Literal::from_dimacs(value).unwrap())
                        .collect(),
                )
            })
            .collect()
    }

    fn dimacs(literal: Option<Literal>) -> Option<i64> {
        literal.map(|literal| literal.to_dimacs())
    }

    #[test]
    fn pure_literal_smallest_variable_first() {
        assert_eq!(dimacs(find_pure(&clauses(&[&[3, 1], &[-1, -2], &[-3]]))), Some(-2));
        assert_eq!(dimacs(find_pure(&clauses(&[&[-4, 2], &[-2, -4]]))), Some(-4));
    }

    #[test]
    fn no_pure_literal() {
        assert_eq!(find_pure(&clauses(&[&[1, 2], &[-1, -2]])), None);
        assert_eq!(find_pure(&[]), None);
    }

    #[test]
    fn first_unit_in_formula_order() {
        assert_eq!(dimacs(find_unit(&clauses(&[&[1, 2], &[-3], &[2]]))), Some(-3));
        assert_eq!(find_unit(&clauses(&[&[1, 2], &[-1, -2]])), None);
        assert_eq!(find_unit(&[]), None);
    }
}
