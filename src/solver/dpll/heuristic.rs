use std::{collections::BTreeMap, rc::Rc};

use crate::formula::{Clause, Variable};

/// Picks the variable occurring most often in `clauses`, regardless of sign.
/// Ties go to the smallest variable ID.
///
/// Returns `None` only when `clauses` holds no literal at all.
pub fn choose_variable(clauses: &[Rc<Clause>]) -> Option<Variable> {
    let mut occurrences = BTreeMap::new();
    for literal in clauses.iter().flat_map(|clause| clause.iter()) {
        *occurrences.entry(literal.variable()).or_insert(0usize) += 1;
    }

    let mut best: Option<(Variable, usize)> = None;
    for (variable, count) in occurrences {
        match best {
            Some((_, best_count)) if best_count >= count => (),
            _ => best = Some((variable, count)),
        }
    }

    best.map(|(variable, _)| variable)
}
