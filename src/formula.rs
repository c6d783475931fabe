/*!
A module to represent conjunctive normal form formula.
*/

use std::{convert::TryFrom, fmt::Display, iter::FromIterator, num::NonZeroU32, str::FromStr};

use typed_index_collections::{TiSlice, TiVec};

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum VariableParseError {
    #[snafu(display("Failed to parse Variable ID"))]
    ParseIntError { source: std::num::ParseIntError },
    #[snafu(display(
        "Variable ID {} is out of range (must be within 1 to {})",
        num,
        Variable::MAX_VARIABLE_ID
    ))]
    RangeError { num: u64 },
}

#[derive(Debug, Snafu)]
pub enum FormulaError {
    #[snafu(display("{} is not a valid literal", value))]
    InvalidLiteral { value: i64 },
    #[snafu(display(
        "Literal {} refers to a variable beyond the declared {} variables",
        literal,
        num_variables
    ))]
    VariableOutOfRange {
        literal: Literal,
        num_variables: usize,
    },
}

/// Newtype wrapper for variable ID.
/// Invariant: 0 < ID <= MAX_VARIABLE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(NonZeroU32);

impl Variable {
    pub const MAX_VARIABLE_ID: usize = std::u32::MAX as usize;
}

impl Variable {
    /// Creates a variable from its DIMACS ID.
    /// Returns `None` for zero.
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Variable)
    }

    pub fn id(&self) -> u32 {
        self.0.get()
    }

    pub fn as_index(&self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Creates a variable from a raw index.
    /// Returns `None` if the index is invalid.
    pub fn from_index(index: usize) -> Option<Self> {
        let id = index.checked_add(1)?;
        Variable::new(u32::try_from(id).ok()?)
    }
}

impl FromStr for Variable {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s.parse::<u64>().context(ParseIntError)?;
        u32::try_from(num)
            .ok()
            .and_then(Variable::new)
            .context(RangeError { num })
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A variable together with its polarity.
///
/// Literals order by variable first, so the negative literal of a variable
/// comes right before its positive literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    id: Variable,
    positive: bool,
}

impl Literal {
    pub fn new(id: Variable, positive: bool) -> Self {
        Literal { id, positive }
    }

    /// Converts a signed DIMACS integer into a literal.
    /// Returns `None` for zero and for magnitudes that do not fit a variable ID.
    pub fn from_dimacs(value: i64) -> Option<Self> {
        let id = u32::try_from(value.checked_abs()?).ok()?;
        Some(Literal {
            id: Variable::new(id)?,
            positive: value > 0,
        })
    }

    pub fn to_dimacs(&self) -> i64 {
        let id = i64::from(self.id.id());
        if self.positive {
            id
        } else {
            -id
        }
    }

    pub fn variable(&self) -> Variable {
        self.id
    }

    pub fn positive(&self) -> bool {
        self.positive
    }
}

impl FromStr for Literal {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (positive, id) = if let Some(magnitude) = s.strip_prefix('-') {
            (false, magnitude.parse()?)
        } else {
            (true, s.parse()?)
        };

        Ok(Literal { id, positive })
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", if self.positive { "" } else { "¬" }, self.id)
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal {
            id: self.id,
            positive: !self.positive,
        }
    }
}

/// Disjunction of literals. An empty clause can never be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    pub fn num_literals(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.contains(&literal)
    }

    /// Returns the only literal of a unit clause.
    pub fn unit(&self) -> Option<Literal> {
        match self.literals.as_slice() {
            [literal] => Some(*literal),
            _ => None,
        }
    }

    /// Returns a copy of the clause with every occurrence of `literal` removed.
    pub fn without(&self, literal: Literal) -> Clause {
        self.iter().filter(|&l| l != literal).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.iter().copied()
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Clause::new(iter.into_iter().collect())
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;

        let mut iter = self.literals.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for literal in iter {
            write!(f, " ∨ {}", literal)?;
        }

        write!(f, ")")?;

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClauseIdx(usize);

impl From<usize> for ClauseIdx {
    fn from(index: usize) -> Self {
        ClauseIdx(index)
    }
}

impl From<ClauseIdx> for usize {
    fn from(index: ClauseIdx) -> Self {
        index.0
    }
}

impl Display for ClauseIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Formula representation in Conjunctive Normal Form
#[derive(Debug, Clone)]
pub struct Cnf {
    num_variables: usize,
    clauses: TiVec<ClauseIdx, Clause>,
}

impl Cnf {
    pub fn new(num_variables: usize) -> Self {
        assert!(num_variables <= Variable::MAX_VARIABLE_ID);

        Cnf {
            num_variables,
            clauses: TiVec::new(),
        }
    }

    /// Builds a formula from signed DIMACS integers, one slice per clause.
    pub fn from_dimacs<I, C>(num_variables: usize, clauses: I) -> Result<Self, FormulaError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[i64]>,
    {
        let mut cnf = Cnf::new(num_variables);
        for clause in clauses {
            let literals = clause
                .as_ref()
                .iter()
                .map(|&value| Literal::from_dimacs(value).context(InvalidLiteral { value }))
                .collect::<Result<Vec<_>, _>>()?;
            cnf.add_clause(Clause::new(literals))?;
        }
        Ok(cnf)
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn clauses(&self) -> &TiSlice<ClauseIdx, Clause> {
        &self.clauses
    }

    /// Appends a clause, rejecting literals over undeclared variables.
    pub fn add_clause(&mut self, clause: Clause) -> Result<(), FormulaError> {
        if let Some(literal) = clause
            .iter()
            .find(|literal| literal.variable().as_index() >= self.num_variables)
        {
            return VariableOutOfRange {
                literal,
                num_variables: self.num_variables,
            }
            .fail();
        }

        self.clauses.push(clause);
        Ok(())
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CNF with {} variables (", self.num_variables)?;

        let mut iter = self.clauses.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for clause in iter {
            write!(f, " ∧ {}", clause)?;
        }

        write!(f, ")")?;

        Ok(())
    }
}

/// Represents a satisfying assignment for a formula.
///
/// The assignment is partial: variables the search never had to decide are
/// don't-cares and stay `None`.
#[derive(Debug)]
pub struct Model {
    formula: Cnf,
    assignment: Vec<Option<bool>>,
}

impl Model {
    /// Creates a new model from a formula and an assignment.
    ///
    /// # Panics
    ///
    /// Panics when the assignment length does not match the formula.
    /// Debug builds also panic when the assignment falsifies a clause.
    pub fn new(formula: Cnf, assignment: Vec<Option<bool>>) -> Self {
        assert!(assignment.len() == formula.num_variables());

        let model = Model {
            formula,
            assignment,
        };
        debug_assert!(
            model.falsified_clause().is_none(),
            "model does not satisfy its formula"
        );

        model
    }

    pub fn formula(&self) -> &Cnf {
        &self.formula
    }

    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    pub fn value(&self, variable: Variable) -> Option<bool> {
        self.assignment.get(variable.as_index()).copied().flatten()
    }

    /// Variables assigned `true`, in ascending order.
    pub fn true_variables(&self) -> Vec<Variable> {
        self.assignment
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == Some(true))
            .filter_map(|(index, _)| Variable::from_index(index))
            .collect()
    }

    pub fn satisfies(&self, clause: &Clause) -> bool {
        clause
            .iter()
            .any(|literal| self.value(literal.variable()) == Some(literal.positive()))
    }

    /// Returns the first clause of the formula with no satisfied literal.
    pub fn falsified_clause(&self) -> Option<ClauseIdx> {
        self.formula
            .clauses()
            .iter_enumerated()
            .find(|(_, clause)| !self.satisfies(clause))
            .map(|(index, _)| index)
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model for {}\nAssignment:", self.formula)?;
        for (idx, &val) in self.assignment.iter().enumerate() {
            if let Some(variable) = Variable::from_index(idx) {
                match val {
                    Some(val) => write!(f, "\n  {}: {}", variable, val)?,
                    None => write!(f, "\n  {}: -", variable)?,
                }
            }
        }

        Ok(())
    }
}
