//! Conjunctive normal form.
//!
//! [`Cnf::convert`] turns a guard into a conjunction of clauses by pushing
//! negations down to the atoms (De Morgan) and distributing OR over AND.
//! The result is logically equivalent to the source formula.
//!
//! # Clause order
//!
//! Conversion is deterministic and its canonical text is stable:
//!
//! - `p AND q` yields the clauses of `p` followed by the clauses of `q`;
//! - `p OR q` yields `a ++ b` for every clause `a` of `p` and `b` of `q`, in
//!   row-major order;
//! - literals are never reordered or merged inside a clause, but a clause that
//!   repeats an earlier one is dropped.
//!
//! Distribution is exponential in the alternation depth of AND/OR. Guards of
//! reactive control logic are short, so no auxiliary variables are introduced:
//! the converted formula only mentions the variables of the source formula,
//! which keeps counterexamples readable.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use log::debug;

use crate::formula::{Formula, AND, OR};
use crate::types::Lit;
use crate::valuation::Valuation;
use crate::variables::Variable;

/// A disjunction of literals.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    pub fn new(lits: Vec<Lit>) -> Self {
        Clause { lits }
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    pub fn eval(&self, valuation: &Valuation) -> bool {
        self.lits
            .iter()
            .any(|lit| valuation.get(lit.variable()) == lit.is_positive())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, lit) in self.lits.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", OR)?;
            }
            write!(f, "{}", lit)?;
        }
        write!(f, ")")
    }
}

/// A conjunction of [`Clause`]s.
///
/// The empty conjunction is `true`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Cnf {
    clauses: Vec<Clause>,
}

impl Cnf {
    /// Converts an optional guard. An absent guard converts to zero clauses.
    pub fn convert(formula: Option<&Formula>) -> Cnf {
        match formula {
            Some(f) => Cnf::from_formula(f),
            None => Cnf::default(),
        }
    }

    pub fn from_formula(formula: &Formula) -> Cnf {
        let raw = distribute(formula, true);
        let total = raw.len();

        let mut seen = HashSet::with_capacity(total);
        let clauses: Vec<Clause> = raw
            .into_iter()
            .map(Clause::new)
            .filter(|c| seen.insert(c.clone()))
            .collect();

        debug!(
            "cnf: {} clauses ({} duplicates dropped) for '{}'",
            clauses.len(),
            total - clauses.len(),
            formula
        );
        Cnf { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        self.clauses
            .iter()
            .flat_map(|c| c.lits.iter().map(|lit| lit.variable().clone()))
            .collect()
    }

    pub fn eval(&self, valuation: &Valuation) -> bool {
        self.clauses.iter().all(|c| c.eval(valuation))
    }
}

impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", AND)?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// Clauses of `f` (if `positive`) or of `NOT f` (otherwise).
fn distribute(f: &Formula, positive: bool) -> Vec<Vec<Lit>> {
    match f {
        Formula::Var(v) => vec![vec![Lit::new(v.clone(), positive)]],
        Formula::Not(g) => distribute(g, !positive),
        Formula::And(p, q) if positive => concat(distribute(p, true), distribute(q, true)),
        Formula::Or(p, q) if !positive => concat(distribute(p, false), distribute(q, false)),
        Formula::Or(p, q) => product(&distribute(p, true), &distribute(q, true)),
        Formula::And(p, q) => product(&distribute(p, false), &distribute(q, false)),
    }
}

fn concat(mut lhs: Vec<Vec<Lit>>, rhs: Vec<Vec<Lit>>) -> Vec<Vec<Lit>> {
    lhs.extend(rhs);
    lhs
}

fn product(lhs: &[Vec<Lit>], rhs: &[Vec<Lit>]) -> Vec<Vec<Lit>> {
    let mut result = Vec::with_capacity(lhs.len() * rhs.len());
    for a in lhs {
        for b in rhs {
            let mut clause = Vec::with_capacity(a.len() + b.len());
            clause.extend(a.iter().cloned());
            clause.extend(b.iter().cloned());
            result.push(clause);
        }
    }
    result
}
