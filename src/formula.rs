//! Boolean guard conditions.
//!
//! A [`Formula`] is an immutable tree built from Boolean [`Variable`]s with
//! NOT, AND and OR. Formulas are produced by a
//! [`FormulaFactory`][crate::parser::FormulaFactory] (or by hand, with the
//! constructors and the `!`, `&`, `|` operators) and then shared read-only by
//! every verification unit.
//!
//! # Canonical text
//!
//! [`Display`][fmt::Display] renders the canonical form, which the parser
//! reads back to the same text:
//!
//! - connectives are spelled [`AND`], [`OR`] and [`NOT`];
//! - an OR operand of an AND is parenthesized, nothing else is;
//! - a negated atom renders as `(NON A)`, any other negation as `(NON (f))`.
//!
//! ```
//! use fsmcheck::formula::Formula;
//! use fsmcheck::variables::VariableTable;
//!
//! let table = VariableTable::new();
//! let a = Formula::var(table.boolean("A").unwrap());
//! let b = Formula::var(table.boolean("B").unwrap());
//! let c = Formula::var(table.boolean("C").unwrap());
//!
//! let f = !a & (b | c);
//! assert_eq!(f.to_string(), "(NON A) ET (B OU C)");
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::valuation::Valuation;
use crate::variables::Variable;

/// Canonical spelling of AND.
pub const AND: &str = "ET";
/// Canonical spelling of OR.
pub const OR: &str = "OU";
/// Canonical spelling of NOT.
pub const NOT: &str = "NON";

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Formula {
    Var(Variable),
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
}

/// Result of partially assigning a formula.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Simplified {
    True,
    False,
    Formula(Formula),
}

impl Formula {
    /// Atom.
    ///
    /// # Panics
    ///
    /// Panics if `variable` is not Boolean.
    pub fn var(variable: Variable) -> Self {
        assert!(
            variable.is_boolean(),
            "Variable '{}' is not Boolean",
            variable
        );
        Formula::Var(variable)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(f: Self) -> Self {
        Formula::Not(Box::new(f))
    }

    pub fn and(p: Self, q: Self) -> Self {
        Formula::And(Box::new(p), Box::new(q))
    }

    pub fn or(p: Self, q: Self) -> Self {
        Formula::Or(Box::new(p), Box::new(q))
    }

    /// Conjunction of two optional guards, where an absent guard means "always true".
    pub fn conjunction(p: Option<&Formula>, q: Option<&Formula>) -> Option<Formula> {
        match (p, q) {
            (Some(p), Some(q)) => Some(Formula::and(p.clone(), q.clone())),
            (Some(f), None) | (None, Some(f)) => Some(f.clone()),
            (None, None) => None,
        }
    }

    pub fn eval(&self, valuation: &Valuation) -> bool {
        match self {
            Formula::Var(v) => valuation.get(v),
            Formula::Not(f) => !f.eval(valuation),
            Formula::And(p, q) => p.eval(valuation) && q.eval(valuation),
            Formula::Or(p, q) => p.eval(valuation) || q.eval(valuation),
        }
    }

    /// All free variables, ordered by identifier.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    /// Adds the free variables of the formula to `vars`.
    pub fn collect_variables(&self, vars: &mut BTreeSet<Variable>) {
        match self {
            Formula::Var(v) => {
                vars.insert(v.clone());
            }
            Formula::Not(f) => f.collect_variables(vars),
            Formula::And(p, q) | Formula::Or(p, q) => {
                p.collect_variables(vars);
                q.collect_variables(vars);
            }
        }
    }

    /// Substitutes the explicitly assigned variables of `valuation` and simplifies.
    ///
    /// Variables missing from the valuation stay free.
    pub fn assign(&self, valuation: &Valuation) -> Simplified {
        match self {
            Formula::Var(v) => match valuation.lookup(v) {
                Some(true) => Simplified::True,
                Some(false) => Simplified::False,
                None => Simplified::Formula(self.clone()),
            },
            Formula::Not(f) => match f.assign(valuation) {
                Simplified::True => Simplified::False,
                Simplified::False => Simplified::True,
                Simplified::Formula(f) => Simplified::Formula(Formula::not(f)),
            },
            Formula::And(p, q) => match (p.assign(valuation), q.assign(valuation)) {
                (Simplified::False, _) | (_, Simplified::False) => Simplified::False,
                (Simplified::True, other) | (other, Simplified::True) => other,
                (Simplified::Formula(p), Simplified::Formula(q)) => {
                    Simplified::Formula(Formula::and(p, q))
                }
            },
            Formula::Or(p, q) => match (p.assign(valuation), q.assign(valuation)) {
                (Simplified::True, _) | (_, Simplified::True) => Simplified::True,
                (Simplified::False, other) | (other, Simplified::False) => other,
                (Simplified::Formula(p), Simplified::Formula(q)) => {
                    Simplified::Formula(Formula::or(p, q))
                }
            },
        }
    }
}

impl Not for Formula {
    type Output = Formula;

    fn not(self) -> Self::Output {
        Formula::Not(Box::new(self))
    }
}

impl BitAnd for Formula {
    type Output = Formula;

    fn bitand(self, rhs: Self) -> Self::Output {
        Formula::and(self, rhs)
    }
}

impl BitOr for Formula {
    type Output = Formula;

    fn bitor(self, rhs: Self) -> Self::Output {
        Formula::or(self, rhs)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Var(v) => write!(f, "{}", v),
            Formula::Not(inner) => match inner.as_ref() {
                Formula::Var(v) => write!(f, "({} {})", NOT, v),
                other => write!(f, "({} ({}))", NOT, other),
            },
            Formula::And(p, q) => {
                write_and_operand(f, p)?;
                write!(f, " {} ", AND)?;
                write_and_operand(f, q)
            }
            Formula::Or(p, q) => write!(f, "{} {} {}", p, OR, q),
        }
    }
}

fn write_and_operand(f: &mut fmt::Formatter<'_>, operand: &Formula) -> fmt::Result {
    match operand {
        Formula::Or(..) => write!(f, "({})", operand),
        _ => write!(f, "{}", operand),
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::variables::VariableTable;

    fn vars(table: &VariableTable, names: &[&str]) -> Vec<Formula> {
        names
            .iter()
            .map(|name| Formula::var(table.boolean(name).unwrap()))
            .collect()
    }

    #[test]
    fn test_display() {
        let table = VariableTable::new();
        let v = vars(&table, &["A", "B", "C"]);
        let (a, b, c) = (v[0].clone(), v[1].clone(), v[2].clone());

        assert_eq!((a.clone() & b.clone()).to_string(), "A ET B");
        assert_eq!((a.clone() | b.clone()).to_string(), "A OU B");
        assert_eq!((!a.clone()).to_string(), "(NON A)");
        assert_eq!((!(a.clone() & b.clone())).to_string(), "(NON (A ET B))");
        assert_eq!(
            (a.clone() | b.clone() & c.clone()).to_string(),
            "A OU B ET C"
        );
        assert_eq!(((a.clone() | b.clone()) & c.clone()).to_string(), "(A OU B) ET C");
        assert_eq!((!!a).to_string(), "(NON ((NON A)))");
    }

    #[test]
    fn test_eval() {
        let table = VariableTable::new();
        let v = vars(&table, &["A", "B"]);
        let a_var = table.get("A").unwrap();
        let b_var = table.get("B").unwrap();
        let f = v[0].clone() & !v[1].clone();

        assert!(f.eval(&Valuation::new().with(&a_var, true)));
        assert!(!f.eval(&Valuation::new().with(&a_var, true).with(&b_var, true)));
        assert!(!f.eval(&Valuation::new()));
    }

    #[test]
    fn test_variables() {
        let table = VariableTable::new();
        let v = vars(&table, &["A", "B", "C"]);
        let f = (v[2].clone() | v[0].clone()) & !v[2].clone();
        let names: Vec<_> = f.variables().iter().map(|v| v.name().to_string()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_assign() {
        let table = VariableTable::new();
        let v = vars(&table, &["A", "B"]);
        let a = table.get("A").unwrap();
        let f = v[0].clone() & v[1].clone();

        assert_eq!(f.assign(&Valuation::new().with(&a, false)), Simplified::False);
        assert_eq!(
            f.assign(&Valuation::new().with(&a, true)),
            Simplified::Formula(v[1].clone())
        );
        let g = v[0].clone() | v[1].clone();
        assert_eq!(g.assign(&Valuation::new().with(&a, true)), Simplified::True);
        assert_eq!(
            (!v[0].clone()).assign(&Valuation::new().with(&a, true)),
            Simplified::False
        );
    }

    #[test]
    fn test_conjunction() {
        let table = VariableTable::new();
        let v = vars(&table, &["A", "B"]);

        assert_eq!(Formula::conjunction(None, None), None);
        assert_eq!(Formula::conjunction(Some(&v[0]), None), Some(v[0].clone()));
        assert_eq!(
            Formula::conjunction(Some(&v[0]), Some(&v[1])).unwrap().to_string(),
            "A ET B"
        );
    }

    #[test]
    #[should_panic(expected = "is not Boolean")]
    fn test_enumerated_atom_panics() {
        let table = VariableTable::new();
        let mode = table.enumerated("MODE", ["a", "b", "c"]).unwrap();
        Formula::var(mode);
    }
}
