//! Type-safe wrappers for variable identifiers, domain values and literals.
//!
//! These newtypes keep apart things that are all "just integers" underneath:
//! the interned identity of a variable, an index into a variable's domain,
//! and a signed literal as it appears in a clause.

use std::fmt;
use std::ops::Neg;

use crate::variables::Variable;

/// An interned variable identifier (1-indexed).
///
/// Identifiers are handed out by a [`VariableTable`][crate::variables::VariableTable]
/// and are the only thing compared when checking whether two variables are the same.
///
/// # Invariants
///
/// - Identifiers are >= 1 (0 is reserved for decision diagram terminals)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(u32);

impl VarId {
    /// Creates a new identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        VarId(id)
    }

    /// Returns the raw identifier.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<VarId> for u32 {
    fn from(var: VarId) -> Self {
        var.0
    }
}

/// An index into the domain of a variable.
///
/// For Boolean variables, `Value::FALSE` is index 0 and `Value::TRUE` is index 1.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Value(u32);

impl Value {
    pub const FALSE: Value = Value(0);
    pub const TRUE: Value = Value(1);

    pub fn new(index: u32) -> Self {
        Value(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        if b {
            Value::TRUE
        } else {
            Value::FALSE
        }
    }
}

/// A literal: a Boolean variable or its negation.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit {
    variable: Variable,
    positive: bool,
}

impl Lit {
    pub fn new(variable: Variable, positive: bool) -> Self {
        Lit { variable, positive }
    }

    pub fn pos(variable: Variable) -> Self {
        Lit::new(variable, true)
    }

    pub fn neg(variable: Variable) -> Self {
        Lit::new(variable, false)
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn is_positive(&self) -> bool {
        self.positive
    }

    pub fn is_negative(&self) -> bool {
        !self.positive
    }
}

impl Neg for Lit {
    type Output = Lit;

    fn neg(self) -> Self::Output {
        Lit {
            variable: self.variable,
            positive: !self.positive,
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "{}", self.variable)
        } else {
            write!(f, "{} {}", crate::formula::NOT, self.variable)
        }
    }
}
