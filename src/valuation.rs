use std::collections::BTreeMap;
use std::fmt;

use crate::types::Lit;
use crate::variables::Variable;

/// An assignment of truth values to Boolean variables.
///
/// Variables without an explicit value read as `false`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Valuation {
    values: BTreeMap<Variable, bool>,
}

impl Valuation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, variable: Variable, value: bool) {
        self.values.insert(variable, value);
    }

    pub fn with(mut self, variable: &Variable, value: bool) -> Self {
        self.set(variable.clone(), value);
        self
    }

    pub fn get(&self, variable: &Variable) -> bool {
        self.values.get(variable).copied().unwrap_or(false)
    }

    /// Returns the value only if it was assigned explicitly.
    pub fn lookup(&self, variable: &Variable) -> Option<bool> {
        self.values.get(variable).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, bool)> {
        self.values.iter().map(|(v, &b)| (v, b))
    }
}

impl FromIterator<Lit> for Valuation {
    fn from_iter<I: IntoIterator<Item = Lit>>(iter: I) -> Self {
        let mut valuation = Valuation::new();
        for lit in iter {
            valuation.set(lit.variable().clone(), lit.is_positive());
        }
        valuation
    }
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (variable, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{} = {}", variable, value)?;
        }
        Ok(())
    }
}
