//! Interned variables.
//!
//! Every variable of a model is created through a [`VariableTable`], which
//! guarantees that one name maps to exactly one [`Variable`] handle. Handles
//! compare, hash and order by their [`VarId`] only, so formulas built from the
//! same table share variables by identity rather than by name.
//!
//! A table is a cheap, shareable handle: a primary model and its proof model
//! are built over clones of the same table so that both refer to the same
//! variables.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::ModelError;
use crate::types::{VarId, Value};

/// The finite set of values a variable ranges over.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Domain {
    /// `{false, true}`.
    Boolean,
    /// An explicit, ordered list of value names.
    Enumerated(Vec<String>),
}

impl Domain {
    pub fn is_boolean(&self) -> bool {
        matches!(self, Domain::Boolean)
    }

    pub fn len(&self) -> usize {
        match self {
            Domain::Boolean => 2,
            Domain::Enumerated(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks a value up by name.
    pub fn value(&self, name: &str) -> Option<Value> {
        match self {
            Domain::Boolean => match name {
                "false" => Some(Value::FALSE),
                "true" => Some(Value::TRUE),
                _ => None,
            },
            Domain::Enumerated(values) => values
                .iter()
                .position(|v| v == name)
                .map(|i| Value::new(i as u32)),
        }
    }

    /// Name of the value, if it belongs to this domain.
    pub fn value_name(&self, value: Value) -> Option<&str> {
        match self {
            Domain::Boolean => match value {
                Value::FALSE => Some("false"),
                Value::TRUE => Some("true"),
                _ => None,
            },
            Domain::Enumerated(values) => values.get(value.index()).map(String::as_str),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Boolean => write!(f, "{{false, true}}"),
            Domain::Enumerated(values) => write!(f, "{{{}}}", values.join(", ")),
        }
    }
}

#[derive(Debug)]
struct VariableData {
    id: VarId,
    name: String,
    domain: Domain,
}

/// A shared handle to an interned variable.
#[derive(Clone)]
pub struct Variable(Rc<VariableData>);

impl Variable {
    pub fn id(&self) -> VarId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn domain(&self) -> &Domain {
        &self.0.domain
    }

    pub fn is_boolean(&self) -> bool {
        self.0.domain.is_boolean()
    }

    /// Renders `value` as a name from this variable's domain.
    pub fn value_name(&self, value: Value) -> &str {
        self.0.domain.value_name(value).unwrap_or("?")
    }

    /// Looks up the value called `name` in this variable's domain.
    pub fn value(&self, name: &str) -> Result<Value, ModelError> {
        self.0.domain.value(name).ok_or_else(|| ModelError::UnknownValue {
            variable: self.name().to_string(),
            value: name.to_string(),
        })
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.0.name, self.0.id.id())
    }
}

/// Name -> [`Variable`] interning table.
#[derive(Clone, Default)]
pub struct VariableTable {
    variables: Rc<RefCell<IndexMap<String, Variable>>>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a Boolean variable.
    pub fn boolean(&self, name: &str) -> Result<Variable, ModelError> {
        self.intern(name, Domain::Boolean)
    }

    /// Interns an enumerated variable.
    pub fn enumerated<I, S>(&self, name: &str, values: I) -> Result<Variable, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.intern(name, Domain::Enumerated(values))
    }

    /// Returns the variable `name` with the given domain, creating it on first use.
    ///
    /// Re-interning an existing name with a different domain is a schema violation.
    pub fn intern(&self, name: &str, domain: Domain) -> Result<Variable, ModelError> {
        let mut variables = self.variables.borrow_mut();
        if let Some(existing) = variables.get(name) {
            if existing.domain() != &domain {
                return Err(ModelError::DomainMismatch {
                    name: name.to_string(),
                    existing: existing.domain().to_string(),
                });
            }
            return Ok(existing.clone());
        }
        let id = VarId::new(variables.len() as u32 + 1);
        let variable = Variable(Rc::new(VariableData {
            id,
            name: name.to_string(),
            domain,
        }));
        variables.insert(name.to_string(), variable.clone());
        Ok(variable)
    }

    pub fn get(&self, name: &str) -> Option<Variable> {
        self.variables.borrow().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.variables.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All variables, in interning order.
    pub fn variables(&self) -> Vec<Variable> {
        self.variables.borrow().values().cloned().collect()
    }
}

impl fmt::Debug for VariableTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.variables.borrow().values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_interning_shares_identity() {
        let table = VariableTable::new();
        let a1 = table.boolean("A").unwrap();
        let a2 = table.boolean("A").unwrap();
        let b = table.boolean("B").unwrap();

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(a1.id(), VarId::new(1));
        assert_eq!(b.id(), VarId::new(2));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_cloned_table_is_shared() {
        let table = VariableTable::new();
        let other = table.clone();
        let a = table.boolean("A").unwrap();
        assert_eq!(other.get("A"), Some(a));
    }

    #[test]
    fn test_domain_mismatch() {
        let table = VariableTable::new();
        table.enumerated("MODE", ["auto", "manual"]).unwrap();
        let err = table.boolean("MODE").unwrap_err();
        assert_eq!(
            err,
            ModelError::DomainMismatch {
                name: "MODE".to_string(),
                existing: "{auto, manual}".to_string(),
            }
        );
    }

    #[test]
    fn test_domain_values() {
        let domain = Domain::Enumerated(vec!["red".into(), "green".into()]);
        assert_eq!(domain.len(), 2);
        assert_eq!(domain.value("green"), Some(Value::new(1)));
        assert_eq!(domain.value("blue"), None);
        assert_eq!(domain.value_name(Value::new(0)), Some("red"));

        assert_eq!(Domain::Boolean.value("true"), Some(Value::TRUE));
        assert_eq!(Domain::Boolean.value_name(Value::FALSE), Some("false"));
    }

    #[test]
    fn test_variable_value() {
        let table = VariableTable::new();
        let mode = table.enumerated("MODE", ["auto", "manual"]).unwrap();
        assert_eq!(mode.value("manual"), Ok(Value::new(1)));
        assert_eq!(
            mode.value("off"),
            Err(ModelError::UnknownValue {
                variable: "MODE".to_string(),
                value: "off".to_string(),
            })
        );
    }
}
