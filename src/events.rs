//! Triggers and effects of transitions.

use std::collections::BTreeSet;
use std::fmt;

use crate::types::Value;
use crate::variables::Variable;

/// Something that can trigger a transition.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Event {
    /// Sent by the environment.
    External(String),
    /// Emitted by an [`Action::Emit`] of some state machine.
    Synchronization(String),
    /// A variable taking a value, as the result of an [`Action::Assign`].
    Change { variable: Variable, value: Value },
}

impl Event {
    pub fn external(name: impl Into<String>) -> Self {
        Event::External(name.into())
    }

    pub fn synchronization(name: impl Into<String>) -> Self {
        Event::Synchronization(name.into())
    }

    pub fn change(variable: Variable, value: impl Into<Value>) -> Self {
        Event::Change {
            variable,
            value: value.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::External(name) => write!(f, "{}", name),
            Event::Synchronization(name) => write!(f, "syn:{}", name),
            Event::Change { variable, value } => {
                write!(f, "{} = {}", variable, variable.value_name(*value))
            }
        }
    }
}

/// The set of events labelling a transition.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Events(BTreeSet<Event>);

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: Event) -> bool {
        self.0.insert(event)
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.0.contains(event)
    }

    pub fn intersects(&self, other: &Events) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.0.iter()
    }
}

impl FromIterator<Event> for Events {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Events(iter.into_iter().collect())
    }
}

impl fmt::Display for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_set(f, self.0.iter())
    }
}

/// An effect of a transition.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Action {
    Assign { variable: Variable, value: Value },
    Emit(String),
}

impl Action {
    pub fn assign(variable: Variable, value: impl Into<Value>) -> Self {
        Action::Assign {
            variable,
            value: value.into(),
        }
    }

    pub fn emit(event: impl Into<String>) -> Self {
        Action::Emit(event.into())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Assign { variable, value } => {
                write!(f, "{} := {}", variable, variable.value_name(*value))
            }
            Action::Emit(event) => write!(f, "emit {}", event),
        }
    }
}

/// The set of actions of a transition. Two transitions have the same effect
/// only if their action sets are equal.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Actions(BTreeSet<Action>);

impl Actions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action: Action) -> bool {
        self.0.insert(action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.0.iter()
    }

    /// Variable writes, in variable order.
    pub fn writes(&self) -> impl Iterator<Item = (&Variable, Value)> {
        self.0.iter().filter_map(|a| match a {
            Action::Assign { variable, value } => Some((variable, *value)),
            Action::Emit(_) => None,
        })
    }

    /// The events these actions make happen: one per emission and one per write.
    pub fn produced_events(&self) -> Events {
        self.0
            .iter()
            .map(|a| match a {
                Action::Assign { variable, value } => Event::Change {
                    variable: variable.clone(),
                    value: *value,
                },
                Action::Emit(name) => Event::Synchronization(name.clone()),
            })
            .collect()
    }
}

impl FromIterator<Action> for Actions {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Actions(iter.into_iter().collect())
    }
}

impl fmt::Display for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_set(f, self.0.iter())
    }
}

fn write_set<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    write!(f, "{{")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "}}")
}
