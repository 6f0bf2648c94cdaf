//! In-memory state-machine models.
//!
//! This is the representation a model loader populates and hands to the
//! verifiers. A [`Model`] owns its [`VariableTable`] (possibly shared with a
//! proof model) and an insertion-ordered map of [`StateMachine`]s; a state
//! machine owns its [`State`]s, and a state owns its outgoing [`Transition`]s.
//!
//! ```
//! use fsmcheck::events::{Action, Event};
//! use fsmcheck::graph::Model;
//! use fsmcheck::model::StateMachineLike;
//!
//! let mut model = Model::new("door");
//! let closed = model.variables().boolean("CLOSED").unwrap();
//! let guard = model.parse_guard("NOT CLOSED").unwrap();
//!
//! let machine = model.add_machine("controller").unwrap();
//! machine.add_transition("0", "1", [], None, []);
//! machine.add_transition(
//!     "1",
//!     "2",
//!     [Event::external("close")],
//!     guard,
//!     [Action::assign(closed, true)],
//! );
//!
//! let machine = model.machine("controller").unwrap();
//! assert_eq!(machine.states().count(), 3);
//! ```

use std::fmt;

use indexmap::IndexMap;

use crate::error::{ModelError, ParseError};
use crate::events::{Action, Actions, Event, Events};
use crate::formula::Formula;
use crate::model::{ModelLike, StateLike, StateMachineLike, TransitionLike};
use crate::parser::{BooleanExpressionFactory, FormulaFactory};
use crate::variables::VariableTable;

#[derive(Debug, Clone)]
pub struct Transition {
    source: String,
    destination: String,
    events: Events,
    guard: Option<Formula>,
    actions: Actions,
}

impl Transition {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        events: Events,
        guard: Option<Formula>,
        actions: Actions,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            events,
            guard,
            actions,
        }
    }
}

impl TransitionLike for Transition {
    fn source(&self) -> &str {
        &self.source
    }
    fn destination(&self) -> &str {
        &self.destination
    }
    fn events(&self) -> &Events {
        &self.events
    }
    fn guard(&self) -> Option<&Formula> {
        self.guard.as_ref()
    }
    fn actions(&self) -> &Actions {
        &self.actions
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} on {}", self.source, self.destination, self.events)?;
        if let Some(guard) = &self.guard {
            write!(f, " if {}", guard)?;
        }
        if !self.actions.is_empty() {
            write!(f, " do {}", self.actions)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct State {
    name: String,
    transitions: Vec<Transition>,
}

impl State {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transitions: Vec::new(),
        }
    }
}

impl StateLike for State {
    type Transition = Transition;

    fn name(&self) -> &str {
        &self.name
    }
    fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

#[derive(Debug, Clone)]
pub struct StateMachine {
    name: String,
    states: IndexMap<String, State>,
}

impl StateMachine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: IndexMap::new(),
        }
    }

    /// Adds a new state, failing if one with the same name exists.
    pub fn add_state(&mut self, name: &str) -> Result<&mut State, ModelError> {
        if self.states.contains_key(name) {
            return Err(ModelError::DuplicateState {
                machine: self.name.clone(),
                state: name.to_string(),
            });
        }
        Ok(self.ensure_state(name))
    }

    /// Returns the state `name`, creating it if needed.
    pub fn ensure_state(&mut self, name: &str) -> &mut State {
        self.states
            .entry(name.to_string())
            .or_insert_with(|| State::new(name))
    }

    /// Adds a transition, creating its source and destination states if needed.
    pub fn add_transition(
        &mut self,
        from: &str,
        to: &str,
        events: impl IntoIterator<Item = Event>,
        guard: Option<Formula>,
        actions: impl IntoIterator<Item = Action>,
    ) -> &Transition {
        self.ensure_state(to);
        let transition = Transition::new(
            from,
            to,
            events.into_iter().collect(),
            guard,
            actions.into_iter().collect(),
        );
        let state = self.ensure_state(from);
        state.transitions.push(transition);
        &state.transitions[state.transitions.len() - 1]
    }
}

impl StateMachineLike for StateMachine {
    type State = State;

    fn name(&self) -> &str {
        &self.name
    }
    fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }
    fn state(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    variables: VariableTable,
    machines: IndexMap<String, StateMachine>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_variables(name, VariableTable::new())
    }

    /// A model interning its variables in `variables`, typically shared with another model.
    pub fn with_variables(name: impl Into<String>, variables: VariableTable) -> Self {
        Self {
            name: name.into(),
            variables,
            machines: IndexMap::new(),
        }
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn factory(&self) -> BooleanExpressionFactory {
        BooleanExpressionFactory::new(self.variables.clone())
    }

    /// Parses a guard over this model's variables.
    pub fn parse_guard(&self, text: &str) -> Result<Option<Formula>, ParseError> {
        self.factory().parse(text)
    }

    pub fn add_machine(&mut self, name: &str) -> Result<&mut StateMachine, ModelError> {
        if self.machines.contains_key(name) {
            return Err(ModelError::DuplicateMachine(name.to_string()));
        }
        Ok(self
            .machines
            .entry(name.to_string())
            .or_insert_with(|| StateMachine::new(name)))
    }

    pub fn machine(&self, name: &str) -> Option<&StateMachine> {
        self.machines.get(name)
    }

    pub fn machine_mut(&mut self, name: &str) -> Option<&mut StateMachine> {
        self.machines.get_mut(name)
    }
}

impl ModelLike for Model {
    type Machine = StateMachine;

    fn name(&self) -> &str {
        &self.name
    }
    fn machines(&self) -> impl Iterator<Item = &StateMachine> {
        self.machines.values()
    }
}
