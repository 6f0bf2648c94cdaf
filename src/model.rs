//! Capabilities of a state-machine model, as seen by the verifiers.
//!
//! The verification units are generic over these traits rather than over a
//! concrete representation: any model family whose machines, states and
//! transitions expose names, triggering [`Events`], an optional guard
//! [`Formula`] and [`Actions`] can be verified. The in-memory implementation
//! lives in [`graph`][crate::graph].
//!
//! Models are read-only input: nothing here offers mutation.

use std::fmt;

use crate::error::ModelError;
use crate::events::{Actions, Events};
use crate::formula::Formula;

pub trait TransitionLike: fmt::Display {
    fn source(&self) -> &str;
    fn destination(&self) -> &str;
    fn events(&self) -> &Events;
    /// The guard, `None` meaning "always true".
    fn guard(&self) -> Option<&Formula>;
    fn actions(&self) -> &Actions;

    /// Same destination and same action set: firing either is indistinguishable.
    fn same_effect(&self, other: &Self) -> bool {
        self.destination() == other.destination() && self.actions() == other.actions()
    }
}

pub trait StateLike {
    type Transition: TransitionLike;

    fn name(&self) -> &str;
    /// Outgoing transitions.
    fn transitions(&self) -> &[Self::Transition];
}

pub trait StateMachineLike {
    type State: StateLike;

    fn name(&self) -> &str;
    fn states(&self) -> impl Iterator<Item = &Self::State>;
    fn state(&self, name: &str) -> Option<&Self::State>;

    fn transitions(&self) -> impl Iterator<Item = &<Self::State as StateLike>::Transition> {
        self.states().flat_map(|s| s.transitions().iter())
    }
}

pub trait ModelLike {
    type Machine: StateMachineLike;

    fn name(&self) -> &str;
    fn machines(&self) -> impl Iterator<Item = &Self::Machine>;
}

pub type StateOf<M> = <<M as ModelLike>::Machine as StateMachineLike>::State;
pub type TransitionOf<M> = <StateOf<M> as StateLike>::Transition;

/// A model verified together with its proof model.
///
/// The machines of both are visited, primary first, so transitions of the
/// proof model may read variables written by the primary model. Both models
/// must be built over the same [`VariableTable`][crate::variables::VariableTable].
///
/// Machines are identified by name, so the two models may not share one.
#[derive(Debug)]
pub struct Composition<'a, M> {
    name: String,
    primary: &'a M,
    proof: &'a M,
}

impl<'a, M: ModelLike> Composition<'a, M> {
    /// # Errors
    ///
    /// [`ModelError::DuplicateMachine`] if a machine name appears in both models.
    pub fn new(primary: &'a M, proof: &'a M) -> Result<Self, ModelError> {
        for machine in proof.machines() {
            if primary.machines().any(|m| m.name() == machine.name()) {
                return Err(ModelError::DuplicateMachine(machine.name().to_string()));
            }
        }
        Ok(Self {
            name: format!("{}+{}", primary.name(), proof.name()),
            primary,
            proof,
        })
    }

    pub fn primary(&self) -> &'a M {
        self.primary
    }

    pub fn proof(&self) -> &'a M {
        self.proof
    }
}

impl<M: ModelLike> ModelLike for Composition<'_, M> {
    type Machine = M::Machine;

    fn name(&self) -> &str {
        &self.name
    }

    fn machines(&self) -> impl Iterator<Item = &Self::Machine> {
        self.primary.machines().chain(self.proof.machines())
    }
}
