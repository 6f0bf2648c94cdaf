//! # fsmcheck: SAT-backed verification of state-machine models
//!
//! **`fsmcheck`** proves structural and semantic properties of models made of communicating
//! finite-state machines, whose transitions are triggered by events and guarded by Boolean
//! conditions over shared variables.
//!
//! ## What is checked?
//!
//! - **Determinism**: two transitions leaving a state on a common event must have exclusive
//!   guards, unless firing either one has the same effect.
//! - **Variable usage**: every variable is written by a single state machine, every variable read
//!   is written somewhere, and every variable written is read somewhere.
//! - **Coherent writing**: no variable can receive two different values in one step or in two
//!   chained steps.
//! - **Initialization**: every state machine has an initial state `0`, left without condition
//!   and without event.
//! - **Tautologies**: no guard reachable from the initial state is always true.
//!
//! Semantic checks reduce to satisfiability queries: guards are converted to CNF and decided by
//! a [`SatOracle`][crate::sat::SatOracle]. Every counterexample carries a satisfying assignment
//! (a [`Witness`][crate::sat::Witness]) under which the offending guards hold.
//!
//! ## Basic Usage
//!
//! ```rust
//! use fsmcheck::events::{Action, Event};
//! use fsmcheck::graph::Model;
//! use fsmcheck::sat::BddOracle;
//! use fsmcheck::verifier::Verifier;
//!
//! // 1. Build the model (normally done by a loader)
//! let mut model = Model::new("lamp");
//! let light = model.variables().boolean("LIGHT").unwrap();
//! let dark = model.parse_guard("DARK").unwrap();
//! let machine = model.add_machine("lamp").unwrap();
//! machine.add_transition("0", "1", [], None, [Action::assign(light.clone(), false)]);
//! machine.add_transition("1", "2", [Event::external("tick")], dark.clone(), [Action::assign(light.clone(), true)]);
//! machine.add_transition("1", "1", [Event::external("tick")], dark, []);
//!
//! // 2. Verify it
//! let verifier = Verifier::standard(BddOracle::default());
//! let run = verifier.check_all(&model);
//!
//! // 3. Both "tick" transitions are enabled when DARK holds
//! assert!(!run.is_success());
//! let report = run.report("determinism").unwrap();
//! println!("{}", report.error_message());
//! ```
//!
//! ## Core Components
//!
//! - **[`formula`]** and **[`parser`]**: Boolean conditions and their textual syntax.
//! - **[`cnf`]**: conversion of conditions to conjunctive normal form.
//! - **[`sat`]**: the satisfiability oracle, backed by the decision diagrams of [`bdd`].
//! - **[`model`]** and **[`graph`]**: the state-machine abstraction and its in-memory implementation.
//! - **[`verifier`]**: the verification units and the [`Verifier`][crate::verifier::Verifier] running them.

pub mod analysis;
pub mod bdd;
pub mod cnf;
pub mod config;
pub mod error;
pub mod events;
pub mod formula;
pub mod graph;
pub mod model;
pub mod parser;
pub mod reference;
pub mod sat;
pub mod types;
pub mod valuation;
pub mod variables;
pub mod verifier;
