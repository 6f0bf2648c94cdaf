//! Verification units and the verifier that runs them.
//!
//! A [`VerificationUnit`] proves one property of a model and returns a
//! [`Report`] listing every [`Violation`] it found (or only the first one, see
//! [`CheckMode`]). Units never mutate the model and keep no state between
//! runs, so running a unit twice on the same model yields the same report.
//!
//! A [`Verifier`] owns a list of units and the [`SatOracle`] they share, and
//! produces a [`Run`]. A failing property is an ordinary outcome
//! ([`RunStatus::Failed`]); an unanswered SAT query is not, and aborts the run
//! ([`RunStatus::Aborted`]).
//!
//! ```
//! use fsmcheck::events::Event;
//! use fsmcheck::graph::Model;
//! use fsmcheck::sat::BddOracle;
//! use fsmcheck::verifier::{RunStatus, Verifier};
//!
//! let mut model = Model::new("switch");
//! let on = model.parse_guard("ON").unwrap();
//! let off = model.parse_guard("NOT ON").unwrap();
//! let machine = model.add_machine("switch").unwrap();
//! machine.add_transition("0", "1", [Event::external("toggle")], on, []);
//! machine.add_transition("0", "2", [Event::external("toggle")], off, []);
//!
//! let verifier = Verifier::new(BddOracle::default())
//!     .with_unit(fsmcheck::verifier::DeterminismChecker);
//! let run = verifier.check_all(&model);
//! assert_eq!(run.status(), &RunStatus::Success);
//! ```

use std::fmt;

use log::{info, warn};
use num_bigint::BigUint;

use crate::error::OracleError;
use crate::model::ModelLike;
use crate::sat::{SatOracle, Witness};
use crate::variables::Variable;

mod coherent_writing;
mod determinism;
mod initialization;
mod no_useless_variables;
mod single_writing;
mod tautology;
mod written_at_least_once;

pub use coherent_writing::CoherentVariablesWriting;
pub use determinism::DeterminismChecker;
pub use initialization::{InitializationProperties, INITIAL_STATE};
pub use no_useless_variables::NoUselessVariables;
pub use single_writing::SingleWritingChecker;
pub use tautology::TautologyFromStateZero;
pub use written_at_least_once::WrittenAtLeastOnceChecker;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CheckMode {
    /// Stop at the first violation.
    FirstViolation,
    /// Enumerate every violation.
    AllViolations,
}

impl CheckMode {
    /// Whether a unit in this mode should stop now.
    pub fn is_done(self, report: &Report) -> bool {
        self == CheckMode::FirstViolation && !report.passed()
    }
}

pub trait VerificationUnit<M: ModelLike> {
    fn name(&self) -> &'static str;

    /// What a passing run establishes, e.g. "transitions are exclusive".
    fn description(&self) -> &'static str;

    /// Headline of the failure message.
    fn failure(&self) -> &'static str;

    fn verify(&self, model: &M, oracle: &dyn SatOracle, mode: CheckMode) -> Result<Report, OracleError>;

    /// An empty report for this unit.
    fn report(&self) -> Report {
        Report::new(self.name(), self.description(), self.failure())
    }

    /// Stops at the first violation.
    fn check(&self, model: &M, oracle: &dyn SatOracle) -> Result<bool, OracleError> {
        Ok(self.verify(model, oracle, CheckMode::FirstViolation)?.passed())
    }

    /// Looks for every violation.
    fn check_all(&self, model: &M, oracle: &dyn SatOracle) -> Result<bool, OracleError> {
        Ok(self.verify(model, oracle, CheckMode::AllViolations)?.passed())
    }
}

/// A transition located in its state machine.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Site {
    pub machine: String,
    pub transition: String,
}

impl Site {
    pub fn new(machine: &str, transition: &impl fmt::Display) -> Self {
        Self {
            machine: machine.to_string(),
            transition: transition.to_string(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.machine, self.transition)
    }
}

/// One counterexample to a property.
///
/// Transitions are recorded through their canonical text, so a finished
/// record does not borrow the model.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Violation {
    /// Two transitions leaving `state` on a common event can be enabled together.
    NonDeterminism {
        machine: String,
        state: String,
        first: String,
        second: String,
        witness: Witness,
        /// Valuations of the joint guard's variables enabling both transitions.
        models: BigUint,
        variables: usize,
    },
    ConcurrentWriting {
        variable: Variable,
        machines: Vec<String>,
    },
    NeverWritten {
        variable: Variable,
        readers: Vec<String>,
    },
    UselessVariable {
        variable: Variable,
        writers: Vec<String>,
    },
    /// A single transition writes two values to `variable`.
    ConflictingWrites { variable: Variable, site: Site },
    /// Two transitions fired by a common event can write two values to `variable`.
    SimultaneousWrites {
        variable: Variable,
        first: Site,
        second: Site,
        witness: Witness,
    },
    /// `second`, triggered by the events of `first`, overwrites `variable` with another value.
    PropagatedWrites {
        variable: Variable,
        first: Site,
        second: Site,
        witness: Witness,
    },
    MissingInitialState { machine: String },
    GuardedInitialization { site: Site },
    TriggeredInitialization { site: Site },
    TautologicalGuard { site: Site },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NonDeterminism {
                machine,
                state,
                first,
                second,
                witness,
                models,
                variables,
            } => write!(
                f,
                "In the state machine {machine}, state {state}, the transitions\n  {first}\nand\n  {second}\nare not exclusive. Both are enabled by {witness} ({models} of 2^{variables} valuations)"
            ),
            Violation::ConcurrentWriting { variable, machines } => write!(
                f,
                "The variable {variable} is written by several state machines: {}",
                machines.join(", ")
            ),
            Violation::NeverWritten { variable, readers } => write!(
                f,
                "The variable {variable} is read by {} but never written",
                readers.join(", ")
            ),
            Violation::UselessVariable { variable, writers } => write!(
                f,
                "The variable {variable} is written by {} but never read",
                writers.join(", ")
            ),
            Violation::ConflictingWrites { variable, site } => {
                write!(f, "The transition\n  {site}\nwrites several values to {variable}")
            }
            Violation::SimultaneousWrites {
                variable,
                first,
                second,
                witness,
            } => write!(
                f,
                "The transitions\n  {first}\nand\n  {second}\ncan fire in the same step and write different values to {variable}, for instance with {witness}"
            ),
            Violation::PropagatedWrites {
                variable,
                first,
                second,
                witness,
            } => write!(
                f,
                "The transition\n  {first}\ntriggers\n  {second}\nwhich writes another value to {variable}, for instance with {witness}"
            ),
            Violation::MissingInitialState { machine } => {
                write!(f, "The state machine {machine} has no initial state {INITIAL_STATE}")
            }
            Violation::GuardedInitialization { site } => {
                write!(f, "The initialization transition\n  {site}\ndepends on a condition")
            }
            Violation::TriggeredInitialization { site } => {
                write!(f, "The initialization transition\n  {site}\nis triggered by an event")
            }
            Violation::TautologicalGuard { site } => {
                write!(f, "The condition of\n  {site}\nis always true")
            }
        }
    }
}

/// Outcome of one unit on one model.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Report {
    unit: &'static str,
    description: &'static str,
    failure: &'static str,
    violations: Vec<Violation>,
}

impl Report {
    pub fn new(unit: &'static str, description: &'static str, failure: &'static str) -> Self {
        Self {
            unit,
            description,
            failure,
            violations: Vec::new(),
        }
    }

    pub fn unit(&self) -> &'static str {
        self.unit
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn push(&mut self, violation: Violation) {
        warn!("{}: {}", self.unit, violation);
        self.violations.push(violation);
    }

    /// # Panics
    ///
    /// Panics if the report has violations.
    pub fn success_message(&self) -> String {
        assert!(
            self.passed(),
            "{} found {} errors, there is no success message",
            self.unit,
            self.violations.len()
        );
        format!("[SUCCESS] Checking that {}...OK", self.description)
    }

    /// # Panics
    ///
    /// Panics if the report has no violations.
    pub fn error_message(&self) -> String {
        assert!(!self.passed(), "{} found no errors, there is no error message", self.unit);
        let mut message = format!(
            "[FAILURE] {}: {} errors have been found.\n",
            self.failure,
            self.violations.len()
        );
        for v in &self.violations {
            message.push_str(&v.to_string());
            message.push('\n');
        }
        message
    }

    pub fn message(&self) -> String {
        if self.passed() {
            self.success_message()
        } else {
            self.error_message()
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RunStatus {
    Success,
    Failed,
    /// A SAT query could not be answered. Reports of the units completed before are kept.
    Aborted(OracleError),
}

#[derive(Debug, Clone)]
pub struct Run {
    status: RunStatus,
    reports: Vec<Report>,
}

impl Run {
    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn report(&self, unit: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.unit() == unit)
    }

    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.reports.iter().flat_map(|r| r.violations())
    }
}

/// Runs a list of units against models.
pub struct Verifier<M: ModelLike> {
    units: Vec<Box<dyn VerificationUnit<M>>>,
    oracle: Box<dyn SatOracle>,
}

impl<M: ModelLike> Verifier<M> {
    pub fn new(oracle: impl SatOracle + 'static) -> Self {
        Self {
            units: Vec::new(),
            oracle: Box::new(oracle),
        }
    }

    /// Every unit of this crate, structural checks first.
    pub fn standard(oracle: impl SatOracle + 'static) -> Self {
        Self::new(oracle)
            .with_unit(InitializationProperties)
            .with_unit(SingleWritingChecker)
            .with_unit(WrittenAtLeastOnceChecker)
            .with_unit(NoUselessVariables)
            .with_unit(DeterminismChecker)
            .with_unit(CoherentVariablesWriting)
            .with_unit(TautologyFromStateZero)
    }

    pub fn with_unit(mut self, unit: impl VerificationUnit<M> + 'static) -> Self {
        self.units.push(Box::new(unit));
        self
    }

    pub fn units(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.units.iter().map(|u| u.name())
    }

    /// Runs the units in order, each stopping at its first violation, and
    /// stops at the first failing unit.
    pub fn check(&self, model: &M) -> Run {
        self.run(model, CheckMode::FirstViolation)
    }

    /// Runs every unit, enumerating every violation.
    pub fn check_all(&self, model: &M) -> Run {
        self.run(model, CheckMode::AllViolations)
    }

    fn run(&self, model: &M, mode: CheckMode) -> Run {
        info!("Verifying {} with {} units ({:?})", model.name(), self.units.len(), mode);
        let mut reports = Vec::new();
        let mut status = RunStatus::Success;

        for unit in &self.units {
            match unit.verify(model, self.oracle.as_ref(), mode) {
                Ok(report) => {
                    info!("{}: {}", unit.name(), if report.passed() { "OK" } else { "FAILED" });
                    let passed = report.passed();
                    reports.push(report);
                    if !passed {
                        status = RunStatus::Failed;
                        if mode == CheckMode::FirstViolation {
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!("{}: aborted: {}", unit.name(), e);
                    status = RunStatus::Aborted(e);
                    break;
                }
            }
        }

        info!("Verification of {} finished: {:?}", model.name(), status);
        Run { status, reports }
    }
}

impl<M: ModelLike> fmt::Debug for Verifier<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("units", &self.units().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::variables::VariableTable;

    fn failing_report() -> Report {
        let table = VariableTable::new();
        let mut report = Report::new("unit", "something holds", "Something not verified");
        report.push(Violation::UselessVariable {
            variable: table.boolean("X").unwrap(),
            writers: vec!["a".to_string()],
        });
        report
    }

    #[test]
    fn test_messages() {
        let report = Report::new("unit", "something holds", "Something not verified");
        assert!(report.passed());
        assert_eq!(report.success_message(), "[SUCCESS] Checking that something holds...OK");

        let report = failing_report();
        assert_eq!(
            report.error_message(),
            "[FAILURE] Something not verified: 1 errors have been found.\n\
             The variable X is written by a but never read\n"
        );
        assert_eq!(report.message(), report.error_message());
    }

    #[test]
    #[should_panic(expected = "there is no success message")]
    fn test_success_message_of_failure() {
        failing_report().success_message();
    }

    #[test]
    #[should_panic(expected = "there is no error message")]
    fn test_error_message_of_success() {
        Report::new("unit", "something holds", "Something not verified").error_message();
    }

    #[test]
    fn test_check_mode() {
        let report = failing_report();
        assert!(CheckMode::FirstViolation.is_done(&report));
        assert!(!CheckMode::AllViolations.is_done(&report));
    }
}
