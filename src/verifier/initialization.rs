use crate::error::OracleError;
use crate::model::{ModelLike, StateLike, StateMachineLike, TransitionLike};
use crate::sat::SatOracle;

use super::{CheckMode, Report, Site, VerificationUnit, Violation};

/// Name of the initial state of every state machine.
pub const INITIAL_STATE: &str = "0";

/// Every state machine has an initial state, left unconditionally and
/// without waiting for an event.
#[derive(Debug, Copy, Clone, Default)]
pub struct InitializationProperties;

impl<M: ModelLike> VerificationUnit<M> for InitializationProperties {
    fn name(&self) -> &'static str {
        "initialization"
    }

    fn description(&self) -> &'static str {
        "state machines are initialized unconditionally"
    }

    fn failure(&self) -> &'static str {
        "Initialization properties not verified"
    }

    fn verify(&self, model: &M, _oracle: &dyn SatOracle, mode: CheckMode) -> Result<Report, OracleError> {
        let mut report = VerificationUnit::<M>::report(self);

        for machine in model.machines() {
            let Some(initial) = machine.state(INITIAL_STATE) else {
                report.push(Violation::MissingInitialState {
                    machine: machine.name().to_string(),
                });
                if mode.is_done(&report) {
                    return Ok(report);
                }
                continue;
            };

            for t in initial.transitions() {
                if t.guard().is_some() {
                    report.push(Violation::GuardedInitialization {
                        site: Site::new(machine.name(), t),
                    });
                    if mode.is_done(&report) {
                        return Ok(report);
                    }
                }
                if !t.events().is_empty() {
                    report.push(Violation::TriggeredInitialization {
                        site: Site::new(machine.name(), t),
                    });
                    if mode.is_done(&report) {
                        return Ok(report);
                    }
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::events::{Action, Event};
    use crate::graph::Model;
    use crate::sat::BddOracle;

    fn verify(model: &Model) -> Report {
        InitializationProperties
            .verify(model, &BddOracle::default(), CheckMode::AllViolations)
            .unwrap()
    }

    #[test]
    fn test_missing_initial_state() {
        let mut model = Model::new("m");
        model
            .add_machine("a")
            .unwrap()
            .add_transition("1", "2", [Event::external("e")], None, []);

        let report = verify(&model);
        assert_eq!(
            report.violations(),
            &[Violation::MissingInitialState {
                machine: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_initialization_transitions() {
        let mut model = Model::new("m");
        let a = model.variables().boolean("A").unwrap();
        let guard = model.parse_guard("A").unwrap();
        let machine = model.add_machine("a").unwrap();
        machine.add_transition("0", "1", [], guard, []);
        machine.add_transition("0", "2", [Event::external("e")], None, []);
        machine.add_transition("1", "2", [Event::external("e")], None, [Action::assign(a, true)]);

        let report = verify(&model);
        assert_eq!(report.violations().len(), 2);
        assert!(matches!(report.violations()[0], Violation::GuardedInitialization { .. }));
        assert!(matches!(report.violations()[1], Violation::TriggeredInitialization { .. }));
    }

    #[test]
    fn test_first_violation_stops_early() {
        let mut model = Model::new("m");
        let guard = model.parse_guard("A").unwrap();
        let machine = model.add_machine("a").unwrap();
        machine.add_transition("0", "1", [Event::external("e")], guard, []);

        let all = verify(&model);
        assert_eq!(all.violations().len(), 2);

        let first = InitializationProperties
            .verify(&model, &BddOracle::default(), CheckMode::FirstViolation)
            .unwrap();
        assert_eq!(first.violations().len(), 1);
        assert!(matches!(first.violations()[0], Violation::GuardedInitialization { .. }));
    }

    #[test]
    fn test_proper_initialization() {
        let mut model = Model::new("m");
        let a = model.variables().boolean("A").unwrap();
        let machine = model.add_machine("a").unwrap();
        machine.add_transition("0", "1", [], None, [Action::assign(a, false)]);

        assert!(verify(&model).passed());
    }
}
